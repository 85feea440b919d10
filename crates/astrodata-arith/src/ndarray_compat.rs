//! Conversions between [`Dataset`] and `ndarray` dynamic arrays, behind the
//! `array` feature. The array side is always `f64`; the dataset's runtime
//! tag is widened on export and reapplied on import.

use ndarray::{ArrayD, IxDyn};

use crate::dataset::{ArrayStore, Dataset};
use crate::dtype::DataType;
use crate::error::{Error, Result};

/// Export a dataset as an `f64` array of the same shape, widening every
/// element.
pub fn to_array_f64(d: &Dataset) -> Result<ArrayD<f64>> {
    let values: Vec<f64> = match &d.array {
        ArrayStore::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::I8(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::Logical(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::U16(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::U32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::U64(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayStore::I64(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayStore::LongLong(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayStore::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayStore::F64(v) => v.clone(),
    };
    let expected = values.len();
    ArrayD::from_shape_vec(IxDyn(d.shape()), values).map_err(|_| Error::LengthMismatch {
        expected,
        found: d.size,
    })
}

/// Import an `f64` array as a dataset with the requested tag, narrowing
/// every element with the same rules as the cast operators.
pub fn from_array_f64(arr: &ArrayD<f64>, dtype: DataType) -> Dataset {
    let values: Vec<f64> = arr.iter().copied().collect();
    let dsize: Vec<usize> = arr.shape().to_vec();
    let wide = Dataset::from_store(ArrayStore::F64(values), dsize, usize::MAX);
    if dtype == DataType::F64 {
        wide
    } else {
        wide.copy_to_type(dtype)
    }
}
