//! The runtime-typed, shaped array value that every operation consumes and
//! produces.
//!
//! A [`Dataset`] owns a contiguous typed store ([`ArrayStore`]), a row-major
//! shape, and the residency policy for very large arrays. The store variant
//! is the runtime type tag; helpers here cover allocation, the full
//! type-conversion kernel backing the cast operators, and the raw-byte bridge
//! the surrounding I/O layer uses.

use alloc::vec;
use alloc::vec::Vec;

use bytemuck::{cast_slice, pod_collect_to_vec};

use crate::dtype::DataType;
use crate::error::{Error, Result};

/// Contiguous typed backing store of a dataset. The variant is the runtime
/// type tag: `Logical` and `LongLong` share a representation with `U8` and
/// `I64` respectively but are distinct tags.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayStore {
    U8(Vec<u8>),
    I8(Vec<i8>),
    Logical(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    LongLong(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ArrayStore {
    /// The runtime type tag of this store.
    pub const fn dtype(&self) -> DataType {
        match self {
            ArrayStore::U8(_) => DataType::U8,
            ArrayStore::I8(_) => DataType::I8,
            ArrayStore::Logical(_) => DataType::Logical,
            ArrayStore::U16(_) => DataType::U16,
            ArrayStore::I16(_) => DataType::I16,
            ArrayStore::U32(_) => DataType::U32,
            ArrayStore::I32(_) => DataType::I32,
            ArrayStore::U64(_) => DataType::U64,
            ArrayStore::I64(_) => DataType::I64,
            ArrayStore::LongLong(_) => DataType::LongLong,
            ArrayStore::F32(_) => DataType::F32,
            ArrayStore::F64(_) => DataType::F64,
        }
    }

    /// Number of elements in the store.
    pub fn len(&self) -> usize {
        match self {
            ArrayStore::U8(v) | ArrayStore::Logical(v) => v.len(),
            ArrayStore::I8(v) => v.len(),
            ArrayStore::U16(v) => v.len(),
            ArrayStore::I16(v) => v.len(),
            ArrayStore::U32(v) => v.len(),
            ArrayStore::I32(v) => v.len(),
            ArrayStore::U64(v) => v.len(),
            ArrayStore::I64(v) | ArrayStore::LongLong(v) => v.len(),
            ArrayStore::F32(v) => v.len(),
            ArrayStore::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Produce an [`ArrayStore`] of the requested target tag from a slice of any
/// numeric element type, converting by natural numeric assignment (`as`
/// semantics: float to integer saturates, integer narrowing wraps).
macro_rules! cast_store {
    ($v:expr, $target:expr) => {{
        let v = $v;
        match $target {
            DataType::U8 => ArrayStore::U8(v.iter().map(|&x| x as u8).collect()),
            DataType::I8 => ArrayStore::I8(v.iter().map(|&x| x as i8).collect()),
            DataType::Logical => ArrayStore::Logical(v.iter().map(|&x| x as u8).collect()),
            DataType::U16 => ArrayStore::U16(v.iter().map(|&x| x as u16).collect()),
            DataType::I16 => ArrayStore::I16(v.iter().map(|&x| x as i16).collect()),
            DataType::U32 => ArrayStore::U32(v.iter().map(|&x| x as u32).collect()),
            DataType::I32 => ArrayStore::I32(v.iter().map(|&x| x as i32).collect()),
            DataType::U64 => ArrayStore::U64(v.iter().map(|&x| x as u64).collect()),
            DataType::I64 => ArrayStore::I64(v.iter().map(|&x| x as i64).collect()),
            DataType::LongLong => ArrayStore::LongLong(v.iter().map(|&x| x as i64).collect()),
            DataType::F32 => ArrayStore::F32(v.iter().map(|&x| x as f32).collect()),
            DataType::F64 => ArrayStore::F64(v.iter().map(|&x| x as f64).collect()),
        }
    }};
}

/// A runtime-typed, shaped array value with single ownership.
///
/// Invariants maintained by every constructor and operation:
/// `size == product(dsize)` (0 when `dsize` is empty) and the store always
/// holds exactly `size` elements. The type tag never changes without a full
/// copy of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Typed backing store; its variant is the runtime type tag.
    pub array: ArrayStore,
    /// Per-axis extents, row-major. Empty denotes a placeholder dataset.
    pub dsize: Vec<usize>,
    /// Total element count, always the product of `dsize`.
    pub size: usize,
    /// Byte threshold above which the store should live in paged storage.
    /// `usize::MAX` keeps everything memory-resident.
    pub minmapsize: usize,
    /// Whether this store crossed `minmapsize` at allocation time. The store
    /// in this crate is always owned memory; the flag is the residency
    /// signal a paging-capable I/O layer acts on, and operations propagate
    /// it like any other allocation parameter.
    pub mmapped: bool,
}

fn shape_size(dsize: &[usize]) -> usize {
    if dsize.is_empty() {
        0
    } else {
        dsize.iter().product()
    }
}

impl Dataset {
    /// Allocate a zero-filled dataset of the given tag and shape.
    pub fn alloc(dtype: DataType, dsize: &[usize], minmapsize: usize) -> Dataset {
        let size = shape_size(dsize);
        let array = match dtype {
            DataType::U8 => ArrayStore::U8(vec![0; size]),
            DataType::I8 => ArrayStore::I8(vec![0; size]),
            DataType::Logical => ArrayStore::Logical(vec![0; size]),
            DataType::U16 => ArrayStore::U16(vec![0; size]),
            DataType::I16 => ArrayStore::I16(vec![0; size]),
            DataType::U32 => ArrayStore::U32(vec![0; size]),
            DataType::I32 => ArrayStore::I32(vec![0; size]),
            DataType::U64 => ArrayStore::U64(vec![0; size]),
            DataType::I64 => ArrayStore::I64(vec![0; size]),
            DataType::LongLong => ArrayStore::LongLong(vec![0; size]),
            DataType::F32 => ArrayStore::F32(vec![0.0; size]),
            DataType::F64 => ArrayStore::F64(vec![0.0; size]),
        };
        Dataset::from_store(array, dsize.to_vec(), minmapsize)
    }

    /// Wrap an existing typed store, validating the length invariant.
    pub fn new(array: ArrayStore, dsize: Vec<usize>) -> Result<Dataset> {
        let size = shape_size(&dsize);
        if array.len() != size {
            return Err(Error::LengthMismatch {
                expected: size,
                found: array.len(),
            });
        }
        Ok(Dataset::from_store(array, dsize, usize::MAX))
    }

    /// Wrap a single value as a size-1 dataset, usable as a broadcast
    /// scalar.
    pub fn scalar(array: ArrayStore) -> Result<Dataset> {
        Dataset::new(array, vec![1])
    }

    /// Internal constructor: size and residency are derived, the store is
    /// trusted to match the shape.
    pub(crate) fn from_store(array: ArrayStore, dsize: Vec<usize>, minmapsize: usize) -> Dataset {
        let size = shape_size(&dsize);
        let mmapped = size * array.dtype().element_size() >= minmapsize;
        Dataset {
            array,
            dsize,
            size,
            minmapsize,
            mmapped,
        }
    }

    /// The runtime type tag.
    pub const fn dtype(&self) -> DataType {
        self.array.dtype()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dsize.len()
    }

    /// Per-axis extents.
    pub fn shape(&self) -> &[usize] {
        &self.dsize
    }

    /// Total size of the store in bytes.
    pub fn nbytes(&self) -> usize {
        self.size * self.dtype().element_size()
    }

    /// True when the two datasets have identical dimensionality and extents.
    pub fn same_shape(&self, other: &Dataset) -> bool {
        self.dsize == other.dsize
    }

    /// Copy the dataset to a new one of the given tag, converting every
    /// element by natural numeric assignment. A copy is made even when the
    /// target tag equals the current one.
    pub fn copy_to_type(&self, dtype: DataType) -> Dataset {
        let array = match &self.array {
            ArrayStore::U8(v) | ArrayStore::Logical(v) => cast_store!(v, dtype),
            ArrayStore::I8(v) => cast_store!(v, dtype),
            ArrayStore::U16(v) => cast_store!(v, dtype),
            ArrayStore::I16(v) => cast_store!(v, dtype),
            ArrayStore::U32(v) => cast_store!(v, dtype),
            ArrayStore::I32(v) => cast_store!(v, dtype),
            ArrayStore::U64(v) => cast_store!(v, dtype),
            ArrayStore::I64(v) | ArrayStore::LongLong(v) => cast_store!(v, dtype),
            ArrayStore::F32(v) => cast_store!(v, dtype),
            ArrayStore::F64(v) => cast_store!(v, dtype),
        };
        Dataset::from_store(array, self.dsize.clone(), self.minmapsize)
    }

    /// View the store as native-endian raw bytes, for the I/O layer.
    pub fn raw_bytes(&self) -> &[u8] {
        match &self.array {
            ArrayStore::U8(v) | ArrayStore::Logical(v) => v.as_slice(),
            ArrayStore::I8(v) => cast_slice(v),
            ArrayStore::U16(v) => cast_slice(v),
            ArrayStore::I16(v) => cast_slice(v),
            ArrayStore::U32(v) => cast_slice(v),
            ArrayStore::I32(v) => cast_slice(v),
            ArrayStore::U64(v) => cast_slice(v),
            ArrayStore::I64(v) | ArrayStore::LongLong(v) => cast_slice(v),
            ArrayStore::F32(v) => cast_slice(v),
            ArrayStore::F64(v) => cast_slice(v),
        }
    }

    /// Build a dataset from native-endian raw bytes, validating that the
    /// byte length matches the shape and element width exactly.
    pub fn from_native_bytes(dtype: DataType, bytes: &[u8], dsize: Vec<usize>) -> Result<Dataset> {
        let size = shape_size(&dsize);
        let expected = size * dtype.element_size();
        if bytes.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                found: bytes.len(),
            });
        }
        let array = match dtype {
            DataType::U8 => ArrayStore::U8(bytes.to_vec()),
            DataType::I8 => ArrayStore::I8(pod_collect_to_vec(bytes)),
            DataType::Logical => ArrayStore::Logical(bytes.to_vec()),
            DataType::U16 => ArrayStore::U16(pod_collect_to_vec(bytes)),
            DataType::I16 => ArrayStore::I16(pod_collect_to_vec(bytes)),
            DataType::U32 => ArrayStore::U32(pod_collect_to_vec(bytes)),
            DataType::I32 => ArrayStore::I32(pod_collect_to_vec(bytes)),
            DataType::U64 => ArrayStore::U64(pod_collect_to_vec(bytes)),
            DataType::I64 => ArrayStore::I64(pod_collect_to_vec(bytes)),
            DataType::LongLong => ArrayStore::LongLong(pod_collect_to_vec(bytes)),
            DataType::F32 => ArrayStore::F32(pod_collect_to_vec(bytes)),
            DataType::F64 => ArrayStore::F64(pod_collect_to_vec(bytes)),
        };
        Ok(Dataset::from_store(array, dsize, usize::MAX))
    }
}
