//! Runtime type tags and type resolution for arithmetic operations.
//!
//! Every dataset carries one of the twelve tags below. Operators decide their
//! output tag through [`result_type`]; binary operators promote mixed-tag
//! operands through [`binary_out_type`].

use alloc::string::ToString;

use crate::error::{Error, Result};
use crate::operator::Operator;

/// Runtime element-type tag of a dataset.
///
/// `Logical` shares the one-byte width of `U8`/`I8` but is semantically a
/// boolean: the masked-select condition must carry this tag, and logical
/// negation always produces it. `LongLong` is a 64-bit signed integer kept
/// distinct from `I64` for sources that distinguish `long` from `long long`
/// columns; both use `i64` storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    U8,
    I8,
    Logical,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    LongLong,
    F32,
    F64,
}

impl DataType {
    /// Width of one element in bytes.
    pub const fn element_size(self) -> usize {
        match self {
            DataType::U8 | DataType::I8 | DataType::Logical => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::LongLong | DataType::F64 => 8,
        }
    }

    /// True for the two floating-point tags.
    pub const fn is_float(self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Short name, also accepted by [`DataType::from_name`]. The cast
    /// operators use the same words.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::U8 => "u8",
            DataType::I8 => "i8",
            DataType::Logical => "logical",
            DataType::U16 => "u16",
            DataType::I16 => "i16",
            DataType::U32 => "u32",
            DataType::I32 => "i32",
            DataType::U64 => "u64",
            DataType::I64 => "i64",
            DataType::LongLong => "longlong",
            DataType::F32 => "f32",
            DataType::F64 => "f64",
        }
    }

    /// Parse a type name as produced by [`DataType::name`].
    ///
    /// Unknown names are an `UnrecognizedType` error, which callers should
    /// treat as a configuration defect rather than a data problem.
    pub fn from_name(name: &str) -> Result<DataType> {
        match name {
            "u8" => Ok(DataType::U8),
            "i8" => Ok(DataType::I8),
            "logical" => Ok(DataType::Logical),
            "u16" => Ok(DataType::U16),
            "i16" => Ok(DataType::I16),
            "u32" => Ok(DataType::U32),
            "i32" => Ok(DataType::I32),
            "u64" => Ok(DataType::U64),
            "i64" => Ok(DataType::I64),
            "longlong" => Ok(DataType::LongLong),
            "f32" => Ok(DataType::F32),
            "f64" => Ok(DataType::F64),
            other => Err(Error::UnrecognizedType(other.to_string())),
        }
    }

    /// Position in the fixed promotion ordering used by [`binary_out_type`].
    const fn promotion_rank(self) -> u8 {
        match self {
            DataType::U8 => 0,
            DataType::I8 => 1,
            DataType::Logical => 2,
            DataType::U16 => 3,
            DataType::I16 => 4,
            DataType::U32 => 5,
            DataType::I32 => 6,
            DataType::U64 => 7,
            DataType::I64 => 8,
            DataType::LongLong => 9,
            DataType::F32 => 10,
            DataType::F64 => 11,
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Output tag of a binary elementwise operation over mixed operand tags.
///
/// The higher-ranked tag wins, in the ordering
/// `u8 < i8 < logical < u16 < i16 < u32 < i32 < u64 < i64 < longlong < f32 <
/// f64`. For the floating corner this gives: same-width operands keep that
/// width, mixed widths promote to `f64`.
pub const fn binary_out_type(left: DataType, right: DataType) -> DataType {
    if left.promotion_rank() >= right.promotion_rank() {
        left
    } else {
        right
    }
}

/// Verify that an operand of a floating-point-only operator is `f32` or
/// `f64`. The error message points the caller at the explicit cast operators.
pub fn check_float_operand(op: Operator, operand: &'static str, dtype: DataType) -> Result<()> {
    if dtype.is_float() {
        Ok(())
    } else {
        Err(Error::UnsupportedOperandType {
            operator: op,
            operand,
            dtype,
            expected: "an f32 or f64 operand (use the 'f32' or 'f64' cast operators)",
        })
    }
}

/// Resolve the output tag of an operation over one or two operand tags.
///
/// - Cast operators always produce their fixed target tag.
/// - `not` always produces `logical`, whatever the input tag.
/// - `sqrt`/`log`/`log10` require a floating operand and keep its tag.
/// - `pow` requires two floating operands and promotes mixed widths to `f64`.
///
/// `where` has no result type (it mutates its output operand) and any other
/// arity mismatch is an `UnsupportedOperation` defect.
pub fn result_type(op: Operator, left: DataType, right: Option<DataType>) -> Result<DataType> {
    if let Some(target) = op.cast_target() {
        return Ok(target);
    }
    match op {
        Operator::Not => Ok(DataType::Logical),
        Operator::Sqrt | Operator::Log | Operator::Log10 => {
            check_float_operand(op, "first", left)?;
            Ok(left)
        }
        Operator::Pow => {
            let right = match right {
                Some(t) => t,
                None => return Err(Error::UnsupportedOperation(op)),
            };
            check_float_operand(op, "first", left)?;
            check_float_operand(op, "second", right)?;
            Ok(binary_out_type(left, right))
        }
        _ => Err(Error::UnsupportedOperation(op)),
    }
}
