use alloc::string::String;
use alloc::vec::Vec;

use crate::dtype::DataType;
use crate::operator::Operator;

/// All errors that can occur while running an arithmetic operation.
///
/// Two classes share this enum. `ShapeMismatch` and `UnsupportedOperandType`
/// are data errors: the operands presented violate a precondition and the
/// caller can correct its input. `UnsupportedOperation`, `UnrecognizedType`
/// and `EmptyOperand` are programming defects (an operator reached the wrong
/// executor, or a consumed operand slot was passed again) and should be
/// treated as non-recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operand shapes are incompatible for an elementwise operation.
    ShapeMismatch {
        operator: Operator,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    /// An operand has a type the operator does not accept.
    UnsupportedOperandType {
        operator: Operator,
        /// Which operand failed the check ("first", "second", ...).
        operand: &'static str,
        dtype: DataType,
        /// Human-readable description of the accepted types.
        expected: &'static str,
    },
    /// The operator cannot be handled by the executor it reached.
    UnsupportedOperation(Operator),
    /// A type name outside the fixed enumeration.
    UnrecognizedType(String),
    /// A backing store does not match the element count implied by the shape.
    LengthMismatch { expected: usize, found: usize },
    /// An operand slot was empty (already consumed by a previous operation).
    EmptyOperand,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::ShapeMismatch {
                operator,
                left,
                right,
            } => write!(
                f,
                "operands of '{operator}' have incompatible shapes: {left:?} vs {right:?}"
            ),
            Error::UnsupportedOperandType {
                operator,
                operand,
                dtype,
                expected,
            } => write!(
                f,
                "the {operand} operand of '{operator}' has type '{dtype}' but this \
                 operator requires {expected}; convert the operand explicitly before \
                 applying it (implicit promotion is deliberately not performed)"
            ),
            Error::UnsupportedOperation(op) => {
                write!(f, "operator '{op}' is not supported by this executor")
            }
            Error::UnrecognizedType(name) => write!(f, "unrecognized type name: '{name}'"),
            Error::LengthMismatch { expected, found } => write!(
                f,
                "store holds {found} elements but the shape requires {expected}"
            ),
            Error::EmptyOperand => write!(f, "operand slot is empty (already consumed)"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
