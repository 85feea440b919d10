//! Operation codes and the ownership/lifetime policy flags.

use crate::dtype::DataType;

/// Code of an elementwise operation.
///
/// The eleven `To*` operators convert a dataset to the named tag; their
/// user-facing names are the type names themselves (an expression writes
/// `f32` to convert, mirroring how the cast words appear in column
/// arithmetic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    ToU8,
    ToI8,
    ToU16,
    ToI16,
    ToU32,
    ToI32,
    ToU64,
    ToI64,
    ToLongLong,
    ToF32,
    ToF64,
    Not,
    Sqrt,
    Log,
    Log10,
    Pow,
    Where,
}

impl Operator {
    /// User-facing operator word.
    pub const fn name(self) -> &'static str {
        match self {
            Operator::ToU8 => "u8",
            Operator::ToI8 => "i8",
            Operator::ToU16 => "u16",
            Operator::ToI16 => "i16",
            Operator::ToU32 => "u32",
            Operator::ToI32 => "i32",
            Operator::ToU64 => "u64",
            Operator::ToI64 => "i64",
            Operator::ToLongLong => "longlong",
            Operator::ToF32 => "f32",
            Operator::ToF64 => "f64",
            Operator::Not => "not",
            Operator::Sqrt => "sqrt",
            Operator::Log => "log",
            Operator::Log10 => "log10",
            Operator::Pow => "pow",
            Operator::Where => "where",
        }
    }

    /// The fixed target tag of a cast operator, `None` for everything else.
    pub const fn cast_target(self) -> Option<DataType> {
        match self {
            Operator::ToU8 => Some(DataType::U8),
            Operator::ToI8 => Some(DataType::I8),
            Operator::ToU16 => Some(DataType::U16),
            Operator::ToI16 => Some(DataType::I16),
            Operator::ToU32 => Some(DataType::U32),
            Operator::ToI32 => Some(DataType::I32),
            Operator::ToU64 => Some(DataType::U64),
            Operator::ToI64 => Some(DataType::I64),
            Operator::ToLongLong => Some(DataType::LongLong),
            Operator::ToF32 => Some(DataType::F32),
            Operator::ToF64 => Some(DataType::F64),
            _ => None,
        }
    }
}

impl core::fmt::Display for Operator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ownership/lifetime policy flags threaded through every operation.
///
/// - `free_inputs`: release input datasets no longer needed once the
///   operation completes. Without it the caller retains every input it
///   passed in (except one reused as output, which has become the output).
/// - `in_place`: permission, not obligation, to reuse an input's storage as
///   the output when type and size allow it. Never changes result values.
/// - `scalar_ok`: permission for shape resolution to broadcast a size-1
///   operand against a larger one; without it any size difference is a
///   shape mismatch.
///
/// Flags compose with `|`:
///
/// ```
/// use astrodata_arith::Flags;
/// let f = Flags::FREE_INPUTS | Flags::IN_PLACE;
/// assert!(f.free_inputs && f.in_place && !f.scalar_ok);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub free_inputs: bool,
    pub in_place: bool,
    pub scalar_ok: bool,
}

impl Flags {
    /// No flag set: keep inputs, allocate fresh output, strict shapes.
    pub const NONE: Flags = Flags {
        free_inputs: false,
        in_place: false,
        scalar_ok: false,
    };

    /// Release inputs that do not become the output.
    pub const FREE_INPUTS: Flags = Flags {
        free_inputs: true,
        in_place: false,
        scalar_ok: false,
    };

    /// Allow output to reuse a compatible input's storage.
    pub const IN_PLACE: Flags = Flags {
        free_inputs: false,
        in_place: true,
        scalar_ok: false,
    };

    /// Allow a size-1 operand to broadcast.
    pub const SCALAR_OK: Flags = Flags {
        free_inputs: false,
        in_place: false,
        scalar_ok: true,
    };
}

impl core::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags {
            free_inputs: self.free_inputs || rhs.free_inputs,
            in_place: self.in_place || rhs.in_place,
            scalar_ok: self.scalar_ok || rhs.scalar_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- operator names ----

    #[test]
    fn cast_operator_names_match_type_names() {
        assert_eq!(Operator::ToF32.name(), DataType::F32.name());
        assert_eq!(Operator::ToLongLong.name(), DataType::LongLong.name());
        assert_eq!(Operator::ToU8.name(), DataType::U8.name());
    }

    #[test]
    fn function_operator_names() {
        assert_eq!(Operator::Sqrt.name(), "sqrt");
        assert_eq!(Operator::Log10.name(), "log10");
        assert_eq!(Operator::Pow.name(), "pow");
        assert_eq!(Operator::Where.name(), "where");
    }

    // ---- cast targets ----

    #[test]
    fn cast_targets() {
        assert_eq!(Operator::ToI16.cast_target(), Some(DataType::I16));
        assert_eq!(Operator::ToF64.cast_target(), Some(DataType::F64));
        assert_eq!(Operator::Sqrt.cast_target(), None);
        assert_eq!(Operator::Not.cast_target(), None);
    }

    // ---- flags ----

    #[test]
    fn flags_default_is_none() {
        assert_eq!(Flags::default(), Flags::NONE);
    }

    #[test]
    fn flags_compose_with_bitor() {
        let f = Flags::FREE_INPUTS | Flags::SCALAR_OK;
        assert!(f.free_inputs);
        assert!(!f.in_place);
        assert!(f.scalar_ok);

        let all = f | Flags::IN_PLACE;
        assert!(all.free_inputs && all.in_place && all.scalar_ok);
    }
}
