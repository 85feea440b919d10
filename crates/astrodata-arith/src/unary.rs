//! Unary operation executor: type casts, logical negation, and the
//! floating-point functions (square root, natural and base-10 logarithm).
//!
//! [`apply_unary`] consumes its operand through a caller-owned
//! `Option<Dataset>` slot. On success the slot is left empty when the
//! operand was reused in place or released under `free_inputs`, and refilled
//! with the untouched operand otherwise. On error the slot always holds
//! exactly what it held before the call.

use alloc::vec::Vec;

use crate::dataset::{ArrayStore, Dataset};
use crate::dtype::result_type;
use crate::error::{Error, Result};
use crate::operator::{Flags, Operator};

/// Apply a single-operand operation, producing a new or reused dataset.
///
/// The output type comes from [`result_type`]: the fixed target for casts,
/// `logical` for `not`, the operand's own tag for the floating functions.
/// With `flags.in_place` set and the output tag equal to the input tag, the
/// operand's storage becomes the output without a new allocation.
pub fn apply_unary(op: Operator, flags: Flags, slot: &mut Option<Dataset>) -> Result<Dataset> {
    let input = slot.take().ok_or(Error::EmptyOperand)?;
    match unary_run(op, flags, input) {
        Ok((out, spare)) => {
            *slot = spare;
            Ok(out)
        }
        Err((err, input)) => {
            *slot = Some(input);
            Err(err)
        }
    }
}

/// Success carries the output plus the operand to hand back to the caller's
/// slot (`None` when reused or released); failure returns the untouched
/// operand alongside the error.
type RunResult = core::result::Result<(Dataset, Option<Dataset>), (Error, Dataset)>;

fn unary_run(op: Operator, flags: Flags, mut input: Dataset) -> RunResult {
    let otype = match result_type(op, input.dtype(), None) {
        Ok(t) => t,
        Err(e) => return Err((e, input)),
    };
    let reuse = flags.in_place && otype == input.dtype();

    if op.cast_target().is_some() {
        // A cast to the operand's own tag under in_place is the identity.
        if reuse {
            return Ok((input, None));
        }
        let out = input.copy_to_type(otype);
        return Ok((out, spare(flags, input)));
    }

    match op {
        Operator::Not => {
            if reuse {
                match &mut input.array {
                    ArrayStore::Logical(v) => {
                        for x in v.iter_mut() {
                            *x = u8::from(*x == 0);
                        }
                    }
                    _ => unreachable!("in-place 'not' implies a logical operand"),
                }
                return Ok((input, None));
            }
            let bits: Vec<u8> = match &input.array {
                ArrayStore::U8(v) | ArrayStore::Logical(v) => logical_not(v),
                ArrayStore::I8(v) => logical_not(v),
                ArrayStore::U16(v) => logical_not(v),
                ArrayStore::I16(v) => logical_not(v),
                ArrayStore::U32(v) => logical_not(v),
                ArrayStore::I32(v) => logical_not(v),
                ArrayStore::U64(v) => logical_not(v),
                ArrayStore::I64(v) | ArrayStore::LongLong(v) => logical_not(v),
                ArrayStore::F32(v) => logical_not(v),
                ArrayStore::F64(v) => logical_not(v),
            };
            let out = Dataset::from_store(
                ArrayStore::Logical(bits),
                input.dsize.clone(),
                input.minmapsize,
            );
            Ok((out, spare(flags, input)))
        }
        Operator::Sqrt | Operator::Log | Operator::Log10 => {
            let f: fn(f64) -> f64 = match op {
                Operator::Sqrt => libm::sqrt,
                Operator::Log => libm::log,
                _ => libm::log10,
            };
            if reuse {
                match &mut input.array {
                    ArrayStore::F32(v) => {
                        for x in v.iter_mut() {
                            *x = f(f64::from(*x)) as f32;
                        }
                    }
                    ArrayStore::F64(v) => {
                        for x in v.iter_mut() {
                            *x = f(*x);
                        }
                    }
                    _ => unreachable!("floating operand verified by result_type"),
                }
                return Ok((input, None));
            }
            let store = match &input.array {
                ArrayStore::F32(v) => {
                    ArrayStore::F32(v.iter().map(|&x| f(f64::from(x)) as f32).collect())
                }
                ArrayStore::F64(v) => ArrayStore::F64(v.iter().map(|&x| f(x)).collect()),
                _ => unreachable!("floating operand verified by result_type"),
            };
            let out = Dataset::from_store(store, input.dsize.clone(), input.minmapsize);
            Ok((out, spare(flags, input)))
        }
        // result_type already rejects anything else; keep the executor total.
        _ => Err((Error::UnsupportedOperation(op), input)),
    }
}

/// The operand to hand back when the output did not reuse its storage.
fn spare(flags: Flags, input: Dataset) -> Option<Dataset> {
    if flags.free_inputs {
        None
    } else {
        Some(input)
    }
}

/// One byte per element: 1 where the element is zero, 0 elsewhere. NaN is
/// nonzero and maps to 0.
fn logical_not<T: Copy + Default + PartialEq>(v: &[T]) -> Vec<u8> {
    v.iter().map(|&x| u8::from(x == T::default())).collect()
}
