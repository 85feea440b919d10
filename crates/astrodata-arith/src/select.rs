//! Masked-select executor: the `where` operation.
//!
//! `where` overwrites elements of an existing output dataset wherever a
//! logical condition is nonzero, taking replacement values from a third
//! operand of any type (converted elementwise to the output's tag). The
//! output is mutated through `&mut Dataset` and never consumed; the
//! condition and replacement operands use the same `Option<Dataset>` slot
//! protocol as the other executors.

use crate::dataset::{ArrayStore, Dataset};
use crate::dtype::DataType;
use crate::error::{Error, Result};
use crate::operator::{Flags, Operator};

/// Overwrite `out[i]` with the replacement value wherever `cond[i]` is
/// nonzero.
///
/// The condition must carry the `logical` tag and match the output's shape
/// exactly. The replacement operand may be a size-1 scalar (applied at every
/// selected position) or match the output's size; its elements are converted
/// to the output's tag with the same narrowing rules as the cast operators.
///
/// Only `flags.free_inputs` is consulted: it releases the condition and
/// replacement operands on success, never the output. A failed call leaves
/// all three operands untouched.
pub fn apply_where(
    flags: Flags,
    out: &mut Dataset,
    cond: &mut Option<Dataset>,
    iftrue: &mut Option<Dataset>,
) -> Result<()> {
    let c = cond.as_ref().ok_or(Error::EmptyOperand)?;
    let t = iftrue.as_ref().ok_or(Error::EmptyOperand)?;

    if c.dtype() != DataType::Logical {
        return Err(Error::UnsupportedOperandType {
            operator: Operator::Where,
            operand: "condition",
            dtype: c.dtype(),
            expected: "a logical operand (the result of a comparison or 'not')",
        });
    }
    if !out.same_shape(c) {
        return Err(Error::ShapeMismatch {
            operator: Operator::Where,
            left: out.dsize.clone(),
            right: c.dsize.clone(),
        });
    }
    if t.size != 1 && t.size != out.size {
        return Err(Error::ShapeMismatch {
            operator: Operator::Where,
            left: out.dsize.clone(),
            right: t.dsize.clone(),
        });
    }

    let bits: &[u8] = match &c.array {
        ArrayStore::Logical(v) => v,
        _ => unreachable!("condition tag verified above"),
    };

    // Inner dispatch over the replacement store for one output element type.
    macro_rules! where_fill {
        ($ov:expr, $oty:ty) => {
            match &t.array {
                ArrayStore::U8(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::I8(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::Logical(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::U16(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::I16(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::U32(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::I32(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::U64(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::I64(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::LongLong(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::F32(tv) => where_loop($ov, bits, tv, |x| x as $oty),
                ArrayStore::F64(tv) => where_loop($ov, bits, tv, |x| x as $oty),
            }
        };
    }

    match &mut out.array {
        ArrayStore::U8(v) => where_fill!(v, u8),
        ArrayStore::I8(v) => where_fill!(v, i8),
        ArrayStore::Logical(v) => where_fill!(v, u8),
        ArrayStore::U16(v) => where_fill!(v, u16),
        ArrayStore::I16(v) => where_fill!(v, i16),
        ArrayStore::U32(v) => where_fill!(v, u32),
        ArrayStore::I32(v) => where_fill!(v, i32),
        ArrayStore::U64(v) => where_fill!(v, u64),
        ArrayStore::I64(v) => where_fill!(v, i64),
        ArrayStore::LongLong(v) => where_fill!(v, i64),
        ArrayStore::F32(v) => where_fill!(v, f32),
        ArrayStore::F64(v) => where_fill!(v, f64),
    }

    if flags.free_inputs {
        *cond = None;
        *iftrue = None;
    }
    Ok(())
}

/// Write converted replacement values at every selected position. A size-1
/// replacement is broadcast; otherwise it runs in lockstep with the output.
fn where_loop<O: Copy, T: Copy>(out: &mut [O], cond: &[u8], iftrue: &[T], conv: impl Fn(T) -> O) {
    if iftrue.len() == 1 {
        let v = conv(iftrue[0]);
        for (o, &c) in out.iter_mut().zip(cond) {
            if c != 0 {
                *o = v;
            }
        }
    } else {
        for ((o, &c), &t) in out.iter_mut().zip(cond).zip(iftrue) {
            if c != 0 {
                *o = conv(t);
            }
        }
    }
}
