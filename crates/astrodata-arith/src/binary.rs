//! Binary operation executor.
//!
//! Currently the only binary operation is `pow`; the executor is written so
//! that adding another floating-point binary function is a one-line change
//! in the operator-to-function match. Both operands require an `f32` or
//! `f64` tag, the output tag is their promotion, and every element is
//! computed through `f64` and narrowed afterwards.
//!
//! Operands arrive through caller-owned `Option<Dataset>` slots, following
//! the same protocol as [`crate::unary::apply_unary`]: a successful call may
//! leave a slot empty (storage reused for the output, or released under
//! `free_inputs`); a failed call leaves both slots exactly as they were.

use alloc::vec::Vec;

use crate::broadcast::resolve_shape;
use crate::dataset::{ArrayStore, Dataset};
use crate::dtype::{result_type, DataType};
use crate::error::{Error, Result};
use crate::operator::{Flags, Operator};

type BinFn = fn(f64, f64) -> f64;

/// Apply a two-operand operation, producing a new or reused dataset.
///
/// With `flags.scalar_ok`, a size-1 operand on either side is broadcast
/// against the other; otherwise the shapes must match exactly. With
/// `flags.in_place`, the left operand's storage is reused when its tag and
/// size equal the output's, then the right operand is considered.
pub fn apply_binary(
    op: Operator,
    flags: Flags,
    left: &mut Option<Dataset>,
    right: &mut Option<Dataset>,
) -> Result<Dataset> {
    let (l, r) = match (left.take(), right.take()) {
        (Some(l), Some(r)) => (l, r),
        (l, r) => {
            *left = l;
            *right = r;
            return Err(Error::EmptyOperand);
        }
    };
    match binary_run(op, flags, l, r) {
        Ok((out, ls, rs)) => {
            *left = ls;
            *right = rs;
            Ok(out)
        }
        Err((err, l, r)) => {
            *left = Some(l);
            *right = Some(r);
            Err(err)
        }
    }
}

/// Success carries the output plus what goes back into each slot; failure
/// returns both operands untouched alongside the error.
type RunResult =
    core::result::Result<(Dataset, Option<Dataset>, Option<Dataset>), (Error, Dataset, Dataset)>;

enum Placement {
    Alloc,
    ReuseLeft,
    ReuseRight,
}

fn binary_run(op: Operator, flags: Flags, mut l: Dataset, mut r: Dataset) -> RunResult {
    let f: BinFn = match op {
        Operator::Pow => libm::pow,
        _ => return Err((Error::UnsupportedOperation(op), l, r)),
    };
    let shape = match resolve_shape(op, &l, &r, flags.scalar_ok) {
        Ok(s) => s,
        Err(e) => return Err((e, l, r)),
    };
    let otype = match result_type(op, l.dtype(), Some(r.dtype())) {
        Ok(t) => t,
        Err(e) => return Err((e, l, r)),
    };
    // The stricter residency threshold of the two operands carries over.
    let minmapsize = l.minmapsize.min(r.minmapsize);

    let placement = if flags.in_place && l.dtype() == otype && l.size == shape.size {
        Placement::ReuseLeft
    } else if flags.in_place && r.dtype() == otype && r.size == shape.size {
        Placement::ReuseRight
    } else {
        Placement::Alloc
    };

    match placement {
        Placement::Alloc => {
            let store = {
                let lv = FloatSlice::of(&l);
                let rv = FloatSlice::of(&r);
                match otype {
                    DataType::F32 => ArrayStore::F32(fresh_values(f, &lv, &rv, shape.size)),
                    DataType::F64 => ArrayStore::F64(fresh_values(f, &lv, &rv, shape.size)),
                    _ => unreachable!("floating output verified by result_type"),
                }
            };
            let out = Dataset::from_store(store, shape.dsize, minmapsize);
            Ok((out, keep(flags, l), keep(flags, r)))
        }
        Placement::ReuseLeft => {
            {
                let rv = FloatSlice::of(&r);
                match &mut l.array {
                    ArrayStore::F32(v) => reuse_values(f, v, &rv, true),
                    ArrayStore::F64(v) => reuse_values(f, v, &rv, true),
                    _ => unreachable!("reused operand carries the output tag"),
                }
            }
            l.dsize = shape.dsize;
            l.minmapsize = minmapsize;
            l.mmapped = l.nbytes() >= minmapsize;
            Ok((l, None, keep(flags, r)))
        }
        Placement::ReuseRight => {
            {
                let lv = FloatSlice::of(&l);
                match &mut r.array {
                    ArrayStore::F32(v) => reuse_values(f, v, &lv, false),
                    ArrayStore::F64(v) => reuse_values(f, v, &lv, false),
                    _ => unreachable!("reused operand carries the output tag"),
                }
            }
            r.dsize = shape.dsize;
            r.minmapsize = minmapsize;
            r.mmapped = r.nbytes() >= minmapsize;
            Ok((r, keep(flags, l), None))
        }
    }
}

/// The operand to hand back when the output did not reuse its storage.
fn keep(flags: Flags, d: Dataset) -> Option<Dataset> {
    if flags.free_inputs {
        None
    } else {
        Some(d)
    }
}

/// A floating element the executor can widen to `f64` and narrow back.
trait FloatElem: Copy {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl FloatElem for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl FloatElem for f64 {
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Borrowed view of a floating operand, erasing its width.
enum FloatSlice<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl FloatSlice<'_> {
    fn of(d: &Dataset) -> FloatSlice<'_> {
        match &d.array {
            ArrayStore::F32(v) => FloatSlice::F32(v),
            ArrayStore::F64(v) => FloatSlice::F64(v),
            _ => unreachable!("floating operands verified by result_type"),
        }
    }

    fn len(&self) -> usize {
        match self {
            FloatSlice::F32(v) => v.len(),
            FloatSlice::F64(v) => v.len(),
        }
    }

    fn get(&self, i: usize) -> f64 {
        match self {
            FloatSlice::F32(v) => f64::from(v[i]),
            FloatSlice::F64(v) => v[i],
        }
    }
}

/// Fill a fresh output of `size` elements, broadcasting a size-1 operand.
fn fresh_values<O: FloatElem>(f: BinFn, l: &FloatSlice, r: &FloatSlice, size: usize) -> Vec<O> {
    if l.len() == 1 {
        let lv = l.get(0);
        (0..size).map(|i| O::from_f64(f(lv, r.get(i)))).collect()
    } else if r.len() == 1 {
        let rv = r.get(0);
        (0..size).map(|i| O::from_f64(f(l.get(i), rv))).collect()
    } else {
        (0..size).map(|i| O::from_f64(f(l.get(i), r.get(i)))).collect()
    }
}

/// Overwrite a reused operand with the results. `out_is_left` records which
/// side of the operation the reused buffer was on.
fn reuse_values<O: FloatElem>(f: BinFn, out: &mut [O], other: &FloatSlice, out_is_left: bool) {
    let scalar = other.len() == 1;
    for (i, o) in out.iter_mut().enumerate() {
        let ov = other.get(if scalar { 0 } else { i });
        let x = o.to_f64();
        *o = O::from_f64(if out_is_left { f(x, ov) } else { f(ov, x) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn f64_data(values: &[f64]) -> Dataset {
        Dataset::new(ArrayStore::F64(values.to_vec()), vec![values.len()]).unwrap()
    }

    fn f32_data(values: &[f32]) -> Dataset {
        Dataset::new(ArrayStore::F32(values.to_vec()), vec![values.len()]).unwrap()
    }

    // ---- element values ----

    #[test]
    fn pow_elementwise_f64() {
        let mut l = Some(f64_data(&[2.0, 3.0, 4.0]));
        let mut r = Some(f64_data(&[2.0, 2.0, 3.0]));
        let out = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![4.0, 9.0, 64.0]));
        assert!(l.is_some() && r.is_some());
    }

    #[test]
    fn pow_f32_scalar_exponent() {
        let mut l = Some(f32_data(&[2.0, 2.0, 2.0]));
        let mut r = Some(f32_data(&[3.0]));
        let out = apply_binary(Operator::Pow, Flags::SCALAR_OK, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F32(vec![8.0, 8.0, 8.0]));
    }

    #[test]
    fn pow_scalar_base() {
        let mut l = Some(f64_data(&[2.0]));
        let mut r = Some(f64_data(&[1.0, 2.0, 3.0]));
        let out = apply_binary(Operator::Pow, Flags::SCALAR_OK, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![2.0, 4.0, 8.0]));
        assert_eq!(out.shape(), &[3]);
    }

    #[test]
    fn scalar_against_empty_placeholder() {
        // An ndim-0 placeholder broadcasts against a scalar to an empty
        // output; no element of either operand is touched.
        let mut l = Some(f64_data(&[2.0]));
        let mut r = Some(Dataset::new(ArrayStore::F64(vec![]), vec![]).unwrap());
        let out = apply_binary(Operator::Pow, Flags::SCALAR_OK, &mut l, &mut r).unwrap();
        assert_eq!(out.size, 0);
        assert!(out.shape().is_empty());
        assert_eq!(out.array, ArrayStore::F64(vec![]));

        let mut l = Some(Dataset::new(ArrayStore::F64(vec![]), vec![]).unwrap());
        let mut r = Some(f64_data(&[2.0]));
        let out = apply_binary(Operator::Pow, Flags::SCALAR_OK, &mut l, &mut r).unwrap();
        assert_eq!(out.size, 0);
        assert!(out.shape().is_empty());
    }

    #[test]
    fn mixed_width_promotes_to_f64() {
        let mut l = Some(f32_data(&[2.0, 3.0]));
        let mut r = Some(f64_data(&[2.0, 2.0]));
        let out = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![4.0, 9.0]));
    }

    // ---- shape handling ----

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = f64_data(&[1.0, 2.0, 3.0, 4.0]);
        let b = f64_data(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut l = Some(a.clone());
        let mut r = Some(b.clone());
        let err = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(l, Some(a));
        assert_eq!(r, Some(b));
    }

    #[test]
    fn scalar_needs_permission() {
        let mut l = Some(f64_data(&[1.0, 2.0, 3.0]));
        let mut r = Some(f64_data(&[2.0]));
        let err = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(l.is_some() && r.is_some());
    }

    // ---- operand type guards ----

    #[test]
    fn integer_operand_is_rejected() {
        let a = Dataset::new(ArrayStore::I32(vec![1, 2]), vec![2]).unwrap();
        let b = f64_data(&[1.0, 2.0]);
        let mut l = Some(a.clone());
        let mut r = Some(b.clone());
        let err = apply_binary(
            Operator::Pow,
            Flags::FREE_INPUTS | Flags::IN_PLACE,
            &mut l,
            &mut r,
        )
        .unwrap_err();
        match err {
            Error::UnsupportedOperandType { operand, .. } => assert_eq!(operand, "first"),
            other => panic!("expected UnsupportedOperandType, got {other:?}"),
        }
        // Failure restores both slots even under free_inputs.
        assert_eq!(l, Some(a));
        assert_eq!(r, Some(b));
    }

    #[test]
    fn unary_operator_is_rejected() {
        let mut l = Some(f64_data(&[1.0]));
        let mut r = Some(f64_data(&[1.0]));
        let err = apply_binary(Operator::Not, Flags::NONE, &mut l, &mut r).unwrap_err();
        assert_eq!(err, Error::UnsupportedOperation(Operator::Not));
    }

    #[test]
    fn empty_slot_is_a_defect() {
        let b = f64_data(&[1.0]);
        let mut l: Option<Dataset> = None;
        let mut r = Some(b.clone());
        let err = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap_err();
        assert_eq!(err, Error::EmptyOperand);
        assert_eq!(r, Some(b));
    }

    // ---- placement and slot occupancy ----

    #[test]
    fn in_place_prefers_left() {
        let mut l = Some(f64_data(&[2.0, 3.0]));
        let mut r = Some(f64_data(&[2.0, 2.0]));
        let out = apply_binary(Operator::Pow, Flags::IN_PLACE, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![4.0, 9.0]));
        assert!(l.is_none(), "left storage became the output");
        assert!(r.is_some());
    }

    #[test]
    fn in_place_falls_back_to_right() {
        // Left is a scalar under broadcast, so only the right can be reused.
        let mut l = Some(f64_data(&[2.0]));
        let mut r = Some(f64_data(&[1.0, 2.0, 3.0]));
        let out = apply_binary(
            Operator::Pow,
            Flags::IN_PLACE | Flags::SCALAR_OK,
            &mut l,
            &mut r,
        )
        .unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![2.0, 4.0, 8.0]));
        assert!(l.is_some());
        assert!(r.is_none(), "right storage became the output");
    }

    #[test]
    fn in_place_needs_matching_tag() {
        // f32 left promotes to an f64 output, so only the f64 right can be
        // reused.
        let mut l = Some(f32_data(&[2.0, 3.0]));
        let mut r = Some(f64_data(&[2.0, 2.0]));
        let out = apply_binary(Operator::Pow, Flags::IN_PLACE, &mut l, &mut r).unwrap();
        assert_eq!(out.dtype(), crate::dtype::DataType::F64);
        assert_eq!(out.array, ArrayStore::F64(vec![4.0, 9.0]));
        assert!(l.is_some(), "f32 left cannot hold the f64 output");
        assert!(r.is_none(), "f64 right became the output");
    }

    #[test]
    fn in_place_and_fresh_agree() {
        let base = f64_data(&[1.5, 2.5, 3.5, 4.5]);
        let exp = f64_data(&[2.0, 0.5, 3.0, 1.0]);

        let mut l = Some(base.clone());
        let mut r = Some(exp.clone());
        let fresh = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap();

        let mut l = Some(base);
        let mut r = Some(exp);
        let reused = apply_binary(Operator::Pow, Flags::IN_PLACE, &mut l, &mut r).unwrap();

        assert_eq!(fresh.array, reused.array);
    }

    #[test]
    fn free_inputs_empties_both_slots() {
        let mut l = Some(f64_data(&[2.0, 3.0]));
        let mut r = Some(f64_data(&[2.0, 2.0]));
        let out = apply_binary(Operator::Pow, Flags::FREE_INPUTS, &mut l, &mut r).unwrap();
        assert_eq!(out.array, ArrayStore::F64(vec![4.0, 9.0]));
        assert!(l.is_none() && r.is_none());
    }

    #[test]
    fn flag_combinations_slot_occupancy() {
        // (flags, left emptied, right emptied); operands are same-tag f64
        // vectors, so in_place always reuses the left.
        let cases: [(Flags, bool, bool); 4] = [
            (Flags::NONE, false, false),
            (Flags::FREE_INPUTS, true, true),
            (Flags::IN_PLACE, true, false),
            (Flags::FREE_INPUTS | Flags::IN_PLACE, true, true),
        ];
        for (flags, l_empty, r_empty) in cases {
            let mut l = Some(f64_data(&[2.0, 3.0]));
            let mut r = Some(f64_data(&[1.0, 2.0]));
            apply_binary(Operator::Pow, flags, &mut l, &mut r).unwrap();
            assert_eq!(l.is_none(), l_empty, "left slot under {flags:?}");
            assert_eq!(r.is_none(), r_empty, "right slot under {flags:?}");
        }
    }

    // ---- residency threshold ----

    #[test]
    fn minmapsize_takes_the_minimum() {
        let mut a = f64_data(&[2.0, 3.0]);
        a.minmapsize = 100;
        let mut b = f64_data(&[2.0, 2.0]);
        b.minmapsize = 8;
        let mut l = Some(a);
        let mut r = Some(b);
        let out = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap();
        assert_eq!(out.minmapsize, 8);
        assert!(out.mmapped, "16 bytes of output meet an 8-byte threshold");
    }

    #[test]
    fn pow_handles_special_values() {
        let mut l = Some(f64_data(&[0.0, -1.0, 4.0]));
        let mut r = Some(f64_data(&[0.0, 0.5, -0.5]));
        let out = apply_binary(Operator::Pow, Flags::NONE, &mut l, &mut r).unwrap();
        match out.array {
            ArrayStore::F64(v) => {
                assert_eq!(v[0], 1.0);
                assert!(v[1].is_nan());
                assert_eq!(v[2], 0.5);
            }
            other => panic!("expected F64, got {other:?}"),
        }
    }
}
