//! Shape compatibility and scalar broadcasting for binary operations.

use alloc::vec::Vec;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::operator::Operator;

/// Resolved output geometry of a binary elementwise operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutShape {
    /// Per-axis extents of the output, row-major.
    pub dsize: Vec<usize>,
    /// Total element count of the output.
    pub size: usize,
}

impl OutShape {
    /// Number of axes of the output.
    pub fn ndim(&self) -> usize {
        self.dsize.len()
    }
}

/// Decide whether two operands are shape-compatible and compute the output
/// geometry.
///
/// Equal-size operands must have identical shapes. When `scalar_ok` is set
/// and either operand has exactly one element, the shape-identity check is
/// skipped and the scalar pairs with every element of the other operand; the
/// output takes the non-scalar operand's shape and size (the right
/// operand's when both are scalars), so a scalar paired with an empty
/// placeholder yields an empty output. Without `scalar_ok` any size
/// difference, even against a size-1 operand, is a
/// [`Error::ShapeMismatch`].
pub fn resolve_shape(
    op: Operator,
    left: &Dataset,
    right: &Dataset,
    scalar_ok: bool,
) -> Result<OutShape> {
    let scalar_pair = scalar_ok && (left.size == 1 || right.size == 1);
    if !scalar_pair && !left.same_shape(right) {
        return Err(Error::ShapeMismatch {
            operator: op,
            left: left.dsize.clone(),
            right: right.dsize.clone(),
        });
    }
    // Size must stay the product of the chosen shape, so both come from the
    // same operand: the non-scalar one (the right when both are size 1).
    let src = if left.size != 1 { left } else { right };
    Ok(OutShape {
        dsize: src.dsize.clone(),
        size: src.size,
    })
}
