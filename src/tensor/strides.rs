//! Strides type and row-major index arithmetic

use super::shape::STACK_DIMS;
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// Strides type: element offsets between consecutive elements along each dimension
/// NOTE: Strides are in ELEMENTS, not bytes
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Strides(SmallVec<[usize; STACK_DIMS]>);

impl Strides {
    /// Row-major (C-order) strides for `shape`: the last axis is contiguous.
    ///
    /// # Example
    /// ```
    /// use relayout::tensor::Strides;
    /// assert_eq!(Strides::contiguous(&[2, 9, 3, 3]).as_slice(), &[81, 9, 3, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let mut strides: SmallVec<[usize; STACK_DIMS]> = SmallVec::with_capacity(shape.len());
        let mut stride = 1usize;

        // Compute strides from last dimension to first
        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim;
        }

        strides.reverse();
        Self(strides)
    }

    /// View strides as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl Deref for Strides {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Strides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Total element count of a shape (1 for zero dimensions)
#[inline]
pub fn elem_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Element count of `dims`, or `None` when it does not fit in `isize`
///
/// A shape that passes bounds every stride, offset and kernel literal derived
/// from it.
pub fn checked_elem_count(dims: impl IntoIterator<Item = usize>) -> Option<usize> {
    dims.into_iter()
        .try_fold(1usize, |count, dim| count.checked_mul(dim))
        .filter(|&count| isize::try_from(count).is_ok())
}

/// Ceiling division for positive extents
#[inline]
pub fn ceil_div(a: usize, b: usize) -> usize {
    a.div_ceil(b)
}

/// Mixed-radix decomposition of `linear` against `shape`, outermost axis first
///
/// The innermost axis varies fastest. Digits are written into `out`, which
/// must have `shape.len()` entries.
#[inline]
pub fn unravel_index_into(mut linear: usize, shape: &[usize], out: &mut [usize]) {
    debug_assert_eq!(shape.len(), out.len());
    for (slot, &dim) in out.iter_mut().zip(shape.iter()).rev() {
        *slot = linear % dim;
        linear /= dim;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_strides() {
        assert_eq!(Strides::contiguous(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert_eq!(Strides::contiguous(&[5]).as_slice(), &[1]);
        assert!(Strides::contiguous(&[]).is_empty());
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(9, 4), 3);
        assert_eq!(ceil_div(8, 4), 2);
        assert_eq!(ceil_div(1, 4), 1);
    }

    #[test]
    fn test_unravel() {
        let shape = [2, 3, 4];
        let mut index = [0; 3];
        unravel_index_into(4, &shape, &mut index);
        assert_eq!(index, [0, 1, 0]);
        unravel_index_into(23, &shape, &mut index);
        assert_eq!(index, [1, 2, 3]);
    }

    #[test]
    fn test_unravel_inverts_strides() {
        let shape = [2, 3, 3, 4];
        let strides = Strides::contiguous(&shape);
        let mut index = [0; 4];
        for linear in 0..elem_count(&shape) {
            unravel_index_into(linear, &shape, &mut index);
            let offset: usize = index.iter().zip(strides.iter()).map(|(i, s)| i * s).sum();
            assert_eq!(offset, linear);
        }
    }

    #[test]
    fn test_checked_elem_count() {
        assert_eq!(checked_elem_count([2, 9, 3, 3]), Some(162));
        assert_eq!(checked_elem_count(std::iter::empty()), Some(1));
        assert_eq!(checked_elem_count([usize::MAX / 2, 3, 1, 1]), None);
        assert_eq!(checked_elem_count([usize::MAX / 2 + 1]), None);
    }
}
