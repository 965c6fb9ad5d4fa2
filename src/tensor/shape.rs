//! Shape type: dimensions of a tensor

use smallvec::SmallVec;
use std::fmt;
use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

/// Stack allocation threshold for dimensions
/// Packed 4-D tensors normalize to 5 axes, so we stack-allocate up to 5
pub(crate) const STACK_DIMS: usize = 5;

/// Shape type: extents of a tensor, outermost axis first
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(SmallVec<[usize; STACK_DIMS]>);

impl Shape {
    /// Push a dimension.
    pub fn push(&mut self, dim: usize) {
        self.0.push(dim);
    }

    /// Insert a dimension at index.
    pub fn insert(&mut self, index: usize, value: usize) {
        self.0.insert(index, value);
    }

    /// View shape as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// Total number of elements (1 for a zero-dimensional shape)
    #[inline]
    pub fn elem_count(&self) -> usize {
        super::strides::elem_count(&self.0)
    }

    /// Product of the extents in `range`, 1 when the range is empty
    pub fn product_of(&self, range: std::ops::Range<usize>) -> usize {
        self.0[range].iter().product()
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl DerefMut for Shape {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}

impl AsRef<[usize]> for Shape {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Self(value.iter().copied().collect())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(value: [usize; N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_count() {
        let mut shape = Shape::from([2, 3, 3, 3]);
        shape[1] = 3;
        shape.insert(2, 4);
        assert_eq!(shape.as_slice(), &[2, 3, 4, 3, 3]);
        assert_eq!(shape.elem_count(), 216);
        assert_eq!(shape.len(), 5);
    }

    #[test]
    fn test_product_of() {
        let shape = Shape::from([2, 3, 3, 3, 4]);
        assert_eq!(shape.product_of(2..4), 9);
        assert_eq!(shape.product_of(0..0), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from([2, 9]).to_string(), "[2, 9]");
    }
}
