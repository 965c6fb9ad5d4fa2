//! Destination coordinate to source offset mapping

use super::TransformContext;
use crate::tensor::Strides;

/// How one source coordinate is obtained from a destination coordinate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Coord {
    /// Read directly from this destination axis
    Axis(usize),
    /// `dest[group] * factor + dest[lane]`, valid only below `extent`
    Folded {
        /// Destination axis holding the vector group index
        group: usize,
        /// Destination axis holding the lane index
        lane: usize,
        /// Vector width
        factor: usize,
        /// True extent of the packed axis
        extent: usize,
    },
}

impl Coord {
    /// Evaluate against a destination coordinate, `None` for padding
    #[inline]
    pub fn eval(&self, dest: &[usize]) -> Option<usize> {
        match *self {
            Self::Axis(axis) => Some(dest[axis]),
            Self::Folded {
                group,
                lane,
                factor,
                extent,
            } => {
                let value = dest[group] * factor + dest[lane];
                (value < extent).then_some(value)
            }
        }
    }
}

/// One addend of a source offset
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceTerm {
    /// Source coordinate along this axis
    pub coord: Coord,
    /// Row-major stride of this axis in the source buffer
    pub stride: usize,
}

/// Source offset of every destination coordinate, as a sum of terms
///
/// Terms are listed in source buffer axis order. This is the single
/// description of the mapping: the CPU executor evaluates it and the kernel
/// generator prints it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMap {
    terms: Vec<SourceTerm>,
    dest_shape: Vec<usize>,
}

impl IndexMap {
    /// Derive the terms from a normalized context
    pub fn new(ctx: &TransformContext) -> Self {
        let permutation = ctx.permutation();
        // ceiling-space source axis -> destination axis
        let mut inverse = vec![0; permutation.len()];
        for (dest_axis, &source_axis) in permutation.iter().enumerate() {
            inverse[source_axis] = dest_axis;
        }

        let strides = Strides::contiguous(ctx.source_shape());
        let terms = match ctx.fold() {
            None => inverse
                .iter()
                .zip(strides.iter())
                .map(|(&dest_axis, &stride)| SourceTerm {
                    coord: Coord::Axis(dest_axis),
                    stride,
                })
                .collect(),
            Some(fold) => strides
                .iter()
                .enumerate()
                .map(|(axis, &stride)| {
                    let coord = if axis == fold.axis {
                        Coord::Folded {
                            group: inverse[axis],
                            lane: inverse[axis + 1],
                            factor: fold.factor,
                            extent: fold.extent,
                        }
                    } else if axis < fold.axis {
                        Coord::Axis(inverse[axis])
                    } else {
                        Coord::Axis(inverse[axis + 1])
                    };
                    SourceTerm { coord, stride }
                })
                .collect(),
        };

        Self {
            terms,
            dest_shape: ctx.dest_shape().to_vec(),
        }
    }

    /// Terms in source axis order
    pub fn terms(&self) -> &[SourceTerm] {
        &self.terms
    }

    /// Destination extents the terms index into
    pub fn dest_shape(&self) -> &[usize] {
        &self.dest_shape
    }

    /// The folded term, if the conversion packs an axis
    pub fn folded_term(&self) -> Option<&SourceTerm> {
        self.terms
            .iter()
            .find(|t| matches!(t.coord, Coord::Folded { .. }))
    }

    /// Linear source offset for a destination coordinate, `None` for padding
    #[inline]
    pub fn source_offset(&self, dest: &[usize]) -> Option<usize> {
        self.terms
            .iter()
            .try_fold(0usize, |acc, term| Some(acc + term.coord.eval(dest)? * term.stride))
    }

    /// [`Self::source_offset`] for a linear destination index
    ///
    /// `scratch` must have one slot per destination axis.
    #[inline]
    pub fn source_offset_linear(&self, dest: usize, scratch: &mut [usize]) -> Option<usize> {
        crate::tensor::unravel_index_into(dest, &self.dest_shape, scratch);
        self.source_offset(scratch)
    }
}
