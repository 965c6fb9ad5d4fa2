//! Conversion planning shared by every backend
//!
//! A [`TransformContext`] reduces any valid layout pair to a plain axis
//! permutation between two equal-rank index spaces. When one side packs an
//! axis and the other does not, the unpacked side gets a synthetic lane axis
//! after the packed one and its extent is rounded up to whole vectors. The
//! resulting [`IndexMap`] turns each destination coordinate into a source
//! offset, or into padding when the folded coordinate falls past the true
//! extent.

mod context;
mod index_map;

pub use context::TransformContext;
pub use index_map::{Coord, IndexMap, SourceTerm};

/// Orientation of the internal mapping relative to the caller's
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The caller's source is the internal source
    Forward,
    /// Only the caller's source is packed, so the layouts are swapped
    ///
    /// Executors walk the packed index space, read the caller's buffer at each
    /// point and write to the unpacked offset, skipping padding.
    Reversed,
}

/// Packing boundary in ceiling-source space
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fold {
    /// Group axis; the lane axis follows at `axis + 1`
    pub axis: usize,
    /// Vector width
    pub factor: usize,
    /// True extent before rounding up
    pub extent: usize,
}

/// Caller-facing side of a conversion
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSide {
    /// The caller's source layout
    Source,
    /// The caller's destination layout
    Destination,
}

/// Which layout lives on an image surface, and where its axes split
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImagePlacement {
    /// Layout carrying the delimiter
    pub side: ImageSide,
    /// Number of labeled axes in the height group
    pub split: usize,
}
