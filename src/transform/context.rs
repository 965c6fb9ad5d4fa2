//! Normalized description of one conversion

use super::{Direction, Fold, ImagePlacement, ImageSide, IndexMap};
use crate::error::{Error, Result};
use crate::layout::{Axis, LayoutDesc, LayoutPair, PackMode};
use crate::tensor::{Shape, ceil_div, checked_elem_count};

/// Everything the executors need to know about a conversion
///
/// Built once per call from a validated [`LayoutPair`] and a logical shape.
/// When only the source is packed the pair is swapped internally (see
/// [`Direction::Reversed`]) so that the packed side is always the internal
/// destination; all accessors describe that internal orientation.
#[derive(Clone, Debug)]
pub struct TransformContext {
    pair: LayoutPair,
    direction: Direction,
    /// Internal destination axes
    dest_axes: Vec<Axis>,
    /// Extents of the internal source buffer as stored
    source_shape: Shape,
    /// Internal source extents in ceiling space, same rank as `dest_shape`
    ceil_shape: Shape,
    dest_shape: Shape,
    /// `dest_shape[i] == ceil_shape[permutation[i]]`
    permutation: Vec<usize>,
    fold: Option<Fold>,
    image: Option<ImagePlacement>,
}

impl TransformContext {
    /// Parse, validate and normalize a conversion
    pub fn new(from: &str, to: &str, shape: &[usize]) -> Result<Self> {
        Self::from_pair(LayoutPair::new(from, to)?, shape)
    }

    /// Normalize an already validated pair
    ///
    /// `shape` holds logical extents in the label order of
    /// [`LayoutPair::shape_layout`].
    pub fn from_pair(pair: LayoutPair, shape: &[usize]) -> Result<Self> {
        let mode = pair.pack_mode();
        let direction = match mode {
            PackMode::SourcePacked => Direction::Reversed,
            _ => Direction::Forward,
        };
        let (source, dest) = match direction {
            Direction::Forward => (pair.from(), pair.to()),
            Direction::Reversed => (pair.to(), pair.from()),
        };
        source.check_shape(shape)?;

        let normalized = normalize(source, dest, mode, shape)?;
        if checked_elem_count(normalized.ceil_shape.iter().copied()).is_none() {
            return Err(Error::InvalidShape {
                shape: shape.to_vec(),
            });
        }
        let dest_axes = dest.axes().to_vec();
        let permutation = permutation(&normalized.source_axes, &dest_axes, source, dest)?;
        let dest_shape: Shape = permutation.iter().map(|&i| normalized.ceil_shape[i]).collect();

        let image = image_placement(&pair);

        log::debug!(
            "relayout {} -> {}: mode={:?} direction={:?} ceil_shape={} dest_shape={} perm={:?}",
            pair.from(),
            pair.to(),
            mode,
            direction,
            normalized.ceil_shape,
            dest_shape,
            permutation
        );

        Ok(Self {
            pair,
            direction,
            dest_axes,
            source_shape: normalized.source_shape,
            ceil_shape: normalized.ceil_shape,
            dest_shape,
            permutation,
            fold: normalized.fold,
            image,
        })
    }

    /// The validated caller-facing layouts
    pub fn pair(&self) -> &LayoutPair {
        &self.pair
    }

    /// Packing classification
    pub fn pack_mode(&self) -> PackMode {
        self.pair.pack_mode()
    }

    /// Whether the internal orientation is swapped relative to the caller's
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Internal source layout
    pub fn source_layout(&self) -> &LayoutDesc {
        match self.direction {
            Direction::Forward => self.pair.from(),
            Direction::Reversed => self.pair.to(),
        }
    }

    /// Internal destination layout (the packed side whenever one exists)
    pub fn dest_layout(&self) -> &LayoutDesc {
        match self.direction {
            Direction::Forward => self.pair.to(),
            Direction::Reversed => self.pair.from(),
        }
    }

    /// Internal destination axes
    pub fn dest_axes(&self) -> &[Axis] {
        &self.dest_axes
    }

    /// Extents of the internal source buffer as it is stored
    pub fn source_shape(&self) -> &Shape {
        &self.source_shape
    }

    /// Internal source extents with the packed axis split into groups and lanes
    pub fn ceil_shape(&self) -> &Shape {
        &self.ceil_shape
    }

    /// Internal destination extents
    pub fn dest_shape(&self) -> &Shape {
        &self.dest_shape
    }

    /// Source axis (ceiling space) read by each destination axis
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Packing boundary in ceiling-source space, if the sides pack differently
    pub fn fold(&self) -> Option<Fold> {
        self.fold
    }

    /// Image surface placement requested by either layout
    pub fn image(&self) -> Option<ImagePlacement> {
        self.image
    }

    /// Element count of the internal source buffer
    pub fn source_len(&self) -> usize {
        self.source_shape.elem_count()
    }

    /// Element count of the internal destination buffer
    pub fn dest_len(&self) -> usize {
        self.dest_shape.elem_count()
    }

    /// Element count of the buffer the caller hands in
    pub fn input_len(&self) -> usize {
        match self.direction {
            Direction::Forward => self.source_len(),
            Direction::Reversed => self.dest_len(),
        }
    }

    /// Element count of the buffer handed back to the caller
    pub fn output_len(&self) -> usize {
        match self.direction {
            Direction::Forward => self.dest_len(),
            Direction::Reversed => self.source_len(),
        }
    }

    /// Source offset terms for every destination coordinate
    pub fn index_map(&self) -> IndexMap {
        IndexMap::new(self)
    }
}

struct Normalized {
    source_axes: Vec<Axis>,
    source_shape: Shape,
    ceil_shape: Shape,
    fold: Option<Fold>,
}

/// Bring the source to the destination's rank
///
/// If only the destination is packed, the matching source axis `i` is split
/// into `ceil(extent / k)` groups at `i` and a lane axis of extent `k` at
/// `i + 1`. If both are packed, the source buffer already stores that split
/// with the lane last.
fn normalize(
    source: &LayoutDesc,
    dest: &LayoutDesc,
    mode: PackMode,
    shape: &[usize],
) -> Result<Normalized> {
    match mode {
        PackMode::None => Ok(Normalized {
            source_axes: source.axes().to_vec(),
            source_shape: Shape::from(shape),
            ceil_shape: Shape::from(shape),
            fold: None,
        }),
        PackMode::BothPacked => {
            let physical = source.physical_shape(shape)?;
            Ok(Normalized {
                source_axes: source.axes().to_vec(),
                source_shape: physical.clone(),
                ceil_shape: physical,
                fold: None,
            })
        }
        PackMode::DestPacked | PackMode::SourcePacked => {
            let packing = dest.packing().ok_or_else(|| {
                Error::unsupported("normalization", "packed side lost its packing")
            })?;
            let label = dest.axes()[packing.axis];
            let axis = source
                .axes()
                .iter()
                .position(|&a| a == label)
                .ok_or_else(|| Error::label_mismatch(source.canonical(), dest.canonical()))?;

            let mut source_axes = source.axes().to_vec();
            source_axes.insert(axis + 1, Axis::Lane);

            let mut ceil_shape = Shape::from(shape);
            ceil_shape[axis] = ceil_div(shape[axis], packing.factor);
            ceil_shape.insert(axis + 1, packing.factor);

            Ok(Normalized {
                source_axes,
                source_shape: Shape::from(shape),
                ceil_shape,
                fold: Some(Fold {
                    axis,
                    factor: packing.factor,
                    extent: shape[axis],
                }),
            })
        }
    }
}

/// For each destination axis, the index of the same axis in `source_axes`
fn permutation(
    source_axes: &[Axis],
    dest_axes: &[Axis],
    source: &LayoutDesc,
    dest: &LayoutDesc,
) -> Result<Vec<usize>> {
    let mismatch = || Error::label_mismatch(source.canonical(), dest.canonical());

    let mut sorted_source = source_axes.to_vec();
    let mut sorted_dest = dest_axes.to_vec();
    sorted_source.sort_unstable();
    sorted_dest.sort_unstable();
    if sorted_source != sorted_dest {
        return Err(mismatch());
    }

    dest_axes
        .iter()
        .map(|axis| source_axes.iter().position(|a| a == axis).ok_or_else(mismatch))
        .collect()
}

fn image_placement(pair: &LayoutPair) -> Option<ImagePlacement> {
    if let Some(split) = pair.from().image_split() {
        return Some(ImagePlacement {
            side: ImageSide::Source,
            split,
        });
    }
    pair.to().image_split().map(|split| ImagePlacement {
        side: ImageSide::Destination,
        split,
    })
}
