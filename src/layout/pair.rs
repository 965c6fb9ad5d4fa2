//! Source/destination layout pairs and packing classification

use super::descriptor::{Axis, LayoutDesc};
use crate::error::{Error, Result};

/// Which side of a conversion carries a packed axis
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PackMode {
    /// Neither layout is packed
    None,
    /// Only the source is packed
    SourcePacked,
    /// Only the destination is packed
    DestPacked,
    /// Both layouts pack the same axis by the same width
    BothPacked,
}

impl PackMode {
    /// Classify a pair from the trailing character of each string
    ///
    /// A valid packed layout always ends in its repeated packing digit, so the
    /// last character is enough. Only meaningful for strings that parse.
    pub fn classify(from: &str, to: &str) -> Self {
        let trailing_digit = |s: &str| s.chars().last().is_some_and(|c| c.is_ascii_digit());
        Self::from_flags(trailing_digit(from), trailing_digit(to))
    }

    fn from_flags(from_packed: bool, to_packed: bool) -> Self {
        match (from_packed, to_packed) {
            (true, true) => Self::BothPacked,
            (true, false) => Self::SourcePacked,
            (false, true) => Self::DestPacked,
            (false, false) => Self::None,
        }
    }
}

/// Two layouts that have been checked against each other
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutPair {
    from: LayoutDesc,
    to: LayoutDesc,
    mode: PackMode,
}

impl LayoutPair {
    /// Parse both layouts and check they describe the same tensor
    ///
    /// Rejects image placement on both sides, packing that differs between two
    /// packed layouts, and label sets that are not permutations of each other.
    pub fn new(from: &str, to: &str) -> Result<Self> {
        let from = LayoutDesc::parse(from)?;
        let to = LayoutDesc::parse(to)?;
        Self::from_descs(from, to)
    }

    /// Check two already parsed layouts
    pub fn from_descs(from: LayoutDesc, to: LayoutDesc) -> Result<Self> {
        if from.is_image() && to.is_image() {
            return Err(Error::ImageToImage {
                from: from.canonical().to_string(),
                to: to.canonical().to_string(),
            });
        }

        if let (Some(a), Some(b)) = (from.packing(), to.packing()) {
            if from.packed_axis() != to.packed_axis() || a.factor != b.factor {
                return Err(Error::PackedAxisMismatch {
                    from: from.canonical().to_string(),
                    to: to.canonical().to_string(),
                });
            }
        }

        let mut from_labels: Vec<Axis> = from.labels().to_vec();
        let mut to_labels: Vec<Axis> = to.labels().to_vec();
        from_labels.sort_unstable();
        to_labels.sort_unstable();
        if from_labels != to_labels {
            return Err(Error::label_mismatch(from.canonical(), to.canonical()));
        }

        let mode = PackMode::from_flags(from.is_packed(), to.is_packed());
        debug_assert_eq!(mode, PackMode::classify(from.canonical(), to.canonical()));

        Ok(Self { from, to, mode })
    }

    /// Source layout
    pub fn from(&self) -> &LayoutDesc {
        &self.from
    }

    /// Destination layout
    pub fn to(&self) -> &LayoutDesc {
        &self.to
    }

    /// Packing classification
    pub fn pack_mode(&self) -> PackMode {
        self.mode
    }

    /// Whether both layouts place axes and packing identically
    pub fn is_identity(&self) -> bool {
        self.from.same_arrangement(&self.to)
    }

    /// Layout whose label order the caller's shape follows
    ///
    /// This is the unpacked side, or the source when both sides agree on
    /// packing.
    pub fn shape_layout(&self) -> &LayoutDesc {
        match self.mode {
            PackMode::SourcePacked => &self.to,
            _ => &self.from,
        }
    }
}
