//! Error types for relayout

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using relayout's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Malformed and incompatible layouts are caller mistakes that can be retried
/// with corrected input. Geometry mismatches mean the shape or buffer handed in
/// does not describe the tensor the layouts talk about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid characters, digit placement, or delimiter count
    MalformedLayout,
    /// Layouts parse but cannot be converted into each other
    IncompatibleLayouts,
    /// Shape rank, extents, or buffer length disagree with the layouts
    GeometryMismatch,
}

/// Errors that can occur in relayout operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Layout string contains something other than letters, digits and `|`
    #[error("Invalid character '{ch}' at position {position} in layout \"{layout}\"")]
    InvalidCharacter {
        /// The offending layout string
        layout: String,
        /// The rejected character
        ch: char,
        /// Character position within the layout
        position: usize,
    },

    /// Layout string is empty or has no axis labels
    #[error("Layout \"{layout}\" has no axis labels")]
    EmptyLayout {
        /// The offending layout string
        layout: String,
    },

    /// Packing digits are missing, unpaired, unequal, or misplaced
    #[error("Malformed packing in layout \"{layout}\": {reason}")]
    MalformedPacking {
        /// The offending layout string
        layout: String,
        /// Why the packing annotation was rejected
        reason: String,
    },

    /// The `|` image-plane delimiter is repeated or does not precede an axis
    #[error("Malformed image split in layout \"{layout}\": {reason}")]
    MalformedImageSplit {
        /// The offending layout string
        layout: String,
        /// Why the delimiter was rejected
        reason: String,
    },

    /// The same axis label appears twice
    #[error("Axis '{axis}' appears more than once in layout \"{layout}\"")]
    DuplicateAxis {
        /// The offending layout string
        layout: String,
        /// The repeated label
        axis: char,
    },

    /// Both layouts carry an image-plane delimiter
    #[error("Image to image conversion is not supported: \"{from}\" -> \"{to}\"")]
    ImageToImage {
        /// Source layout
        from: String,
        /// Destination layout
        to: String,
    },

    /// Both layouts are packed but on different axes or with different widths
    #[error("Packed axes differ: \"{from}\" -> \"{to}\"")]
    PackedAxisMismatch {
        /// Source layout
        from: String,
        /// Destination layout
        to: String,
    },

    /// Axis label sets differ once packing annotations are stripped
    #[error("Axis labels differ: \"{from}\" -> \"{to}\"")]
    LabelMismatch {
        /// Source layout
        from: String,
        /// Destination layout
        to: String,
    },

    /// Shape rank does not match the layout rank
    #[error("Layout \"{layout}\" describes {expected} axes but shape has {got}")]
    RankMismatch {
        /// Layout the shape is interpreted against
        layout: String,
        /// Axis count of the layout
        expected: usize,
        /// Length of the shape argument
        got: usize,
    },

    /// Shape contains a zero extent, or its stored element count overflows `isize`
    #[error("Invalid shape {shape:?}: extents must be positive, element count must fit in isize")]
    InvalidShape {
        /// The rejected shape
        shape: Vec<usize>,
    },

    /// Source buffer length disagrees with the shape
    #[error("Buffer length mismatch: expected {expected} elements, got {got}")]
    BufferLength {
        /// Element count implied by layout and shape
        expected: usize,
        /// Length of the buffer passed in
        got: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Layout combination is valid but outside what a backend can express
    #[error("Unsupported {operation}: {reason}")]
    Unsupported {
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },
}

impl Error {
    /// Create a malformed packing error
    pub fn malformed_packing(layout: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPacking {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a malformed image split error
    pub fn malformed_image_split(layout: &str, reason: impl Into<String>) -> Self {
        Self::MalformedImageSplit {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a label mismatch error
    pub fn label_mismatch(from: &str, to: &str) -> Self {
        Self::LabelMismatch {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create an unsupported-combination error
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            reason: reason.into(),
        }
    }

    /// Which part of the error taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCharacter { .. }
            | Self::EmptyLayout { .. }
            | Self::MalformedPacking { .. }
            | Self::MalformedImageSplit { .. }
            | Self::DuplicateAxis { .. } => ErrorKind::MalformedLayout,
            Self::ImageToImage { .. }
            | Self::PackedAxisMismatch { .. }
            | Self::LabelMismatch { .. }
            | Self::UnsupportedDType { .. }
            | Self::Unsupported { .. } => ErrorKind::IncompatibleLayouts,
            Self::RankMismatch { .. } | Self::InvalidShape { .. } | Self::BufferLength { .. } => {
                ErrorKind::GeometryMismatch
            }
        }
    }

    /// Whether retrying with corrected layout strings can succeed
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::GeometryMismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = Error::InvalidCharacter {
            layout: "n#hw".into(),
            ch: '#',
            position: 1,
        };
        assert_eq!(err.kind(), ErrorKind::MalformedLayout);
        assert!(err.is_recoverable());

        assert_eq!(
            Error::label_mismatch("NCHW", "NCHD").kind(),
            ErrorKind::IncompatibleLayouts
        );

        let err = Error::RankMismatch {
            layout: "NCHW".into(),
            expected: 4,
            got: 3,
        };
        assert_eq!(err.kind(), ErrorKind::GeometryMismatch);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = Error::ImageToImage {
            from: "nh|c4w4".into(),
            to: "n|hc4w4".into(),
        };
        assert_eq!(
            err.to_string(),
            "Image to image conversion is not supported: \"nh|c4w4\" -> \"n|hc4w4\""
        );
    }
}
