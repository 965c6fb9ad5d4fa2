//! Parsed layout strings
//!
//! Grammar, after case folding:
//!
//! ```text
//! layout  := axis+ ( '|' axis+ )?        // at most one delimiter
//! axis    := LETTER DIGIT?                // at most one packed axis
//! trailer := DIGIT                        // repeats the packing digit, last char
//! ```
//!
//! `nc4hw4` reads as: axes N, C, H, W with C packed by 4, and the trailing `4`
//! is the generated lane sub-axis. `nh|c4w4` additionally splits the axes into
//! an image height group (N, H) and width group (C, W).

use crate::error::{Error, Result};
use crate::tensor::{Shape, ceil_div, checked_elem_count};
use std::fmt;

/// Image-plane delimiter
pub const IMAGE_DELIMITER: char = '|';

/// One axis of a parsed layout
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// A named tensor axis, stored upper case
    Label(char),
    /// The vector lanes of the packed axis
    Lane,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(c) => write!(f, "{c}"),
            Self::Lane => f.write_str("lane"),
        }
    }
}

/// Packing annotation: which labeled axis is split into vectors, and how wide
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Packing {
    /// Index of the packed axis among the labeled axes
    pub axis: usize,
    /// Vector width
    pub factor: usize,
}

/// A validated layout string
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutDesc {
    /// Upper-cased input, delimiter preserved
    canonical: String,
    /// Labeled axes in major-to-minor order, then [`Axis::Lane`] if packed
    axes: Vec<Axis>,
    packing: Option<Packing>,
    /// Index of the first width-group axis
    image_split: Option<usize>,
}

impl LayoutDesc {
    /// Parse and validate a layout string
    ///
    /// # Example
    /// ```
    /// use relayout::layout::{Axis, LayoutDesc};
    /// let desc = LayoutDesc::parse("nh|c4w4").unwrap();
    /// assert_eq!(desc.logical_rank(), 4);
    /// assert_eq!(desc.axes().last(), Some(&Axis::Lane));
    /// assert_eq!(desc.image_split(), Some(2));
    /// ```
    pub fn parse(layout: &str) -> Result<Self> {
        let mut axes: Vec<Axis> = Vec::with_capacity(layout.len());
        let mut packing: Option<Packing> = None;
        let mut image_split: Option<usize> = None;
        let mut lane_seen = false;
        let chars: Vec<char> = layout.chars().collect();

        for (position, &ch) in chars.iter().enumerate() {
            if lane_seen {
                return Err(Error::malformed_packing(
                    layout,
                    "the repeated packing digit must be the last character",
                ));
            }

            if ch.is_ascii_alphabetic() {
                let axis = Axis::Label(ch.to_ascii_uppercase());
                if axes.contains(&axis) {
                    return Err(Error::DuplicateAxis {
                        layout: layout.to_string(),
                        axis: ch.to_ascii_uppercase(),
                    });
                }
                axes.push(axis);
            } else if let Some(factor) = ch.to_digit(10) {
                let factor = factor as usize;
                match packing {
                    None => {
                        let follows_label =
                            position > 0 && chars[position - 1].is_ascii_alphabetic();
                        if !follows_label {
                            return Err(Error::malformed_packing(
                                layout,
                                format!(
                                    "digit at position {position} does not follow an axis label"
                                ),
                            ));
                        }
                        if factor == 0 {
                            return Err(Error::malformed_packing(
                                layout,
                                "packing factor must be positive",
                            ));
                        }
                        packing = Some(Packing {
                            axis: axes.len() - 1,
                            factor,
                        });
                    }
                    Some(p) if p.factor == factor => {
                        if position + 1 != chars.len() {
                            return Err(Error::malformed_packing(
                                layout,
                                "the repeated packing digit must be the last character",
                            ));
                        }
                        lane_seen = true;
                    }
                    Some(p) => {
                        return Err(Error::malformed_packing(
                            layout,
                            format!("packing digits {} and {factor} differ", p.factor),
                        ));
                    }
                }
            } else if ch == IMAGE_DELIMITER {
                if image_split.is_some() {
                    return Err(Error::malformed_image_split(layout, "more than one delimiter"));
                }
                let next_is_label = chars
                    .get(position + 1)
                    .is_some_and(|c| c.is_ascii_alphabetic());
                if !next_is_label {
                    return Err(Error::malformed_image_split(
                        layout,
                        "delimiter must be followed by an axis label",
                    ));
                }
                image_split = Some(axes.len());
            } else {
                return Err(Error::InvalidCharacter {
                    layout: layout.to_string(),
                    ch,
                    position,
                });
            }
        }

        if axes.is_empty() {
            return Err(Error::EmptyLayout {
                layout: layout.to_string(),
            });
        }
        if packing.is_some() && !lane_seen {
            return Err(Error::malformed_packing(
                layout,
                "packing digit must appear twice, once after the axis and once at the end",
            ));
        }
        if lane_seen {
            axes.push(Axis::Lane);
        }

        Ok(Self {
            canonical: layout.to_ascii_uppercase(),
            axes,
            packing,
            image_split,
        })
    }

    /// Upper-cased layout text
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Upper-cased layout text without the image delimiter, safe for identifiers
    pub fn ident(&self) -> String {
        self.canonical.chars().filter(|&c| c != IMAGE_DELIMITER).collect()
    }

    /// All axes, including the trailing lane axis of a packed layout
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Labeled axes only
    pub fn labels(&self) -> &[Axis] {
        match self.packing {
            Some(_) => &self.axes[..self.axes.len() - 1],
            None => &self.axes,
        }
    }

    /// Number of labeled axes (the rank of the logical tensor)
    pub fn logical_rank(&self) -> usize {
        self.labels().len()
    }

    /// Packing annotation, if any
    pub fn packing(&self) -> Option<Packing> {
        self.packing
    }

    /// Whether this layout packs one of its axes
    pub fn is_packed(&self) -> bool {
        self.packing.is_some()
    }

    /// Label of the packed axis
    pub fn packed_axis(&self) -> Option<Axis> {
        self.packing.map(|p| self.axes[p.axis])
    }

    /// Index of the first axis in the image width group
    pub fn image_split(&self) -> Option<usize> {
        self.image_split
    }

    /// Whether this layout places its tensor on an image surface
    pub fn is_image(&self) -> bool {
        self.image_split.is_some()
    }

    /// Same axes and packing, ignoring image placement
    pub fn same_arrangement(&self, other: &Self) -> bool {
        self.axes == other.axes && self.packing == other.packing
    }

    /// Physical extents of a buffer in this layout for a logical `shape`
    ///
    /// `shape` lists extents in this layout's label order. A packed axis is
    /// rounded up to whole vectors and the lane extent is appended.
    pub fn physical_shape(&self, shape: &[usize]) -> Result<Shape> {
        self.check_shape(shape)?;
        let mut physical = Shape::from(shape);
        if let Some(p) = self.packing {
            physical[p.axis] = ceil_div(physical[p.axis], p.factor);
            physical.push(p.factor);
        }
        Ok(physical)
    }

    /// Validate a logical shape against this layout
    ///
    /// Rejects a rank mismatch or a zero extent. The stored element count,
    /// padding included, must fit in `isize`.
    pub fn check_shape(&self, shape: &[usize]) -> Result<()> {
        if shape.len() != self.logical_rank() {
            return Err(Error::RankMismatch {
                layout: self.canonical.clone(),
                expected: self.logical_rank(),
                got: shape.len(),
            });
        }
        if shape.contains(&0) {
            return Err(Error::InvalidShape {
                shape: shape.to_vec(),
            });
        }

        let stored = shape.iter().enumerate().map(|(axis, &extent)| match self.packing {
            Some(p) if p.axis == axis => ceil_div(extent, p.factor),
            _ => extent,
        });
        let lanes = self.packing.map(|p| p.factor);
        if checked_elem_count(stored.chain(lanes)).is_none() {
            return Err(Error::InvalidShape {
                shape: shape.to_vec(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for LayoutDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
