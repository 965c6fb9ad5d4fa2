//! Layout strings
//!
//! A layout names tensor axes major-to-minor (`"nchw"`), optionally packs one
//! axis into fixed-width vectors (`"nc4hw4"`), and optionally marks where the
//! axes split between the height and width of an image surface
//! (`"nh|c4w4"`). Strings are parsed once into [`LayoutDesc`] and checked
//! pairwise by [`LayoutPair`].

mod descriptor;
mod pair;

pub use descriptor::{Axis, IMAGE_DELIMITER, LayoutDesc, Packing};
pub use pair::{LayoutPair, PackMode};
