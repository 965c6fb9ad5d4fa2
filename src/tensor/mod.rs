//! Shape and stride utilities
//!
//! Pure functions over extent vectors: element counts, row-major strides,
//! and the mixed-radix index decomposition shared by every conversion.

mod shape;
mod strides;

pub use shape::Shape;
pub use strides::{Strides, ceil_div, checked_elem_count, elem_count, unravel_index_into};
