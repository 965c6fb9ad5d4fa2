//! CPU backend
//!
//! Materializes conversions on host memory. The forward direction gathers
//! one destination element per index and is parallelized with rayon when the
//! `rayon` feature is enabled; the reversed direction scatters packed elements
//! back to their unpacked offsets.

mod kernels;
mod permuter;

pub use permuter::{CpuPermuter, permute};
