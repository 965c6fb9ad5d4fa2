//! # relayout
//!
//! **Tensor memory layout conversion for inference runtimes.**
//!
//! relayout moves dense tensors between axis orders (`NCHW` to `NHWC`) and
//! between unpacked and channel-packed forms (`NCHW` to `NC4HW4`), either by
//! copying host buffers or by emitting OpenCL kernels that do the same copy on
//! a device.
//!
//! ## Layout strings
//!
//! - Letters name axes, major to minor, case-insensitive: `"nchw"`
//! - A digit after a letter packs that axis into vectors of that width, and
//!   the same digit closes the string: `"nc4hw4"`
//! - `|` splits the axes between the height and width of an image surface,
//!   for kernel generation: `"nh|c4w4"`
//!
//! ## Quick Start
//!
//! ```rust
//! use relayout::prelude::*;
//!
//! // CO=2, CI=9, H=3, W=3
//! let src: Vec<f32> = (0..162).map(|v| v as f32).collect();
//! let packed = permute("nchw", "nc4hw4", &[2, 9, 3, 3], &src)?;
//! assert_eq!(packed.len(), 2 * 12 * 3 * 3);
//!
//! let kernel = OpenClPermuter::new().try_permute("nchw", "nh|c4w4", &[2, 9, 3, 3])?;
//! assert!(kernel.source.contains("__kernel void CopyBufferNCHWToImageNHC4W4_f32"));
//! # Ok::<(), relayout::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded forward conversions on the CPU
//! - `f16`: `half::f16` buffers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod layout;
pub mod runtime;
pub mod tensor;
pub mod transform;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::layout::{LayoutDesc, LayoutPair, PackMode};
    pub use crate::runtime::cpu::{CpuPermuter, permute};
    pub use crate::runtime::opencl::{KernelArtifact, KernelOptions, MemoryKind, OpenClPermuter};
    pub use crate::transform::{Direction, TransformContext};
}
