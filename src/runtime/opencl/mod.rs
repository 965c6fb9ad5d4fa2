//! OpenCL kernel source generation
//!
//! Emits OpenCL C that performs a conversion on a device, instead of
//! performing it. The index arithmetic comes from the same
//! [`IndexMap`](crate::transform::IndexMap) the CPU backend evaluates, printed
//! as [`IndexExpr`] trees.
//!
//! # Memory kinds
//!
//! | Input  | Output | Work item covers                  |
//! |--------|--------|-----------------------------------|
//! | Buffer | Buffer | one destination element           |
//! | Buffer | Image  | one pixel (4 lanes of packed axis) |
//! | Image  | Buffer | one pixel (4 lanes of packed axis) |
//!
//! A layout is placed on an image when it contains `|`. Axes before the
//! delimiter form the image height, the rest (minus the lane axis) its width.
//! Image to image conversion is rejected.
//!
//! # Supported DTypes
//!
//! | DType | Buffer   | Image pixel | Notes                   |
//! |-------|----------|-------------|-------------------------|
//! | F32   | `float`  | `float4`    |                         |
//! | F16   | `half`   | `half4`     | requires `cl_khr_fp16`  |
//! | I32   | `int`    | `int4`      |                         |
//! | U32   | `uint`   | `uint4`     |                         |
//! | F64   | `double` | -           | requires `cl_khr_fp64`  |

mod artifact;
mod cache;
mod codegen;
mod expr;
mod permuter;
mod plan;
pub mod types;

pub use artifact::{KernelArtifact, KernelOptions};
pub use cache::{DEFAULT_MAX_ENTRIES, KernelCache, KernelKey};
pub use codegen::render;
pub use expr::{BinOp, IndexExpr};
pub use permuter::{OpenClPermuter, generate, generate_with};
pub use plan::{Access, CoordDecl, Guard, IMAGE_VECTOR_WIDTH, KernelPlan};

use std::fmt;

/// Where a kernel argument lives on the device
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Linear `__global` buffer
    #[default]
    Buffer,
    /// `image2d_t` surface of 4-lane pixels
    Image,
}

impl MemoryKind {
    /// Name used in generated kernel names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buffer => "Buffer",
            Self::Image => "Image",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
