//! Generated kernel output and generation options

use super::MemoryKind;
use crate::dtype::DType;

/// Knobs for kernel text generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KernelOptions {
    /// Element type of both tensors
    pub dtype: DType,
    /// Spaces per indentation level in the kernel body
    pub indent: usize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            dtype: DType::F32,
            indent: 4,
        }
    }
}

impl KernelOptions {
    /// Set the element type
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// OpenCL C source for one conversion plus what the host needs to launch it
///
/// An empty artifact (see [`KernelArtifact::is_empty`]) signals a rejected
/// conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KernelArtifact {
    /// Complete program source
    pub source: String,
    /// Name of the `__kernel` function in `source`
    pub name: String,
    /// Global work size along `x`; the image width when an image is involved
    pub width: usize,
    /// Global work size along `y`; the image height when an image is involved
    pub height: usize,
    /// Memory kind of the kernel's input argument
    pub input: MemoryKind,
    /// Memory kind of the kernel's output argument
    pub output: MemoryKind,
}

impl KernelArtifact {
    /// Whether generation failed
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Global work size as `[x, y]`
    pub fn global_work_size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Image surface extent, if either side is an image
    pub fn image_extent(&self) -> Option<(usize, usize)> {
        let image = self.input == MemoryKind::Image || self.output == MemoryKind::Image;
        image.then_some((self.width, self.height))
    }
}
