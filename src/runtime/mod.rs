//! Conversion backends
//!
//! Both backends consume the same [`TransformContext`](crate::transform::TransformContext)
//! and [`IndexMap`](crate::transform::IndexMap):
//!
//! ```text
//! layout strings + shape
//! └── TransformContext (validated, normalized, permutation)
//!     └── IndexMap (destination coordinate -> source offset)
//!         ├── cpu::CpuPermuter     evaluates it over host buffers
//!         └── opencl::KernelPlan   prints it as OpenCL C
//! ```

pub mod cpu;
pub mod opencl;
