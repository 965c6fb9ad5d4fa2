//! OpenCL conversion entry points

use super::artifact::{KernelArtifact, KernelOptions};
use super::cache::{KernelCache, KernelKey};
use super::codegen::render;
use super::plan::KernelPlan;
use crate::error::Result;
use crate::layout::LayoutPair;
use crate::tensor::Shape;
use crate::transform::TransformContext;
use std::sync::Arc;

/// Generate the kernel for one conversion without caching
pub fn generate(
    from: &str,
    to: &str,
    shape: &[usize],
    options: &KernelOptions,
) -> Result<KernelArtifact> {
    let ctx = TransformContext::new(from, to, shape)?;
    generate_with(&ctx, options)
}

/// Generate the kernel for an already normalized conversion
pub fn generate_with(ctx: &TransformContext, options: &KernelOptions) -> Result<KernelArtifact> {
    let plan = KernelPlan::new(ctx, options.dtype)?;
    let source = render(&plan, options.indent)?;
    Ok(KernelArtifact {
        source,
        name: plan.name,
        width: plan.width,
        height: plan.height,
        input: plan.input,
        output: plan.output,
    })
}

/// Produces OpenCL kernels that convert device tensors between layouts
///
/// Nothing is compiled or launched here; the host program builds the returned
/// source and enqueues it with [`KernelArtifact::global_work_size`].
///
/// # Example
///
/// ```
/// use relayout::runtime::opencl::OpenClPermuter;
///
/// let permuter = OpenClPermuter::new();
/// let kernel = permuter.permute("nchw", "nh|c4w4", &[1, 9, 3, 3]);
/// assert_eq!(kernel.name, "CopyBufferNCHWToImageNHC4W4_f32");
/// assert_eq!(kernel.image_extent(), Some((9, 3)));
///
/// assert!(permuter.permute("nh|c4w4", "n|hc4w4", &[1, 9, 3, 3]).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct OpenClPermuter {
    options: KernelOptions,
    cache: KernelCache,
}

impl OpenClPermuter {
    /// Create a permuter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a permuter with the given options
    pub fn with_options(options: KernelOptions) -> Self {
        Self {
            options,
            cache: KernelCache::new(),
        }
    }

    /// Generation options
    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    /// Generated kernels so far
    pub fn cache(&self) -> &KernelCache {
        &self.cache
    }

    /// Generate, or fetch from the cache, the kernel converting `from` to `to`
    ///
    /// `shape` follows the same convention as the CPU executor.
    pub fn try_permute(
        &self,
        from: &str,
        to: &str,
        shape: &[usize],
    ) -> Result<Arc<KernelArtifact>> {
        let pair = LayoutPair::new(from, to)?;
        let key = KernelKey {
            from: pair.from().canonical().to_string(),
            to: pair.to().canonical().to_string(),
            shape: Shape::from(shape),
            options: self.options,
        };
        self.cache.get_or_create(key, || {
            let ctx = TransformContext::from_pair(pair, shape)?;
            generate_with(&ctx, &self.options)
        })
    }

    /// Like [`Self::try_permute`], but returns an empty artifact on failure
    pub fn permute(&self, from: &str, to: &str, shape: &[usize]) -> Arc<KernelArtifact> {
        self.try_permute(from, to, shape).unwrap_or_else(|err| {
            log::warn!("kernel generation for {from} -> {to} rejected: {err}");
            Arc::new(KernelArtifact::default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::error::Error;

    #[test]
    fn test_cache_is_case_insensitive() {
        let permuter = OpenClPermuter::new();
        let a = permuter.try_permute("nchw", "nc4hw4", &[1, 5, 2, 2]).unwrap();
        let b = permuter.try_permute("NCHW", "NC4HW4", &[1, 5, 2, 2]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        permuter.try_permute("nchw", "nc4hw4", &[1, 6, 2, 2]).unwrap();
        assert_eq!(permuter.cache().len(), 2);
    }

    #[test]
    fn test_empty_on_failure() {
        let permuter = OpenClPermuter::new();
        assert!(permuter.permute("nchw", "nchd", &[1, 5, 2, 2]).is_empty());
        assert!(permuter.permute("nc#w", "nchw", &[1, 5, 2, 2]).is_empty());
        assert!(permuter.cache().is_empty());
        assert!(matches!(
            permuter.try_permute("nh|c4w4", "n|hc4w4", &[1, 5, 2, 2]),
            Err(Error::ImageToImage { .. })
        ));
    }

    #[test]
    fn test_options_flow_through() {
        let options = KernelOptions::default().with_dtype(DType::U32).with_indent(2);
        let artifact = generate("hw", "wh", &[2, 3], &options).unwrap();
        assert_eq!(artifact.name, "CopyBufferHWToBufferWH_u32");
        assert!(artifact.source.contains("\n  const int x = get_global_id(0);"));
        assert_eq!(artifact.global_work_size(), [2, 3]);
        assert_eq!(artifact.image_extent(), None);
    }
}
