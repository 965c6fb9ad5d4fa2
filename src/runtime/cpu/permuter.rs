//! CPU conversion entry points

use super::kernels;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::layout::LayoutPair;
use crate::transform::{Direction, TransformContext};
use std::borrow::Cow;

/// Converts host buffers between layouts
///
/// # Example
///
/// ```
/// use relayout::runtime::cpu::CpuPermuter;
///
/// let src: Vec<f32> = (0..6).map(|v| v as f32).collect();
/// let out = CpuPermuter::new().permute("hw", "wh", &[2, 3], &src).unwrap();
/// assert_eq!(&*out, &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
/// ```
#[derive(Clone, Debug)]
pub struct CpuPermuter {
    min_parallel_len: usize,
}

impl Default for CpuPermuter {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuPermuter {
    /// Default minimum number of destination elements per parallel task
    pub const DEFAULT_MIN_PARALLEL_LEN: usize = 4096;

    /// Create a permuter with default settings
    pub fn new() -> Self {
        Self {
            min_parallel_len: Self::DEFAULT_MIN_PARALLEL_LEN,
        }
    }

    /// Set the minimum chunk length handed to each rayon task
    ///
    /// Buffers no longer than this are converted on the calling thread.
    /// Without the `rayon` feature the value is ignored.
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len.max(1);
        self
    }

    /// Minimum chunk length per rayon task
    pub fn min_parallel_len(&self) -> usize {
        self.min_parallel_len
    }

    /// Convert `src` from layout `from` to layout `to`
    ///
    /// `shape` holds the logical extents in the label order of the unpacked
    /// side (the source when both sides are unpacked or both packed). `src`
    /// must hold exactly as many elements as `from` stores for that shape,
    /// counting padding lanes if `from` is packed.
    ///
    /// Returns the input unchanged when both layouts describe the same
    /// arrangement, otherwise a fresh buffer. Padding produced by packing reads
    /// as zero; padding consumed by unpacking is dropped.
    pub fn permute<'a, T: Element>(
        &self,
        from: &str,
        to: &str,
        shape: &[usize],
        src: &'a [T],
    ) -> Result<Cow<'a, [T]>> {
        let pair = LayoutPair::new(from, to)?;

        if pair.is_identity() {
            let expected = pair.from().physical_shape(shape)?.elem_count();
            check_len(expected, src.len())?;
            log::trace!("relayout {} -> {}: identity, returning input", pair.from(), pair.to());
            return Ok(Cow::Borrowed(src));
        }

        let ctx = TransformContext::from_pair(pair, shape)?;
        self.permute_with(&ctx, src).map(Cow::Owned)
    }

    /// Run an already normalized conversion, always allocating the output
    pub fn permute_with<T: Element>(&self, ctx: &TransformContext, src: &[T]) -> Result<Vec<T>> {
        check_len(ctx.input_len(), src.len())?;

        let map = ctx.index_map();
        let mut out = vec![T::zero(); ctx.output_len()];
        match ctx.direction() {
            Direction::Forward => kernels::gather(&map, src, &mut out, self.min_parallel_len),
            Direction::Reversed => kernels::scatter(&map, src, &mut out),
        }
        Ok(out)
    }
}

/// Convert `src` with a default [`CpuPermuter`]
pub fn permute<'a, T: Element>(
    from: &str,
    to: &str,
    shape: &[usize],
    src: &'a [T],
) -> Result<Cow<'a, [T]>> {
    CpuPermuter::new().permute(from, to, shape, src)
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::BufferLength { expected, got });
    }
    Ok(())
}
