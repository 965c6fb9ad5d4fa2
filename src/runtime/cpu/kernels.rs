//! Copy loops over a precomputed [`IndexMap`]

use crate::dtype::Element;
use crate::transform::IndexMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Walk the destination index space and read each source element
///
/// `out[d] = src[offset(d)]`, or zero where `d` is padding. Every destination
/// index is independent, so with the `rayon` feature the loop is split into
/// chunks of at least `min_len` indices.
pub(crate) fn gather<T: Element>(map: &IndexMap, src: &[T], out: &mut [T], min_len: usize) {
    #[cfg(feature = "rayon")]
    if out.len() > min_len {
        gather_parallel(map, src, out, min_len);
        return;
    }

    #[cfg(not(feature = "rayon"))]
    let _ = min_len;

    let mut scratch = vec![0usize; map.dest_shape().len()];
    for (d, slot) in out.iter_mut().enumerate() {
        *slot = map
            .source_offset_linear(d, &mut scratch)
            .map_or_else(T::zero, |s| src[s]);
    }
}

#[cfg(feature = "rayon")]
fn gather_parallel<T: Element>(map: &IndexMap, src: &[T], out: &mut [T], min_len: usize) {
    let rank = map.dest_shape().len();
    out.par_iter_mut()
        .enumerate()
        .with_min_len(min_len)
        .for_each_init(
            || vec![0usize; rank],
            |scratch, (d, slot)| {
                *slot = map
                    .source_offset_linear(d, scratch)
                    .map_or_else(T::zero, |s| src[s]);
            },
        );
}

/// Walk the packed index space and write each element back to its unpacked offset
///
/// `out[offset(d)] = src[d]` for every non-padding `d`. Padding lanes of
/// `src` are never written.
pub(crate) fn scatter<T: Element>(map: &IndexMap, src: &[T], out: &mut [T]) {
    let mut scratch = vec![0usize; map.dest_shape().len()];
    for (d, &value) in src.iter().enumerate() {
        if let Some(s) = map.source_offset_linear(d, &mut scratch) {
            out[s] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformContext;

    #[test]
    fn test_gather_transposes() {
        let ctx = TransformContext::new("hw", "wh", &[2, 3]).unwrap();
        let src = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        let mut out = [0.0f32; 6];
        gather(&ctx.index_map(), &src, &mut out, 1);
        assert_eq!(out, [0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_gather_zero_fills_padding() {
        let ctx = TransformContext::new("c", "c44", &[3]).unwrap();
        let mut out = [7i32; 4];
        gather(&ctx.index_map(), &[1, 2, 3], &mut out, 1);
        assert_eq!(out, [1, 2, 3, 0]);
    }

    #[test]
    fn test_scatter_skips_padding() {
        let ctx = TransformContext::new("c44", "c", &[3]).unwrap();
        let mut out = [0u32; 3];
        scatter(&ctx.index_map(), &[1, 2, 3, 99], &mut out);
        assert_eq!(out, [1, 2, 3]);
    }
}
