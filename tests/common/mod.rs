//! Common test utilities
#![allow(dead_code)]

/// `[0, 1, 2, ...]` as f32, so every element records its own source offset
pub fn iota(len: usize) -> Vec<f32> {
    (0..len).map(|v| v as f32).collect()
}

/// Row-major offset of `(n, c, h, w)` in an NCHW buffer of `shape`
pub fn nchw_offset(shape: [usize; 4], n: usize, c: usize, h: usize, w: usize) -> usize {
    let [_, cs, hs, ws] = shape;
    ((n * cs + c) * hs + h) * ws + w
}

/// Row-major offset of `(n, c, h, w)` in an NC4HW4 buffer for logical NCHW `shape`
pub fn nc4hw4_offset(shape: [usize; 4], n: usize, c: usize, h: usize, w: usize) -> usize {
    let [_, cs, hs, ws] = shape;
    let groups = cs.div_ceil(4);
    (((n * groups + c / 4) * hs + h) * ws + w) * 4 + c % 4
}

/// Row-major offset of `(n, c, h, w)` in an NHWC buffer for logical NCHW `shape`
pub fn nhwc_offset(shape: [usize; 4], n: usize, c: usize, h: usize, w: usize) -> usize {
    let [_, cs, hs, ws] = shape;
    ((n * hs + h) * ws + w) * cs + c
}

/// Visit every `(n, c, h, w)` of a logical NCHW `shape`
pub fn for_each_nchw(shape: [usize; 4], mut f: impl FnMut(usize, usize, usize, usize)) {
    let [ns, cs, hs, ws] = shape;
    for n in 0..ns {
        for c in 0..cs {
            for h in 0..hs {
                for w in 0..ws {
                    f(n, c, h, w);
                }
            }
        }
    }
}
