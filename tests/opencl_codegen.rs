//! Integration tests for OpenCL kernel generation
//!
//! Kernels are never compiled here; the tests check the emitted text and the
//! launch geometry reported alongside it.

use relayout::dtype::DType;
use relayout::error::Error;
use relayout::runtime::opencl::{KernelOptions, MemoryKind, OpenClPermuter, generate};

#[test]
fn test_buffer_to_image_guard_uses_image_extent() {
    let permuter = OpenClPermuter::new();
    let kernel = permuter.permute("nchw", "nh|c4w4", &[2, 9, 3, 3]);
    assert!(!kernel.is_empty());
    assert_eq!(kernel.name, "CopyBufferNCHWToImageNHC4W4_f32");
    assert_eq!(kernel.input, MemoryKind::Buffer);
    assert_eq!(kernel.output, MemoryKind::Image);

    // width: 3 channel groups * W, height: N * H
    assert_eq!(kernel.image_extent(), Some((9, 6)));
    assert!(kernel.source.contains("if (x >= 9 || y >= 6) {"));
    assert!(kernel.source.contains("get_global_id(0)"));
    assert!(kernel.source.contains("get_global_id(1)"));
}

#[test]
fn test_image_to_buffer_reads_image() {
    let kernel = OpenClPermuter::new().permute("n|hc4w4", "nchw", &[1, 6, 2, 2]);
    assert_eq!(kernel.name, "CopyImageNHC4W4ToBufferNCHW_f32");
    assert_eq!(kernel.image_extent(), Some((8, 1)));
    assert!(kernel.source.contains("read_imagef(input, SAMPLER, (int2)(x, y))"));
    assert!(kernel.source.contains("RELAYOUT_SCATTER_VEC4"));
}

#[test]
fn test_image_to_image_is_empty() {
    let permuter = OpenClPermuter::new();
    let kernel = permuter.permute("nh|c4w4", "n|hc4w4", &[1, 6, 2, 2]);
    assert!(kernel.is_empty());
    assert!(kernel.name.is_empty());
    assert!(matches!(
        permuter.try_permute("nh|c4w4", "n|hc4w4", &[1, 6, 2, 2]),
        Err(Error::ImageToImage { .. })
    ));
}

#[test]
fn test_rejected_inputs_are_empty() {
    let permuter = OpenClPermuter::new();
    for (from, to) in [
        ("nchw", "nchd"),
        ("nc?w", "nchw"),
        ("nchw", "nc4hw"),
        ("n|h|cw", "nhcw"),
        // image pixels are four lanes wide
        ("nchw", "nh|c2w2"),
    ] {
        assert!(permuter.permute(from, to, &[1, 6, 2, 2]).is_empty(), "{from} -> {to}");
    }
}

#[test]
fn test_overflowing_shape_is_empty() {
    let half = 1usize << (usize::BITS / 2);
    let permuter = OpenClPermuter::new();
    assert!(permuter.permute("nchw", "nh|c4w4", &[half, half, 1, 1]).is_empty());
    assert!(matches!(
        permuter.try_permute("nchw", "nhwc", &[half, half, 1, 1]),
        Err(Error::InvalidShape { .. })
    ));
    assert!(permuter.cache().is_empty());
}

#[test]
fn test_buffer_kernels_cover_every_mode() {
    let permuter = OpenClPermuter::new();
    let shape = [1, 6, 2, 2];
    for (from, to) in [
        ("nchw", "nhwc"),
        ("nchw", "nc4hw4"),
        ("nc4hw4", "nchw"),
        ("nc4hw4", "nhc4w4"),
    ] {
        let kernel = permuter.permute(from, to, &shape);
        assert!(!kernel.is_empty(), "{from} -> {to}");
        assert_eq!(kernel.image_extent(), None);
        assert!(kernel.source.contains("__global const float* input, __global float* output"));
    }
    assert_eq!(permuter.cache().len(), 4);
}

#[test]
fn test_half_kernels_enable_extension() {
    let options = KernelOptions::default().with_dtype(DType::F16);
    let permuter = OpenClPermuter::with_options(options);
    assert_eq!(permuter.options().dtype, DType::F16);
    let kernel = permuter.try_permute("nchw", "nh|c4w4", &[1, 5, 2, 2]).unwrap();
    assert!(kernel.source.contains("#pragma OPENCL EXTENSION cl_khr_fp16 : enable"));
    assert!(kernel.source.contains("half4 v = (half4)(0);"));
    assert!(kernel.source.contains("write_imageh(output, (int2)(x, y), v);"));
    assert_eq!(kernel.name, "CopyBufferNCHWToImageNHC4W4_f16");
}

#[test]
fn test_unsupported_dtype() {
    let options = KernelOptions::default().with_dtype(DType::I64);
    assert!(matches!(
        generate("nchw", "nhwc", &[1, 5, 2, 2], &options),
        Err(Error::UnsupportedDType { dtype: DType::I64, .. })
    ));
}
