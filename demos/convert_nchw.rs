//! Convert a small NCHW weight tensor to the channel-packed image layout and back
//!
//! Run with: `cargo run --example convert_nchw`

use relayout::error::Result;
use relayout::runtime::cpu::permute;
use relayout::runtime::opencl::OpenClPermuter;

fn main() -> Result<()> {
    // CO=2, CI=9, H=3, W=3
    let shape = [2, 9, 3, 3];
    let src: Vec<f32> = (0..shape.iter().product::<usize>()).map(|v| v as f32).collect();

    let packed = permute("nchw", "nh|c4w4", &shape, &src)?;
    println!("packed {} elements into {} (9 channels -> 3 groups of 4)", src.len(), packed.len());
    for (i, pixel) in packed.chunks(4).take(4).enumerate() {
        println!("  pixel {i}: {pixel:?}");
    }

    let back = permute("nh|c4w4", "nchw", &shape, &packed)?;
    println!("round trip exact: {}", *back == *src);

    let kernel = OpenClPermuter::new().try_permute("nchw", "nh|c4w4", &shape)?;
    println!(
        "\n{} on a {}x{} image:\n{}",
        kernel.name, kernel.width, kernel.height, kernel.source
    );
    Ok(())
}
