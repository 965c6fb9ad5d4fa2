//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Trait for types that can be stored in a relayout buffer
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - moved freely between threads when the
///   `rayon` feature parallelizes the gather
/// - `Pod + Zeroable` - padding lanes are filled with the all-zero bit pattern
pub trait Element: Copy + Send + Sync + Pod + Zeroable + Debug + PartialEq + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Value written into padding lanes
    #[inline]
    fn zero() -> Self {
        Self::zeroed()
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;
}

impl Element for u32 {
    const DTYPE: DType = DType::U32;
}

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;
}
