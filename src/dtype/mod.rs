//! Data type system for relayout buffers
//!
//! `DType` is the runtime tag used by the kernel generator to pick OpenCL
//! types; `Element` connects it to the Rust types the CPU executor accepts.

mod element;

pub use element::Element;

use std::fmt;

/// Element types relayout can move around
///
/// # Discriminant Values (Serialization Stability)
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2)
/// - Signed ints: 10-19 (I64=10, I32=11)
/// - Unsigned ints: 20-29 (U32=21)
///
/// Existing values are never changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    #[default]
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
    /// 32-bit unsigned integer
    U32 = 21,
}

impl DType {
    /// Short lowercase name, also used as kernel name suffix
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::I64 => "i64",
            Self::I32 => "i32",
            Self::U32 => "u32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
