//! OpenCL C type names per dtype

use crate::dtype::DType;
use crate::error::{Error, Result};

/// OpenCL scalar type for a buffer element
pub fn cl_type(dtype: DType) -> Result<&'static str> {
    match dtype {
        DType::F64 => Ok("double"),
        DType::F32 => Ok("float"),
        DType::F16 => Ok("half"),
        DType::I32 => Ok("int"),
        DType::U32 => Ok("uint"),
        _ => Err(Error::UnsupportedDType {
            dtype,
            op: "opencl_kernel",
        }),
    }
}

/// OpenCL 4-wide vector type, the element type of an image pixel
pub fn cl_vec4_type(dtype: DType) -> Result<&'static str> {
    match dtype {
        DType::F32 => Ok("float4"),
        DType::F16 => Ok("half4"),
        DType::I32 => Ok("int4"),
        DType::U32 => Ok("uint4"),
        _ => Err(Error::UnsupportedDType {
            dtype,
            op: "opencl_image",
        }),
    }
}

/// Image read and write builtins for a dtype
pub fn image_functions(dtype: DType) -> Result<(&'static str, &'static str)> {
    match dtype {
        DType::F32 => Ok(("read_imagef", "write_imagef")),
        DType::F16 => Ok(("read_imageh", "write_imageh")),
        DType::I32 => Ok(("read_imagei", "write_imagei")),
        DType::U32 => Ok(("read_imageui", "write_imageui")),
        _ => Err(Error::UnsupportedDType {
            dtype,
            op: "opencl_image",
        }),
    }
}

/// Extension pragma a dtype needs, empty when none
pub fn extension_pragma(dtype: DType) -> &'static str {
    match dtype {
        DType::F64 => "#pragma OPENCL EXTENSION cl_khr_fp64 : enable\n",
        DType::F16 => "#pragma OPENCL EXTENSION cl_khr_fp16 : enable\n",
        _ => "",
    }
}

/// Check if dtype can live in an image2d
pub fn is_image_supported(dtype: DType) -> bool {
    matches!(dtype, DType::F32 | DType::F16 | DType::I32 | DType::U32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_is_buffer_only() {
        assert_eq!(cl_type(DType::F64).unwrap(), "double");
        assert!(cl_vec4_type(DType::F64).is_err());
        assert!(!is_image_supported(DType::F64));
        assert!(extension_pragma(DType::F64).contains("cl_khr_fp64"));
    }

    #[test]
    fn test_i64_unsupported() {
        assert!(matches!(
            cl_type(DType::I64),
            Err(Error::UnsupportedDType { dtype: DType::I64, .. })
        ));
    }

    #[test]
    fn test_image_functions() {
        assert_eq!(image_functions(DType::U32).unwrap(), ("read_imageui", "write_imageui"));
        assert_eq!(extension_pragma(DType::F32), "");
    }
}
