//! OpenCL C text for a [`KernelPlan`]

use super::MemoryKind;
use super::plan::{Access, KernelPlan};
use super::types::{cl_type, cl_vec4_type, extension_pragma, image_functions};
use crate::error::Result;
use crate::transform::Direction;

/// Image sampler for unnormalized, unfiltered reads
const SAMPLER: &str = "__constant sampler_t SAMPLER = \
    CLK_NORMALIZED_COORDS_FALSE | CLK_ADDRESS_CLAMP | CLK_FILTER_NEAREST;\n";

/// Load up to four strided elements into a vector, leaving the rest untouched
const GATHER_VEC4: &str = r#"#ifndef RELAYOUT_GATHER_VEC4
#define RELAYOUT_GATHER_VEC4(v, src, base, stride, remain) \
    do {                                                   \
        const int r_ = (remain);                           \
        if (r_ > 0) (v).s0 = (src)[(base)];                \
        if (r_ > 1) (v).s1 = (src)[(base) + (stride)];     \
        if (r_ > 2) (v).s2 = (src)[(base) + 2 * (stride)]; \
        if (r_ > 3) (v).s3 = (src)[(base) + 3 * (stride)]; \
    } while (0)
#endif
"#;

/// Store up to four vector lanes to strided elements, dropping the rest
const SCATTER_VEC4: &str = r#"#ifndef RELAYOUT_SCATTER_VEC4
#define RELAYOUT_SCATTER_VEC4(dst, base, stride, remain, v) \
    do {                                                    \
        const int r_ = (remain);                            \
        if (r_ > 0) (dst)[(base)] = (v).s0;                 \
        if (r_ > 1) (dst)[(base) + (stride)] = (v).s1;      \
        if (r_ > 2) (dst)[(base) + 2 * (stride)] = (v).s2;  \
        if (r_ > 3) (dst)[(base) + 3 * (stride)] = (v).s3;  \
    } while (0)
#endif
"#;

/// Print the complete program for `plan`
pub fn render(plan: &KernelPlan, indent: usize) -> Result<String> {
    let t = cl_type(plan.dtype)?;
    let pad = " ".repeat(indent);
    let pad2 = pad.repeat(2);

    let mut preamble = String::from(extension_pragma(plan.dtype));
    let mut body: Vec<String> = Vec::new();

    let input_arg = match plan.input {
        MemoryKind::Buffer => format!("__global const {t}* input"),
        MemoryKind::Image => "__read_only image2d_t input".to_string(),
    };
    let output_arg = match plan.output {
        MemoryKind::Buffer => format!("__global {t}* output"),
        MemoryKind::Image => "__write_only image2d_t output".to_string(),
    };

    body.push(format!("{pad}const int x = get_global_id(0);"));
    body.push(format!("{pad}const int y = get_global_id(1);"));
    body.push(format!(
        "{pad}if (x >= {} || y >= {}) {{\n{pad2}return;\n{pad}}}",
        plan.width, plan.height
    ));
    for decl in &plan.coords {
        body.push(format!("{pad}const int {} = {};", decl.name, decl.value));
    }

    match &plan.access {
        Access::Linear { index, offset, guard } => {
            body.push(format!("{pad}const int index = {index};"));
            body.push(format!("{pad}const int offset = {offset};"));
            match (plan.direction, guard) {
                (Direction::Forward, Some(guard)) => body.push(format!(
                    "{pad}output[index] = {} < {} ? input[offset] : ({t})0;",
                    guard.value, guard.bound
                )),
                (Direction::Forward, None) => {
                    body.push(format!("{pad}output[index] = input[offset];"))
                }
                (Direction::Reversed, Some(guard)) => body.push(format!(
                    "{pad}if ({} < {}) {{\n{pad2}output[offset] = input[index];\n{pad}}}",
                    guard.value, guard.bound
                )),
                (Direction::Reversed, None) => {
                    body.push(format!("{pad}output[offset] = input[index];"))
                }
            }
        }
        Access::Vector { base, stride, remain } => {
            let v = cl_vec4_type(plan.dtype)?;
            let (read, write) = image_functions(plan.dtype)?;
            body.push(format!("{pad}const int base = {base};"));
            match plan.direction {
                Direction::Forward => {
                    preamble.push_str(GATHER_VEC4);
                    body.push(format!("{pad}{v} v = ({v})(0);"));
                    body.push(format!(
                        "{pad}RELAYOUT_GATHER_VEC4(v, input, base, {stride}, {remain});"
                    ));
                    body.push(format!("{pad}{write}(output, (int2)(x, y), v);"));
                }
                Direction::Reversed => {
                    preamble.push_str(SAMPLER);
                    preamble.push_str(SCATTER_VEC4);
                    body.push(format!("{pad}const {v} v = {read}(input, SAMPLER, (int2)(x, y));"));
                    body.push(format!(
                        "{pad}RELAYOUT_SCATTER_VEC4(output, base, {stride}, {remain}, v);"
                    ));
                }
            }
        }
    }

    Ok(format!(
        r#"// Auto-generated layout conversion for {t}
{preamble}
__kernel void {name}({input_arg}, {output_arg}) {{
{body}
}}
"#,
        name = plan.name,
        body = body.join("\n")
    ))
}
