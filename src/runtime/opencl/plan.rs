//! Typed description of a conversion kernel, before it becomes text

use super::MemoryKind;
use super::expr::IndexExpr;
use super::types::{cl_type, is_image_supported};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::layout::{Axis, PackMode};
use crate::transform::{Coord, Direction, ImageSide, IndexMap, SourceTerm, TransformContext};
use std::ops::Range;

/// Image pixels always hold this many lanes
pub const IMAGE_VECTOR_WIDTH: usize = 4;

/// `const int name = value;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordDecl {
    /// Kernel variable name
    pub name: String,
    /// Value in terms of `x`, `y` and earlier declarations
    pub value: IndexExpr,
}

/// Bounds check on a folded source coordinate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    /// Folded coordinate
    pub value: IndexExpr,
    /// True extent; the element is padding when `value >= bound`
    pub bound: usize,
}

/// How a work item moves its data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// One element per work item between two buffers
    Linear {
        /// Linear index into the internal destination buffer
        index: IndexExpr,
        /// Linear offset into the internal source buffer
        offset: IndexExpr,
        /// Present when the conversion packs an axis
        guard: Option<Guard>,
    },
    /// One pixel per work item, the lanes strided through the buffer side
    Vector {
        /// Buffer offset of lane 0
        base: IndexExpr,
        /// Buffer distance between lanes
        stride: usize,
        /// Number of lanes still inside the true extent
        remain: IndexExpr,
    },
}

/// Everything needed to print one kernel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelPlan {
    /// Kernel function name
    pub name: String,
    /// Element type
    pub dtype: DType,
    /// Memory kind of the caller's source
    pub input: MemoryKind,
    /// Memory kind of the caller's destination
    pub output: MemoryKind,
    /// Internal orientation
    pub direction: Direction,
    /// Global work size along `x`
    pub width: usize,
    /// Global work size along `y`
    pub height: usize,
    /// Per-axis coordinates, in declaration order
    pub coords: Vec<CoordDecl>,
    /// Data movement
    pub access: Access,
}

impl KernelPlan {
    /// Plan the kernel for a normalized conversion
    ///
    /// Buffer-to-buffer kernels cover any conversion. A kernel with an image
    /// side needs that side to be the packed one, packed by 4, and the other
    /// side unpacked.
    pub fn new(ctx: &TransformContext, dtype: DType) -> Result<Self> {
        cl_type(dtype)?;
        let pair = ctx.pair();
        let input = memory_kind(pair.from().is_image());
        let output = memory_kind(pair.to().is_image());
        if input == MemoryKind::Image && output == MemoryKind::Image {
            return Err(Error::ImageToImage {
                from: pair.from().canonical().to_string(),
                to: pair.to().canonical().to_string(),
            });
        }

        let name = format!(
            "Copy{}{}To{}{}_{}",
            input.as_str(),
            pair.from().ident(),
            output.as_str(),
            pair.to().ident(),
            dtype.short_name()
        );

        let map = ctx.index_map();
        let (width, height, coords, access) = match ctx.image() {
            None => plan_linear(ctx, &map),
            Some(image) => {
                if !is_image_supported(dtype) {
                    return Err(Error::UnsupportedDType {
                        dtype,
                        op: "opencl_image",
                    });
                }
                check_image(ctx, image.side)?;
                plan_vector(ctx, &map, image.split)?
            }
        };

        Ok(Self {
            name,
            dtype,
            input,
            output,
            direction: ctx.direction(),
            width,
            height,
            coords,
            access,
        })
    }
}

type Planned = (usize, usize, Vec<CoordDecl>, Access);

fn memory_kind(image: bool) -> MemoryKind {
    if image {
        MemoryKind::Image
    } else {
        MemoryKind::Buffer
    }
}

fn check_image(ctx: &TransformContext, side: ImageSide) -> Result<()> {
    let unsupported = |reason: &str| Error::unsupported("image kernel", reason);

    if ctx.pack_mode() == PackMode::BothPacked {
        return Err(unsupported("both layouts are packed; only one side may be an image"));
    }
    let on_packed_side = match side {
        ImageSide::Source => ctx.direction() == Direction::Reversed,
        ImageSide::Destination => ctx.pack_mode() == PackMode::DestPacked,
    };
    if !on_packed_side {
        return Err(unsupported("the image layout must be the packed one"));
    }
    match ctx.fold() {
        Some(fold) if fold.factor == IMAGE_VECTOR_WIDTH => Ok(()),
        Some(fold) => Err(unsupported(&format!(
            "image pixels hold {IMAGE_VECTOR_WIDTH} lanes, layout packs by {}",
            fold.factor
        ))),
        None => Err(unsupported("image layout has no packed axis")),
    }
}

/// Kernel variable for a destination axis
pub(crate) fn axis_var(axis: Axis) -> String {
    match axis {
        Axis::Label(c) => format!("i_{}", c.to_ascii_lowercase()),
        Axis::Lane => "i_lane".to_string(),
    }
}

/// Mixed-radix split of `linear` over destination axes `axes`, outermost first
///
/// The outermost digit skips its modulo because the bounds check already
/// keeps `linear` below the product of the extents.
fn decompose(ctx: &TransformContext, linear: &str, axes: Range<usize>) -> Vec<CoordDecl> {
    let shape = ctx.dest_shape();
    let mut inner = shape.product_of(axes.clone());
    axes.enumerate()
        .map(|(j, axis)| {
            inner /= shape[axis];
            let mut value = IndexExpr::var(linear) / IndexExpr::lit(inner);
            if j > 0 {
                value = value % IndexExpr::lit(shape[axis]);
            }
            CoordDecl {
                name: axis_var(ctx.dest_axes()[axis]),
                value,
            }
        })
        .collect()
}

fn dest_var(ctx: &TransformContext, axis: usize) -> IndexExpr {
    IndexExpr::var(axis_var(ctx.dest_axes()[axis]))
}

fn folded_var(ctx: &TransformContext, source_axis: usize) -> String {
    match ctx.source_layout().axes()[source_axis] {
        Axis::Label(c) => format!("s_{}", c.to_ascii_lowercase()),
        Axis::Lane => "s_lane".to_string(),
    }
}

fn plan_linear(ctx: &TransformContext, map: &IndexMap) -> Planned {
    let shape = ctx.dest_shape();
    let rank = shape.len();
    let width = shape[rank - 1];
    let height = shape.product_of(0..rank - 1);

    let mut coords = decompose(ctx, "y", 0..rank - 1);
    coords.extend(decompose(ctx, "x", rank - 1..rank));

    let mut guard = None;
    let mut addends = Vec::with_capacity(map.terms().len());
    for (axis, term) in map.terms().iter().enumerate() {
        let value = match term.coord {
            Coord::Axis(dest_axis) => dest_var(ctx, dest_axis),
            Coord::Folded {
                group,
                lane,
                factor,
                extent,
            } => {
                let name = folded_var(ctx, axis);
                coords.push(CoordDecl {
                    name: name.clone(),
                    value: dest_var(ctx, group) * IndexExpr::lit(factor) + dest_var(ctx, lane),
                });
                guard = Some(Guard {
                    value: IndexExpr::var(name.clone()),
                    bound: extent,
                });
                IndexExpr::var(name)
            }
        };
        addends.push(value * IndexExpr::lit(term.stride));
    }

    let access = Access::Linear {
        index: IndexExpr::var("y") * IndexExpr::lit(width) + IndexExpr::var("x"),
        offset: IndexExpr::sum(addends),
        guard,
    };
    (width, height, coords, access)
}

fn plan_vector(ctx: &TransformContext, map: &IndexMap, split: usize) -> Result<Planned> {
    let shape = ctx.dest_shape();
    let lane_axis = shape.len() - 1;
    let width = shape.product_of(split..lane_axis);
    let height = shape.product_of(0..split);

    let mut coords = decompose(ctx, "x", split..lane_axis);
    coords.extend(decompose(ctx, "y", 0..split));

    let folded = map
        .folded_term()
        .ok_or_else(|| Error::unsupported("image kernel", "image layout has no packed axis"))?;
    let (stride, remain) = match *folded {
        SourceTerm {
            coord: Coord::Folded { group, factor, extent, .. },
            stride,
        } => (
            stride,
            IndexExpr::lit(extent) - dest_var(ctx, group) * IndexExpr::lit(factor),
        ),
        SourceTerm { .. } => {
            return Err(Error::unsupported("image kernel", "packed axis is not folded"));
        }
    };

    // lane 0 of the pixel
    let base = IndexExpr::sum(map.terms().iter().map(|term| {
        let value = match term.coord {
            Coord::Axis(dest_axis) => dest_var(ctx, dest_axis),
            Coord::Folded { group, factor, .. } => dest_var(ctx, group) * IndexExpr::lit(factor),
        };
        value * IndexExpr::lit(term.stride)
    }));

    Ok((width, height, coords, Access::Vector { base, stride, remain }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Evaluate every declaration for one work item
    fn bind(plan: &KernelPlan, x: usize, y: usize) -> HashMap<String, i64> {
        let mut env = HashMap::new();
        env.insert("x".to_string(), x as i64);
        env.insert("y".to_string(), y as i64);
        for decl in &plan.coords {
            let value = decl.value.eval(&|name: &str| env.get(name).copied()).unwrap();
            env.insert(decl.name.clone(), value);
        }
        env
    }

    fn plan_for(from: &str, to: &str, shape: &[usize]) -> (TransformContext, KernelPlan) {
        let ctx = TransformContext::new(from, to, shape).unwrap();
        let plan = KernelPlan::new(&ctx, DType::F32).unwrap();
        (ctx, plan)
    }

    /// Check every work item of a linear plan against the index map and count
    /// how often each unpacked element is moved
    fn walk_linear(ctx: &TransformContext, plan: &KernelPlan) -> Vec<usize> {
        let map = ctx.index_map();
        let Access::Linear { index, offset, guard } = &plan.access else {
            panic!("expected a linear plan");
        };
        let mut scratch = vec![0; ctx.dest_shape().len()];
        let mut moved = vec![0usize; ctx.source_len()];
        for y in 0..plan.height {
            for x in 0..plan.width {
                let env = bind(plan, x, y);
                let lookup = |name: &str| env.get(name).copied();
                let d = index.eval(&lookup).unwrap() as usize;
                let valid = guard
                    .as_ref()
                    .is_none_or(|g| g.value.eval(&lookup).unwrap() < g.bound as i64);
                match map.source_offset_linear(d, &mut scratch) {
                    Some(s) => {
                        assert!(valid, "({x}, {y}) skips a real element");
                        assert_eq!(offset.eval(&lookup), Some(s as i64));
                        moved[s] += 1;
                    }
                    None => assert!(!valid, "({x}, {y}) moves padding"),
                }
            }
        }
        moved
    }

    /// Same as [`walk_linear`] for image plans, one pixel of four lanes per item
    fn walk_vector(ctx: &TransformContext, plan: &KernelPlan) -> Vec<usize> {
        let map = ctx.index_map();
        let Access::Vector { base, stride, remain } = &plan.access else {
            panic!("expected a vector plan");
        };
        let lane_axis = ctx.dest_shape().len() - 1;
        let mut coord = vec![0usize; lane_axis + 1];
        let mut moved = vec![0usize; ctx.source_len()];
        for y in 0..plan.height {
            for x in 0..plan.width {
                let env = bind(plan, x, y);
                let lookup = |name: &str| env.get(name).copied();
                for (axis, slot) in ctx.dest_axes()[..lane_axis].iter().zip(coord.iter_mut()) {
                    *slot = env[&axis_var(*axis)] as usize;
                }
                let base = base.eval(&lookup).unwrap();
                let remain = remain.eval(&lookup).unwrap();
                for lane in 0..IMAGE_VECTOR_WIDTH {
                    coord[lane_axis] = lane;
                    match map.source_offset(&coord) {
                        Some(s) => {
                            assert!((lane as i64) < remain, "({x}, {y}) lane {lane} dropped");
                            assert_eq!(base + (lane * stride) as i64, s as i64);
                            moved[s] += 1;
                        }
                        None => {
                            assert!((lane as i64) >= remain, "({x}, {y}) lane {lane} is padding")
                        }
                    }
                }
            }
        }
        moved
    }

    #[test]
    fn test_linear_matches_index_map() {
        let (_, plan) = plan_for("nchw", "nc4hw4", &[2, 9, 3, 3]);
        assert_eq!(plan.name, "CopyBufferNCHWToBufferNC4HW4_f32");
        assert_eq!((plan.width, plan.height), (4, 54));

        for (from, to, shape) in [
            ("nchw", "nc4hw4", [2, 9, 3, 3]),
            ("nchw", "nhwc", [2, 3, 4, 5]),
            ("nc4hw4", "nchw", [2, 9, 3, 3]),
            ("nhc4w4", "nhwc", [2, 3, 5, 7]),
            ("nc4hw4", "nhc4w4", [1, 6, 2, 3]),
        ] {
            let (ctx, plan) = plan_for(from, to, &shape);
            let moved = walk_linear(&ctx, &plan);
            assert!(moved.iter().all(|&n| n == 1), "{from} -> {to}");
        }
    }

    #[test]
    fn test_vector_matches_index_map() {
        let (_, plan) = plan_for("nchw", "nh|c4w4", &[2, 9, 3, 5]);
        assert_eq!(plan.output, MemoryKind::Image);
        let Access::Vector { stride, .. } = plan.access else {
            panic!("expected a vector plan");
        };
        assert_eq!(stride, 15);

        // (width, height): width axes after the delimiter, height axes before
        for (from, to, shape, extent) in [
            ("nchw", "nh|c4w4", [2, 9, 3, 5], (15, 6)),
            ("nh|c4w4", "nchw", [2, 9, 3, 5], (15, 6)),
            ("n|hc4w4", "nhwc", [2, 3, 5, 7], (30, 2)),
            ("nc|hw44", "nchw", [1, 2, 3, 7], (6, 2)),
            ("nchw", "nc|hw44", [1, 2, 3, 7], (6, 2)),
        ] {
            let (ctx, plan) = plan_for(from, to, &shape);
            assert_eq!((plan.width, plan.height), extent, "{from} -> {to}");
            let moved = walk_vector(&ctx, &plan);
            assert_eq!(moved.len(), shape.iter().product::<usize>());
            assert!(moved.iter().all(|&n| n == 1), "{from} -> {to}");
        }
    }

    #[test]
    fn test_reversed_image_plan() {
        let ctx = TransformContext::new("n|hc4w4", "nchw", &[1, 6, 2, 2]).unwrap();
        let plan = KernelPlan::new(&ctx, DType::F16).unwrap();
        assert_eq!(plan.name, "CopyImageNHC4W4ToBufferNCHW_f16");
        assert_eq!(plan.direction, Direction::Reversed);
        assert_eq!((plan.width, plan.height), (8, 1));
    }

    #[test]
    fn test_image_rules() {
        let plan = |from, to, shape: &[usize]| {
            TransformContext::new(from, to, shape).and_then(|ctx| KernelPlan::new(&ctx, DType::F32))
        };
        // image on the unpacked side
        assert!(matches!(
            plan("nc4hw4", "n|chw", &[1, 5, 2, 2]),
            Err(Error::Unsupported { .. })
        ));
        // image pixels are 4 wide
        assert!(plan("nchw", "nh|c8w8", &[1, 5, 2, 2]).is_err());
        // both packed with an image
        assert!(plan("nc4hw4", "nh|c4w4", &[1, 5, 2, 2]).is_err());
        // no image dtype for f64, but buffers are fine
        let ctx = TransformContext::new("nchw", "nh|c4w4", &[1, 5, 2, 2]).unwrap();
        assert!(matches!(
            KernelPlan::new(&ctx, DType::F64),
            Err(Error::UnsupportedDType { dtype: DType::F64, .. })
        ));
        let ctx = TransformContext::new("nchw", "nc4hw4", &[1, 5, 2, 2]).unwrap();
        assert!(KernelPlan::new(&ctx, DType::F64).is_ok());
    }
}
