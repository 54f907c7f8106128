//! Ratio-of-uniforms geometry (touch points, tangents, segment areas).
//!
//! Purpose
//! - Map construction points `x` to touch points `(v, u) = (x·√f, √f)` and
//!   supporting lines of the transformed region `{(v, u) : 0 < u ≤ √f(v/u)}`.
//! - Compute the squeeze/outer areas of one segment and classify degenerate
//!   configurations (coincident or parallel tangents, far intersections).
//!
//! The region is convex iff `−1/√f` is concave (T-concavity with `c = −1/2`);
//! every result here assumes that, and reports the cases where it visibly fails.

mod kernel;
mod types;

pub use kernel::{
    arcmean, boundary_tangent, cross, hat_u, intersect, make_vertex, ray_crossing,
    segment_params, squeeze_u, tangent_at, touch_point, ParamFailure, SegmentParams,
};
pub use types::{GeomCfg, Tangent, TouchPoint, Vertex};
