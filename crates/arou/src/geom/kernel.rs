//! Geometry kernel: touch points, tangents, tangent intersections and segment areas.
//!
//! All functions are pure. A segment is the region of the transformed plane
//! between the rays through its two vertices; it splits into
//! - the squeeze: triangle `(origin, left, right)` with area `a_in`,
//! - the outer triangle `(left, mid, right)` with area `a_out`, where `mid` is
//!   the intersection of the two tangents.
//!
//! Orientation: vertices are ordered by increasing `x`, so for a valid segment
//! `a_in = (u_l·v_r − v_l·u_r)/2 = u_l·u_r·(x_r − x_l)/2 ≥ 0`.

use nalgebra::{Matrix2, Vector2};

use super::types::{GeomCfg, Tangent, TouchPoint, Vertex};
use crate::error::ArouError;

/// Result of a successful parameter computation for one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParams {
    pub mid: TouchPoint,
    pub a_in: f64,
    pub a_out: f64,
}

/// Why a segment has no usable parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamFailure {
    /// Squeeze area negative beyond tolerance (vertices out of order or the
    /// density is not T-concave around the segment).
    ConcavityViolation { a_in: f64 },
    /// Tangents parallel and distinct, or their intersection is too far away
    /// or on the wrong side of the secant.
    Unbounded,
}

/// 2D cross product `a.v·b.u − a.u·b.v`.
#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Touch point `(x·√fx, √fx)`; `fx` must be finite and non-negative.
#[inline]
pub fn touch_point(x: f64, fx: f64) -> TouchPoint {
    let u = fx.sqrt();
    Vector2::new(x * u, u)
}

/// Tangent of the transformed region at `x` with `f(x) = fx > 0`.
///
/// Falls back to the line through origin and vertex if `dfx` is not finite.
pub fn tangent_at(x: f64, p: TouchPoint, dfx: f64) -> Tangent {
    let u = p.y;
    if dfx.is_finite() {
        let a = -dfx / u;
        let b = 2.0 * u + dfx * x / u;
        let n = Vector2::new(a, b);
        Tangent::new(n, n.dot(&p))
    } else {
        Tangent::new(Vector2::new(-u, p.x), 0.0)
    }
}

/// Sentinel tangent for a zero-density vertex at `x`.
#[inline]
pub fn boundary_tangent(x: f64) -> Tangent {
    if x.is_infinite() {
        Tangent::horizontal()
    } else {
        Tangent::ray(x)
    }
}

/// Build the vertex of construction point `x` with density `fx`.
///
/// `dpdf` is only evaluated for `fx > 0`.
pub fn make_vertex<F>(x: f64, fx: f64, dpdf: F) -> Result<Vertex, ArouError>
where
    F: FnOnce(f64) -> f64,
{
    if fx.is_nan() {
        return Err(ArouError::data(format!("PDF({x}) is NaN")));
    }
    if fx < 0.0 {
        return Err(ArouError::data(format!("PDF({x}) = {fx} < 0")));
    }
    if fx.is_infinite() {
        return Err(ArouError::data(format!("PDF({x}) overflow")));
    }
    if fx == 0.0 {
        return Ok(Vertex {
            x,
            p: Vector2::zeros(),
            tangent: boundary_tangent(x),
        });
    }
    if !x.is_finite() {
        return Err(ArouError::data(format!("PDF({x}) = {fx} > 0 at infinity")));
    }
    let p = touch_point(x, fx);
    Ok(Vertex {
        x,
        p,
        tangent: tangent_at(x, p, dpdf(x)),
    })
}

#[inline]
fn near_zero(value: f64, scale: f64, eps: f64) -> bool {
    value.abs() <= eps * scale
}

#[inline]
fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps * a.abs().max(b.abs()).max(f64::MIN_POSITIVE)
}

/// Intersection of two tangents via Cramer's rule.
///
/// Returns `Ok(None)` for coincident lines, `Err(Unbounded)` for distinct
/// parallel lines or an intersection beyond `max_norm_intersection · scale`.
pub fn intersect(
    lt: &Tangent,
    rt: &Tangent,
    scale: f64,
    cfg: &GeomCfg,
) -> Result<Option<TouchPoint>, ParamFailure> {
    let m = Matrix2::new(lt.n.x, lt.n.y, rt.n.x, rt.n.y);
    let det = m.determinant();
    let det_v = Matrix2::new(lt.c, lt.n.y, rt.c, rt.n.y).determinant();
    let det_u = Matrix2::new(lt.n.x, lt.c, rt.n.x, rt.c).determinant();

    let det_scale = (lt.n.x * rt.n.y).abs() + (lt.n.y * rt.n.x).abs();
    if near_zero(det, det_scale, cfg.eps_coef) {
        let v_scale = (lt.c * rt.n.y).abs() + (lt.n.y * rt.c).abs();
        let u_scale = (lt.n.x * rt.c).abs() + (lt.c * rt.n.x).abs();
        if near_zero(det_v, v_scale, cfg.eps_coef) && near_zero(det_u, u_scale, cfg.eps_coef) {
            return Ok(None);
        }
        return Err(ParamFailure::Unbounded);
    }
    if det_v.abs() + det_u.abs() > cfg.max_norm_intersection * scale * det.abs() {
        return Err(ParamFailure::Unbounded);
    }
    Ok(Some(Vector2::new(det_v / det, det_u / det)))
}

/// Squeeze and outer-triangle areas of the segment between `left` and `right`.
pub fn segment_params(
    left: &Vertex,
    right: &Vertex,
    cfg: &GeomCfg,
) -> Result<SegmentParams, ParamFailure> {
    let (l, r) = (left.p, right.p);
    let scale = l.x.abs() + l.y.abs() + r.x.abs() + r.y.abs();
    let area_tol = cfg.eps_area * scale * scale;
    let secant_mid = 0.5 * (l + r);

    let a_in = 0.5 * cross(r, l);
    if a_in < 0.0 {
        if -a_in <= area_tol {
            return Ok(SegmentParams {
                mid: secant_mid,
                a_in: 0.0,
                a_out: 0.0,
            });
        }
        return Err(ParamFailure::ConcavityViolation { a_in });
    }

    let Some(mid) = intersect(&left.tangent, &right.tangent, scale, cfg)? else {
        // Coincident tangents: the segment is flat only if both vertices lie on them.
        let on_right = approx_eq(right.tangent.n.dot(&l), right.tangent.c, cfg.eps_collinear);
        let on_left = approx_eq(left.tangent.n.dot(&r), left.tangent.c, cfg.eps_collinear);
        if on_right && on_left {
            return Ok(SegmentParams {
                mid: secant_mid,
                a_in,
                a_out: 0.0,
            });
        }
        return Err(ParamFailure::Unbounded);
    };

    let a_out = 0.5 * cross(l - mid, r - mid);
    if a_out < 0.0 {
        // Intersection on the wrong side of the secant: harmless rounding only
        // if it is extremely close to the secant.
        if -a_out <= area_tol {
            return Ok(SegmentParams {
                mid: secant_mid,
                a_in,
                a_out: 0.0,
            });
        }
        return Err(ParamFailure::Unbounded);
    }
    Ok(SegmentParams { mid, a_in, a_out })
}

/// Distance `t` (the `u` coordinate) at which the ray `{t·(x, 1)}` crosses the
/// line through `p` and `q`. `None` if parallel or through the origin.
pub fn ray_crossing(x: f64, p: TouchPoint, q: TouchPoint) -> Option<f64> {
    let d = Vector2::new(x, 1.0);
    let e = q - p;
    let t = cross(p, e) / cross(d, e);
    (t.is_finite() && t > 0.0).then_some(t)
}

/// `u` of the squeeze boundary (secant) along the ray of `x`; 0 if the secant
/// passes through the origin.
pub fn squeeze_u(x: f64, left: TouchPoint, right: TouchPoint) -> f64 {
    ray_crossing(x, left, right).unwrap_or(0.0)
}

/// `u` of the hat boundary along the ray of `x`: the first of the lines
/// `left–mid` and `mid–right` the ray leaves through.
pub fn hat_u(x: f64, left: TouchPoint, mid: TouchPoint, right: TouchPoint) -> f64 {
    let t1 = ray_crossing(x, left, mid);
    let t2 = ray_crossing(x, mid, right);
    match (t1, t2) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => squeeze_u(x, left, right),
    }
}

/// Splitting point between `x0` and `x1` ("arc-mean").
///
/// Mean of the angles `atan(x0)`, `atan(x1)` mapped back through `tan`, which
/// concentrates points near 0 and accepts infinite arguments. Far tails of the
/// same sign use the harmonic mean, nearly equal angles the arithmetic mean.
pub fn arcmean(x0: f64, x1: f64) -> f64 {
    let (x0, x1) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
    if x1 < -1e3 || x0 > 1e3 {
        return 2.0 / (1.0 / x0 + 1.0 / x1);
    }
    let a0 = if x0 == f64::NEG_INFINITY {
        -std::f64::consts::FRAC_PI_2
    } else {
        x0.atan()
    };
    let a1 = if x1 == f64::INFINITY {
        std::f64::consts::FRAC_PI_2
    } else {
        x1.atan()
    };
    if (a0 - a1).abs() < 1e-6 {
        0.5 * x0 + 0.5 * x1
    } else {
        (0.5 * (a0 + a1)).tan()
    }
}
