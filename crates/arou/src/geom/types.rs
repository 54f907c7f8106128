//! Basic ratio-of-uniforms types and tolerances.
//!
//! - `GeomCfg`: centralizes the tolerances of the geometry kernel.
//! - `Tangent`: supporting line `n · (v, u) = c` of the transformed region.
//! - `Vertex`: touch point `(v, u)` of a construction point plus its tangent.
//!
//! Coordinates are stored as `Vector2` with `.x = v` and `.y = u`.

use nalgebra::Vector2;

/// Touch point `(v, u) = (x·√f(x), √f(x))`.
pub type TouchPoint = Vector2<f64>;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeomCfg {
    /// Intersections of tangents whose 1-norm exceeds this multiple of the
    /// vertex scale are treated as unbounded.
    pub max_norm_intersection: f64,
    /// Negative areas with `|A| <= eps_area · scale²` are rounding noise and
    /// clamp to zero. `scale` is the 1-norm sum of both vertices.
    pub eps_area: f64,
    /// Relative threshold for "numerically zero" determinants and coefficients.
    pub eps_coef: f64,
    /// Relative slack for point-on-line tests of degenerate (collinear) segments.
    pub eps_collinear: f64,
    /// Relative slack of the squeeze/hat checks in verify mode.
    pub eps_verify: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            max_norm_intersection: 1e6,
            eps_area: 1e-10,
            eps_coef: 16.0 * f64::EPSILON,
            eps_collinear: 1e-10,
            eps_verify: 1e-9,
        }
    }
}

/// Supporting line `n · p = c` with `p = (v, u)`.
///
/// Tangents computed from the density derivative have `c = 2 f(x) > 0`.
/// Sentinel tangents pass through the origin (`c = 0`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tangent {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Tangent {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }

    /// The axis `u = 0`, used for zero-density vertices at ±∞.
    #[inline]
    pub fn horizontal() -> Self {
        Self::new(Vector2::new(0.0, 1.0), 0.0)
    }

    /// The ray `v = x·u` through the origin, i.e. the boundary `x` of the support.
    #[inline]
    pub fn ray(x: f64) -> Self {
        Self::new(Vector2::new(-1.0, x), 0.0)
    }

    /// Residual `n · p - c`.
    #[inline]
    pub fn eval(&self, p: TouchPoint) -> f64 {
        self.n.dot(&p) - self.c
    }
}

/// One construction point in the transformed plane.
///
/// `x` is the construction point itself. For zero-density vertices the touch
/// point is the origin and `x` records where the support ends (±∞ or the
/// position of the sentinel ray).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub p: TouchPoint,
    pub tangent: Tangent,
}

impl Vertex {
    /// True for zero-density vertices (touch point at the origin).
    #[inline]
    pub fn at_origin(&self) -> bool {
        self.p.x == 0.0 && self.p.y == 0.0
    }
}
