//! Generator configuration.

use crate::error::ArouError;
use crate::geom::GeomCfg;

/// Options for [`crate::Arou::new`].
///
/// Defaults: 30 automatic construction points around the center, center
/// inserted, DARS on with factor 0.99 towards a squeeze/hat ratio of 0.99,
/// at most 100 segments, guide table twice the number of segments.
#[derive(Clone, Debug)]
pub struct ArouOptions {
    /// Explicit construction points (increasing). `None` generates
    /// `n_construction_points` points by the angle rule.
    pub construction_points: Option<Vec<f64>>,
    pub n_construction_points: usize,
    /// Center of the density. Falls back to `Density::center`, then 0, and is
    /// clamped into the domain.
    pub center: Option<f64>,
    /// Insert the center as an additional construction point.
    pub use_center: bool,
    /// Upper bound for the number of segments (construction, DARS and online).
    pub max_segments: usize,
    /// Refinement stops once `squeeze_area / hat_area ≥ target_squeeze_ratio`.
    pub target_squeeze_ratio: f64,
    pub use_dars: bool,
    /// Segments with outer area above `dars_factor · mean outer area` are split
    /// in each DARS round. `f64::INFINITY` disables DARS.
    pub dars_factor: f64,
    /// Guide table size relative to the number of segments.
    pub guide_factor: f64,
    /// Check squeeze and hat against the density on every draw.
    pub verify: bool,
    /// Disable the generator once an online split reveals a violated condition.
    pub pedantic: bool,
    pub geom: GeomCfg,
}

impl Default for ArouOptions {
    fn default() -> Self {
        Self {
            construction_points: None,
            n_construction_points: 30,
            center: None,
            use_center: true,
            max_segments: 100,
            target_squeeze_ratio: 0.99,
            use_dars: true,
            dars_factor: 0.99,
            guide_factor: 2.0,
            verify: false,
            pedantic: false,
            geom: GeomCfg::default(),
        }
    }
}

impl ArouOptions {
    pub fn validate(&self) -> Result<(), ArouError> {
        if let Some(points) = &self.construction_points {
            if let Some(bad) = points.iter().find(|x| x.is_nan()) {
                return Err(ArouError::options(format!("construction point {bad}")));
            }
        }
        if let Some(c) = self.center {
            if !c.is_finite() {
                return Err(ArouError::options(format!("center {c} not finite")));
            }
        }
        if self.max_segments == 0 {
            return Err(ArouError::options("max_segments must be > 0"));
        }
        if !(self.target_squeeze_ratio > 0.0 && self.target_squeeze_ratio <= 1.0) {
            return Err(ArouError::options(format!(
                "target_squeeze_ratio {} not in (0, 1]",
                self.target_squeeze_ratio
            )));
        }
        if self.dars_factor.is_nan() || self.dars_factor < 0.0 {
            return Err(ArouError::options("dars_factor must be >= 0"));
        }
        if !(self.guide_factor.is_finite() && self.guide_factor >= 0.0) {
            return Err(ArouError::options("guide_factor must be finite and >= 0"));
        }
        Ok(())
    }

    /// Center used for construction: explicit, then the density's, then 0;
    /// clamped into `[lo, hi]`.
    pub(crate) fn resolve_center(&self, hint: Option<f64>, lo: f64, hi: f64) -> f64 {
        self.center.or(hint).unwrap_or(0.0).clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let o = ArouOptions::default();
        o.validate().unwrap();
        assert_eq!(o.max_segments, 100);
        assert_eq!(o.n_construction_points, 30);
        assert!((o.target_squeeze_ratio - 0.99).abs() < 1e-15);
    }

    #[test]
    fn out_of_range_values_rejected() {
        let bad = [
            ArouOptions {
                max_segments: 0,
                ..Default::default()
            },
            ArouOptions {
                target_squeeze_ratio: 0.0,
                ..Default::default()
            },
            ArouOptions {
                target_squeeze_ratio: 1.5,
                ..Default::default()
            },
            ArouOptions {
                dars_factor: -1.0,
                ..Default::default()
            },
            ArouOptions {
                guide_factor: f64::NAN,
                ..Default::default()
            },
            ArouOptions {
                construction_points: Some(vec![0.0, f64::NAN]),
                ..Default::default()
            },
        ];
        for o in bad {
            assert!(matches!(
                o.validate(),
                Err(ArouError::InvalidOptions { .. })
            ));
        }
    }

    #[test]
    fn center_resolution_order() {
        let o = ArouOptions::default();
        assert_eq!(o.resolve_center(None, f64::NEG_INFINITY, f64::INFINITY), 0.0);
        assert_eq!(o.resolve_center(Some(2.0), f64::NEG_INFINITY, f64::INFINITY), 2.0);
        assert_eq!(o.resolve_center(None, 1.0, 3.0), 1.0);
        let o = ArouOptions {
            center: Some(-5.0),
            ..Default::default()
        };
        assert_eq!(o.resolve_center(Some(2.0), -1.0, 3.0), -1.0);
    }
}
