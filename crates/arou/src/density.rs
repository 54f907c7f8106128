//! Densities accepted by the sampler.
//!
//! The sampler only needs the (unnormalized) density, its derivative, the
//! support, and optionally a point near the mode. Anything implementing
//! [`Density`] can be sampled; [`FnDensity`] wraps plain closures.

use std::fmt;
use std::sync::Arc;

use crate::error::ArouError;

/// Continuous density known up to a constant factor.
///
/// Requirements for the ratio-of-uniforms envelope: `pdf ≥ 0`, unimodal, and
/// `−1/√pdf` concave on the support (T-concave with `c = −1/2`).
pub trait Density {
    /// Density at `x` (any positive multiple of the normalized density).
    fn pdf(&self, x: f64) -> f64;

    /// Derivative of `pdf` at `x`. Non-finite values are tolerated.
    fn dpdf(&self, x: f64) -> f64;

    /// Support `(lo, hi)`; either end may be infinite.
    fn domain(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    /// A point near the mode, if known.
    fn center(&self) -> Option<f64> {
        None
    }
}

impl<D: Density + ?Sized> Density for &D {
    fn pdf(&self, x: f64) -> f64 {
        (**self).pdf(x)
    }
    fn dpdf(&self, x: f64) -> f64 {
        (**self).dpdf(x)
    }
    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }
    fn center(&self) -> Option<f64> {
        (**self).center()
    }
}

/// Check the domain and center reported by `density`.
pub(crate) fn check_requirements<D: Density + ?Sized>(density: &D) -> Result<(), ArouError> {
    let (lo, hi) = density.domain();
    if lo.is_nan() || hi.is_nan() || lo >= hi {
        return Err(ArouError::requirement(format!(
            "invalid domain ({lo}, {hi})"
        )));
    }
    if let Some(c) = density.center() {
        if !c.is_finite() {
            return Err(ArouError::requirement(format!("center {c} not finite")));
        }
    }
    Ok(())
}

type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Density assembled from closures. Build with [`FnDensity::builder`].
#[derive(Clone)]
pub struct FnDensity {
    pdf: ScalarFn,
    dpdf: ScalarFn,
    domain: (f64, f64),
    center: Option<f64>,
}

impl FnDensity {
    pub fn builder() -> FnDensityBuilder {
        FnDensityBuilder::default()
    }
}

impl fmt::Debug for FnDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDensity")
            .field("domain", &self.domain)
            .field("center", &self.center)
            .finish_non_exhaustive()
    }
}

impl Density for FnDensity {
    fn pdf(&self, x: f64) -> f64 {
        (self.pdf)(x)
    }
    fn dpdf(&self, x: f64) -> f64 {
        (self.dpdf)(x)
    }
    fn domain(&self) -> (f64, f64) {
        self.domain
    }
    fn center(&self) -> Option<f64> {
        self.center
    }
}

/// Builder for [`FnDensity`]; pdf and derivative are mandatory.
#[derive(Default)]
pub struct FnDensityBuilder {
    pdf: Option<ScalarFn>,
    dpdf: Option<ScalarFn>,
    domain: Option<(f64, f64)>,
    center: Option<f64>,
}

impl FnDensityBuilder {
    pub fn pdf<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.pdf = Some(Arc::new(f));
        self
    }

    pub fn dpdf<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.dpdf = Some(Arc::new(f));
        self
    }

    pub fn domain(mut self, lo: f64, hi: f64) -> Self {
        self.domain = Some((lo, hi));
        self
    }

    pub fn center(mut self, c: f64) -> Self {
        self.center = Some(c);
        self
    }

    pub fn build(self) -> Result<FnDensity, ArouError> {
        let pdf = self
            .pdf
            .ok_or_else(|| ArouError::requirement("PDF required"))?;
        let dpdf = self
            .dpdf
            .ok_or_else(|| ArouError::requirement("derivative of PDF required"))?;
        let density = FnDensity {
            pdf,
            dpdf,
            domain: self
                .domain
                .unwrap_or((f64::NEG_INFINITY, f64::INFINITY)),
            center: self.center,
        };
        check_requirements(&density)?;
        Ok(density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_pdf_and_derivative() {
        let err = FnDensity::builder().dpdf(|_| 0.0).build().unwrap_err();
        assert!(matches!(err, ArouError::DistributionRequirement { .. }));
        let err = FnDensity::builder().pdf(|_| 1.0).build().unwrap_err();
        assert!(matches!(err, ArouError::DistributionRequirement { .. }));
    }

    #[test]
    fn builder_rejects_bad_domain_and_center() {
        let base = || FnDensity::builder().pdf(|_| 1.0).dpdf(|_| 0.0);
        assert!(base().domain(1.0, 1.0).build().is_err());
        assert!(base().domain(2.0, 1.0).build().is_err());
        assert!(base().domain(f64::NAN, 1.0).build().is_err());
        assert!(base().center(f64::INFINITY).build().is_err());
        assert!(base().domain(0.0, 1.0).center(0.5).build().is_ok());
    }

    #[test]
    fn closures_are_forwarded() {
        let d = FnDensity::builder()
            .pdf(|x| (-x).exp())
            .dpdf(|x| -(-x).exp())
            .domain(0.0, f64::INFINITY)
            .build()
            .unwrap();
        assert_eq!(d.pdf(0.0), 1.0);
        assert_eq!(d.dpdf(0.0), -1.0);
        assert_eq!(d.domain(), (0.0, f64::INFINITY));
        assert_eq!(d.center(), None);
        // blanket impl for references
        let r = &d;
        assert_eq!(Density::pdf(&r, 0.0), 1.0);
    }
}
