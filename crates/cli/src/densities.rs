//! Named densities available from the command line (all unnormalized).

use anyhow::{bail, Result};
use arou::FnDensity;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityKind {
    /// Standard normal.
    Normal,
    /// Standard Cauchy.
    Cauchy,
    /// Exponential with rate 1 on [0, ∞).
    Exponential,
    /// Uniform on [0, 1].
    Uniform,
    /// Gamma(shape, 1) on [0, ∞); requires shape ≥ 1.
    Gamma,
}

impl DensityKind {
    pub fn build(self, shape: f64) -> Result<FnDensity> {
        let builder = match self {
            Self::Normal => FnDensity::builder()
                .pdf(|x| (-0.5 * x * x).exp())
                .dpdf(|x| -x * (-0.5 * x * x).exp()),
            Self::Cauchy => FnDensity::builder()
                .pdf(|x| 1.0 / (1.0 + x * x))
                .dpdf(|x| -2.0 * x / ((1.0 + x * x) * (1.0 + x * x))),
            Self::Exponential => FnDensity::builder()
                .pdf(|x| (-x).exp())
                .dpdf(|x| -(-x).exp())
                .domain(0.0, f64::INFINITY),
            Self::Uniform => FnDensity::builder()
                .pdf(|_| 1.0)
                .dpdf(|_| 0.0)
                .domain(0.0, 1.0),
            Self::Gamma => {
                if !(shape >= 1.0 && shape.is_finite()) {
                    bail!("gamma shape must be finite and >= 1, got {shape}");
                }
                let k = shape - 1.0;
                FnDensity::builder()
                    .pdf(move |x| x.powf(k) * (-x).exp())
                    .dpdf(move |x| {
                        let pow = if k == 0.0 { 0.0 } else { k * x.powf(k - 1.0) };
                        (pow - x.powf(k)) * (-x).exp()
                    })
                    .domain(0.0, f64::INFINITY)
                    .center(k)
            }
        };
        Ok(builder.build()?)
    }
}
