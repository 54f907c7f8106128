//! Densities shared by the integration tests (unnormalized).

#![allow(dead_code)]

use arou::FnDensity;

pub fn normal() -> FnDensity {
    FnDensity::builder()
        .pdf(|x| (-0.5 * x * x).exp())
        .dpdf(|x| -x * (-0.5 * x * x).exp())
        .build()
        .unwrap()
}

pub fn cauchy() -> FnDensity {
    FnDensity::builder()
        .pdf(|x| 1.0 / (1.0 + x * x))
        .dpdf(|x| -2.0 * x / ((1.0 + x * x) * (1.0 + x * x)))
        .build()
        .unwrap()
}

pub fn exponential() -> FnDensity {
    FnDensity::builder()
        .pdf(|x| (-x).exp())
        .dpdf(|x| -(-x).exp())
        .domain(0.0, f64::INFINITY)
        .build()
        .unwrap()
}

/// Gamma(3, 1): `x² e^{-x}` on `[0, ∞)`, mode 2.
pub fn gamma3() -> FnDensity {
    FnDensity::builder()
        .pdf(|x| x * x * (-x).exp())
        .dpdf(|x| (2.0 * x - x * x) * (-x).exp())
        .domain(0.0, f64::INFINITY)
        .center(2.0)
        .build()
        .unwrap()
}

pub fn uniform01() -> FnDensity {
    FnDensity::builder()
        .pdf(|_| 1.0)
        .dpdf(|_| 0.0)
        .domain(0.0, 1.0)
        .build()
        .unwrap()
}

pub fn mean_var(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    (mean, var)
}
