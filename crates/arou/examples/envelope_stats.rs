//! Print envelope statistics and sample moments for a few standard densities.
//!
//! Usage:
//!   cargo run -p arou --example envelope_stats -- normal
//!   cargo run -p arou --example envelope_stats -- gamma
//!
//! Shows segment count, hat/squeeze areas and the mean/variance of 10^5 draws.

use arou::{Arou, ArouOptions, FnDensity};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    let name = std::env::args().nth(1).unwrap_or_else(|| "normal".to_string());
    let density = match name.as_str() {
        "normal" => FnDensity::builder()
            .pdf(|x| (-0.5 * x * x).exp())
            .dpdf(|x| -x * (-0.5 * x * x).exp()),
        "gamma" => FnDensity::builder()
            .pdf(|x| x * x * (-x).exp())
            .dpdf(|x| (2.0 * x - x * x) * (-x).exp())
            .domain(0.0, f64::INFINITY)
            .center(2.0),
        _ => {
            eprintln!("usage: envelope_stats [normal|gamma]");
            return;
        }
    }
    .build()
    .unwrap();

    let mut gen = Arou::new(density, ArouOptions::default(), StdRng::seed_from_u64(2025)).unwrap();
    println!(
        "{name}: segments={}, hat={:.6}, squeeze={:.6}, ratio={:.4}",
        gen.segment_count(),
        gen.hat_area(),
        gen.squeeze_area(),
        gen.squeeze_hat_ratio()
    );

    let xs = gen.sample_n(100_000);
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    println!("{name}: mean={mean:.4}, variance={var:.4}");
}
