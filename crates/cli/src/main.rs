use anyhow::{Context, Result};
use arou::{Arou, ArouOptions, FnDensity};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod densities;
mod provenance;

use densities::DensityKind;
use provenance::Payload;

#[derive(Parser)]
#[command(name = "arou")]
#[command(about = "Ratio-of-uniforms sampling for T-concave densities")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Draw samples; write them with a provenance sidecar or print a summary
    Sample {
        #[command(flatten)]
        gen: GenArgs,
        #[arg(long, default_value_t = 10_000)]
        n: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Check squeeze and hat against the density on every draw
        #[arg(long)]
        verify: bool,
    },
    /// Print the segment table of the envelope as JSON
    Envelope {
        #[command(flatten)]
        gen: GenArgs,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(clap::Args, Clone, Debug, Serialize)]
struct GenArgs {
    #[arg(long, value_enum)]
    density: DensityKind,
    /// Shape parameter of the gamma density
    #[arg(long, default_value_t = 3.0)]
    shape: f64,
    #[arg(long, default_value_t = 100)]
    max_segments: usize,
    /// Target squeeze/hat area ratio
    #[arg(long, default_value_t = 0.99)]
    ratio: f64,
}

impl GenArgs {
    fn options(&self, verify: bool) -> ArouOptions {
        ArouOptions {
            max_segments: self.max_segments,
            target_squeeze_ratio: self.ratio,
            verify,
            ..Default::default()
        }
    }

    fn generator(&self, seed: u64, verify: bool) -> Result<Arou<FnDensity, StdRng>> {
        let density = self.density.build(self.shape)?;
        Arou::new(density, self.options(verify), StdRng::seed_from_u64(seed))
            .with_context(|| format!("building generator for {:?}", self.density))
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sample {
            gen,
            n,
            seed,
            out,
            verify,
        } => sample(&gen, n, seed, out.as_deref(), verify),
        Action::Envelope { gen } => envelope(&gen),
        Action::Report => report(),
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    n: usize,
    mean: f64,
    variance: f64,
    min: f64,
    max: f64,
    segments: usize,
    hat_area: f64,
    squeeze_area: f64,
    squeeze_hat_ratio: f64,
    verify_violations: u64,
}

impl Summary {
    fn new(xs: &[f64], gen: &Arou<FnDensity, StdRng>) -> Self {
        let n = xs.len();
        let mean = xs.iter().sum::<f64>() / n.max(1) as f64;
        let variance = if n > 1 {
            xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        Self {
            n,
            mean,
            variance,
            min: xs.iter().copied().fold(f64::INFINITY, f64::min),
            max: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            segments: gen.segment_count(),
            hat_area: gen.hat_area(),
            squeeze_area: gen.squeeze_area(),
            squeeze_hat_ratio: gen.squeeze_hat_ratio(),
            verify_violations: gen.verify_violations(),
        }
    }
}

fn draw(gen_args: &GenArgs, n: usize, seed: u64, verify: bool) -> Result<(Vec<f64>, Summary)> {
    let mut gen = gen_args.generator(seed, verify)?;
    let xs = gen.sample_n(n);
    let summary = Summary::new(&xs, &gen);
    Ok((xs, summary))
}

fn sample(gen_args: &GenArgs, n: usize, seed: u64, out: Option<&Path>, verify: bool) -> Result<()> {
    tracing::info!(density = ?gen_args.density, n, seed, "sample");
    let (xs, summary) = draw(gen_args, n, seed, verify)?;
    match out {
        Some(path) => {
            write_samples(path, &xs, &summary)?;
            let params = json!({ "generator": gen_args, "n": n, "seed": seed, "verify": verify });
            let prov = provenance::write_sidecar(path, Payload::new("sample", params))?;
            tracing::info!(out = %path.display(), provenance = %prov.display(), "written");
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn write_samples(path: &Path, xs: &[f64], summary: &Summary) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let doc = json!({ "summary": summary, "samples": xs });
    std::fs::write(path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Segment row for JSON output; infinite bounds become `null`.
#[derive(Debug, Serialize)]
struct SegmentRow {
    x_left: Option<f64>,
    x_right: Option<f64>,
    a_in: f64,
    a_out: f64,
    a_cum: f64,
}

fn segment_rows(gen: &Arou<FnDensity, StdRng>) -> Vec<SegmentRow> {
    let finite = |x: f64| x.is_finite().then_some(x);
    gen.segments()
        .into_iter()
        .map(|s| SegmentRow {
            x_left: finite(s.x_left),
            x_right: finite(s.x_right),
            a_in: s.a_in,
            a_out: s.a_out,
            a_cum: s.a_cum,
        })
        .collect()
}

fn envelope(gen_args: &GenArgs) -> Result<()> {
    let gen = gen_args.generator(0, false)?;
    let doc = json!({
        "density": gen_args.density,
        "hat_area": gen.hat_area(),
        "squeeze_area": gen.squeeze_area(),
        "segments": segment_rows(&gen),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&Payload::new("report", json!({})), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
