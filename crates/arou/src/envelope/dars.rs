//! Derandomized adaptive rejection sampling (DARS).
//!
//! Each round splits every segment whose outer area exceeds
//! `dars_factor · (hat_area − squeeze_area) / segment_count` at the arc-mean of
//! its interval, until the squeeze/hat ratio reaches the target or the segment
//! budget is used up.

use tracing::{debug, warn};

use super::build::pdf_at;
use super::store::{Envelope, SplitOutcome};
use crate::density::Density;
use crate::error::ArouError;
use crate::geom::arcmean;

/// Summary of a DARS run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DarsReport {
    pub rounds: usize,
    pub splits: usize,
    /// Target squeeze/hat ratio reached.
    pub reached_target: bool,
    /// Stopped because `max_segments` was hit.
    pub budget_exhausted: bool,
}

#[inline]
fn below_target(env: &Envelope, max_ratio: f64) -> bool {
    max_ratio * env.hat_area() > env.squeeze_area()
}

pub(crate) fn run_dars<D: Density + ?Sized>(
    env: &mut Envelope,
    density: &D,
    max_ratio: f64,
    dars_factor: f64,
    max_segments: usize,
) -> Result<DarsReport, ArouError> {
    let mut report = DarsReport::default();

    while below_target(env, max_ratio) && env.segment_count() < max_segments {
        let n = env.segment_count();
        let a_limit = if report.rounds == 0 || n <= 1 {
            0.0
        } else {
            dars_factor * (env.hat_area() - env.squeeze_area()) / n as f64
        };

        let mut n_split = 0;
        for id in env.ids() {
            if env.segment_count() >= max_segments {
                break;
            }
            if env.segment(id).a_out <= a_limit {
                continue;
            }
            let (xl, xr) = env.interval(id);
            let x = arcmean(xl, xr);
            let fx = pdf_at(density, x)?;
            if env.split(id, x, fx, density)? != SplitOutcome::Ignored {
                n_split += 1;
            }
        }

        report.rounds += 1;
        report.splits += n_split;
        debug!(
            round = report.rounds,
            splits = n_split,
            segments = env.segment_count(),
            ratio = env.squeeze_area() / env.hat_area(),
            "DARS round"
        );
        if n_split == 0 {
            warn!(round = report.rounds, "DARS aborted: no segment could be split");
            break;
        }
    }

    report.reached_target = !below_target(env, max_ratio);
    if !report.reached_target {
        report.budget_exhausted = env.segment_count() >= max_segments;
        warn!(
            ratio = env.squeeze_area() / env.hat_area(),
            target = max_ratio,
            segments = env.segment_count(),
            budget_exhausted = report.budget_exhausted,
            "squeeze/hat ratio below target after DARS"
        );
    }
    Ok(report)
}
