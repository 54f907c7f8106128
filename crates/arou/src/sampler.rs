//! The ratio-of-uniforms generator.
//!
//! A draw picks a segment with probability proportional to its area through
//! the guide table. Points in the squeeze triangle are returned immediately;
//! points in the outer triangle are accepted iff `u² ≤ f(v/u)`. Rejected
//! points feed online splits until the squeeze/hat ratio reaches its target.

use rand::Rng;
use tracing::{debug, error, warn};

use crate::density::{check_requirements, Density};
use crate::envelope::{
    build_envelope, run_dars, DarsReport, Envelope, SegmentId, SegmentInfo, SplitOutcome,
};
use crate::error::ArouError;
use crate::guide::GuideTable;
use crate::options::ArouOptions;

/// Generator state after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    /// A pedantic generator saw an invalid density value, a violated
    /// condition or (in verify mode) a non-T-concave density; every draw
    /// returns `f64::INFINITY`.
    Disabled,
}

/// Automatic ratio-of-uniforms sampler for a T-concave density.
#[derive(Clone, Debug)]
pub struct Arou<D, R> {
    density: D,
    rng: R,
    env: Envelope,
    guide: GuideTable,
    domain: (f64, f64),
    guide_factor: f64,
    max_segments: usize,
    max_ratio: f64,
    verify: bool,
    pedantic: bool,
    status: Status,
    verify_violations: u64,
    dars: Option<DarsReport>,
}

impl<D: Density, R: Rng> Arou<D, R> {
    /// Build the envelope, refine it with DARS (unless disabled) and prepare
    /// the guide table.
    pub fn new(density: D, options: ArouOptions, rng: R) -> Result<Self, ArouError> {
        options.validate()?;
        check_requirements(&density)?;

        let mut env = build_envelope(&density, &options)?;
        let mut max_segments = options.max_segments;
        let dars = if options.use_dars && options.dars_factor.is_finite() {
            let report = run_dars(
                &mut env,
                &density,
                options.target_squeeze_ratio,
                options.dars_factor,
                max_segments,
            )?;
            if report.reached_target {
                max_segments = env.segment_count();
            }
            Some(report)
        } else {
            None
        };

        let guide = GuideTable::build(&env, options.guide_factor);
        debug!(
            segments = env.segment_count(),
            hat_area = env.hat_area(),
            squeeze_area = env.squeeze_area(),
            guide = guide.len(),
            "generator ready"
        );

        Ok(Self {
            domain: density.domain(),
            density,
            rng,
            env,
            guide,
            guide_factor: options.guide_factor,
            max_segments,
            max_ratio: options.target_squeeze_ratio,
            verify: options.verify,
            pedantic: options.pedantic,
            status: Status::Ready,
            verify_violations: 0,
            dars,
        })
    }

    /// One draw from the density.
    ///
    /// Returns `f64::INFINITY` once the generator is [`Status::Disabled`].
    pub fn sample(&mut self) -> f64 {
        loop {
            if self.status == Status::Disabled {
                return f64::INFINITY;
            }
            if let Some(x) = self.try_sample() {
                return x;
            }
        }
    }

    pub fn sample_n(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// One pass of the accept/reject loop; `None` means "draw again".
    fn try_sample(&mut self) -> Option<f64> {
        let u: f64 = self.rng.gen();
        let id = self.guide.lookup(&self.env, u);
        let seg = self.env.segment(id).clone();
        let left = self.env.left_of(id).p;
        let right = self.env.right_of(id).p;
        let r = seg.a_cum - u * self.env.hat_area();

        if r < seg.a_in {
            // squeeze: point on the secant at area fraction r / a_in
            let x = (seg.a_in * right.x + r * (left.x - right.x))
                / (seg.a_in * right.y + r * (left.y - right.y));
            if self.verify {
                let fx = self.density.pdf(x);
                self.check_envelope(id, x, fx);
                if self.status == Status::Disabled {
                    return None;
                }
            }
            return Some(x);
        }

        if !(seg.a_out > 0.0) {
            return None;
        }
        let mut r1 = (r - seg.a_in) / seg.a_out;
        let mut r2: f64 = self.rng.gen();
        if r1 > r2 {
            std::mem::swap(&mut r1, &mut r2);
        }
        let r3 = 1.0 - r2;
        let r2 = r2 - r1;
        let p = seg.mid * r1 + left * r2 + right * r3;
        if !(p.y > 0.0) {
            return None;
        }
        let x = p.x / p.y;
        if !(x >= self.domain.0 && x <= self.domain.1) {
            return None;
        }
        let fx = self.density.pdf(x);

        if self.verify {
            self.check_envelope(id, x, fx);
            if self.status == Status::Disabled {
                return None;
            }
        }

        if self.env.segment_count() < self.max_segments {
            if self.max_ratio * self.env.hat_area() > self.env.squeeze_area() {
                self.online_split(id, x, fx);
                if self.status == Status::Disabled {
                    return None;
                }
            } else {
                self.max_segments = self.env.segment_count();
            }
        }

        (p.y * p.y <= fx).then_some(x)
    }

    fn online_split(&mut self, id: SegmentId, x: f64, fx: f64) {
        match self.env.split(id, x, fx, &self.density) {
            Ok(SplitOutcome::Ignored) => {}
            Ok(_) => self.guide.rebuild(&self.env, self.guide_factor),
            Err(err) if self.pedantic => {
                error!(%err, x, "generator disabled");
                self.status = Status::Disabled;
            }
            Err(err) => warn!(%err, x, "online split skipped"),
        }
    }

    /// Squeeze ≤ f ≤ hat at `x`, with relative slack. A pedantic generator
    /// is disabled on the first violation.
    fn check_envelope(&mut self, id: SegmentId, x: f64, fx: f64) {
        let eps = self.env.cfg().eps_verify;
        let sq = self.env.squeeze_u_in(id, x);
        let hat = self.env.hat_u_in(id, x);
        let (sq, hat) = (sq * sq, hat * hat);
        let mut violated = false;
        if sq > fx * (1.0 + eps) {
            violated = true;
            self.verify_violations += 1;
            warn!(x, fx, squeeze = sq, "squeeze above PDF: not T-concave");
        }
        if fx > hat * (1.0 + eps) {
            violated = true;
            self.verify_violations += 1;
            warn!(x, fx, hat, "PDF above hat: not T-concave");
        }
        if violated && self.pedantic {
            error!(x, fx, "generator disabled: PDF not T-concave");
            self.status = Status::Disabled;
        }
    }
}

impl<D, R> Arou<D, R> {
    pub fn density(&self) -> &D {
        &self.density
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    /// Area below the hat in the transformed plane.
    pub fn hat_area(&self) -> f64 {
        self.env.hat_area()
    }

    pub fn squeeze_area(&self) -> f64 {
        self.env.squeeze_area()
    }

    /// `squeeze_area / hat_area`, in `[0, 1]`.
    pub fn squeeze_hat_ratio(&self) -> f64 {
        self.env.squeeze_area() / self.env.hat_area()
    }

    pub fn segment_count(&self) -> usize {
        self.env.segment_count()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_verify(&mut self, verify: bool) {
        self.verify = verify;
    }

    pub fn verify_violations(&self) -> u64 {
        self.verify_violations
    }

    pub fn dars_report(&self) -> Option<DarsReport> {
        self.dars
    }

    /// True if DARS ran and stopped short of the target ratio.
    pub fn dars_warning(&self) -> bool {
        self.dars.is_some_and(|r| !r.reached_target)
    }

    pub fn segments(&self) -> Vec<SegmentInfo> {
        self.env.infos()
    }

    /// Hat at `x` on the density scale; 0 outside the domain.
    pub fn hat_value(&self, x: f64) -> f64 {
        self.env.hat_value(x)
    }

    pub fn squeeze_value(&self, x: f64) -> f64 {
        self.env.squeeze_value(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::FnDensity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn normal() -> FnDensity {
        FnDensity::builder()
            .pdf(|x| (-0.5 * x * x).exp())
            .dpdf(|x| -x * (-0.5 * x * x).exp())
            .build()
            .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn defaults_reach_target_and_stop_refining() {
        let mut g = Arou::new(normal(), ArouOptions::default(), rng()).unwrap();
        assert!(!g.dars_warning());
        assert!(g.squeeze_hat_ratio() >= 0.99 && g.squeeze_hat_ratio() <= 1.0);
        let n = g.segment_count();
        g.sample_n(2000);
        assert_eq!(g.segment_count(), n);
        assert_eq!(g.status(), Status::Ready);
    }

    #[test]
    fn online_splits_refine_without_dars() {
        let opts = ArouOptions {
            use_dars: false,
            ..Default::default()
        };
        let mut g = Arou::new(normal(), opts, rng()).unwrap();
        assert!(g.dars_report().is_none());
        let n = g.segment_count();
        let ratio = g.squeeze_hat_ratio();
        g.sample_n(5000);
        assert!(g.segment_count() > n);
        assert!(g.segment_count() <= 100);
        assert!(g.squeeze_hat_ratio() > ratio);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let opts = ArouOptions {
            max_segments: 0,
            ..Default::default()
        };
        let err = Arou::new(normal(), opts, rng()).unwrap_err();
        assert!(matches!(err, ArouError::InvalidOptions { .. }));
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Arou::new(normal(), ArouOptions::default(), rng()).unwrap();
        let mut b = a.clone();
        assert_eq!(a.sample_n(100), b.sample_n(100));
    }

    #[test]
    fn verify_mode_counts_no_violation_for_normal() {
        let opts = ArouOptions {
            verify: true,
            use_dars: false,
            ..Default::default()
        };
        let mut g = Arou::new(normal(), opts, rng()).unwrap();
        g.sample_n(5000);
        assert_eq!(g.verify_violations(), 0);
    }

    #[test]
    fn verify_mode_detects_non_t_concave_density() {
        // narrow spike at the mode, invisible at the construction points
        let spike = |x: f64| 5.0 * (-50.0 * x * x).exp();
        let d = FnDensity::builder()
            .pdf(move |x| (-0.5 * x * x).exp() + spike(x))
            .dpdf(move |x| -x * (-0.5 * x * x).exp() - 100.0 * x * spike(x))
            .build()
            .unwrap();
        let opts = ArouOptions {
            construction_points: Some(vec![-2.0, -1.0, 1.0, 2.0]),
            use_center: false,
            use_dars: false,
            max_segments: 5,
            verify: true,
            ..Default::default()
        };
        let mut g = Arou::new(d, opts, rng()).unwrap();
        assert_eq!(g.segment_count(), 5);
        g.sample_n(2000);
        assert!(g.verify_violations() > 0);
        assert_eq!(g.segment_count(), 5);
    }

    /// Normal density with a narrow dip at 0.5, between the construction points.
    fn dipped() -> FnDensity {
        let dip = |x: f64| 0.6 * (-200.0 * (x - 0.5) * (x - 0.5)).exp();
        FnDensity::builder()
            .pdf(move |x| (-0.5 * x * x).exp() * (1.0 - dip(x)))
            .dpdf(move |x| {
                let g = (-0.5 * x * x).exp();
                -x * g * (1.0 - dip(x)) + g * 400.0 * (x - 0.5) * dip(x)
            })
            .build()
            .unwrap()
    }

    /// Six fixed segments: no online splits, no DARS.
    fn dipped_options() -> ArouOptions {
        ArouOptions {
            construction_points: Some(vec![-2.0, -1.0, 0.0, 1.0, 2.0]),
            use_dars: false,
            max_segments: 6,
            verify: true,
            ..Default::default()
        }
    }

    #[test]
    fn verify_mode_checks_squeeze_draws() {
        let mut g = Arou::new(dipped(), dipped_options(), rng()).unwrap();
        assert_eq!(g.segment_count(), 6);
        let mut above = 0;
        let mut unreported = 0;
        for _ in 0..20_000 {
            let before = g.verify_violations();
            let x = g.sample();
            if g.squeeze_value(x) > g.density().pdf(x) * (1.0 + 1e-9) {
                above += 1;
                if g.verify_violations() == before {
                    unreported += 1;
                }
            }
        }
        assert!(above > 0);
        assert_eq!(unreported, 0);
        assert_eq!(g.status(), Status::Ready);
        assert_eq!(g.segment_count(), 6);
    }

    #[test]
    fn pedantic_verify_disables_on_violation() {
        let opts = ArouOptions {
            pedantic: true,
            ..dipped_options()
        };
        let mut g = Arou::new(dipped(), opts, rng()).unwrap();
        let xs = g.sample_n(5000);
        assert_eq!(g.status(), Status::Disabled);
        assert!(g.verify_violations() > 0);
        assert_eq!(xs[xs.len() - 1], f64::INFINITY);
        let first_inf = xs.iter().position(|x| x.is_infinite()).unwrap();
        assert!(xs[..first_inf].iter().all(|x| x.is_finite()));
        assert!(xs[first_inf..].iter().all(|&x| x == f64::INFINITY));
    }

    #[test]
    fn pedantic_generator_disables_on_bad_value() {
        // negative values only strictly between construction points
        let d = FnDensity::builder()
            .pdf(|x| if x > 2.2 && x < 3.9 { -1.0 } else { (-x).exp() })
            .dpdf(|x| -(-x).exp())
            .domain(0.0, 4.0)
            .build()
            .unwrap();
        let opts = ArouOptions {
            construction_points: Some(vec![1.0, 2.0]),
            use_dars: false,
            pedantic: true,
            ..Default::default()
        };
        let mut g = Arou::new(d, opts, rng()).unwrap();
        let xs = g.sample_n(5000);
        assert_eq!(g.status(), Status::Disabled);
        assert_eq!(xs[xs.len() - 1], f64::INFINITY);
        assert!(xs
            .iter()
            .all(|&x| x == f64::INFINITY || (0.0..=4.0).contains(&x)));
    }
}
