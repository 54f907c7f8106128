//! Initial envelope from construction points.

use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

use tracing::{debug, warn};

use super::store::Envelope;
use crate::density::Density;
use crate::error::ArouError;
use crate::geom::{arcmean, make_vertex, ParamFailure, Vertex};
use crate::options::ArouOptions;

/// Extra points inserted while resolving unbounded segments.
pub(crate) const MAX_RESOLVE_SPLITS: usize = 1000;

/// `f(x)` with infinite `x` mapped to 0 and invalid values rejected.
pub(crate) fn pdf_at<D: Density + ?Sized>(density: &D, x: f64) -> Result<f64, ArouError> {
    if x.is_infinite() {
        return Ok(0.0);
    }
    let fx = density.pdf(x);
    if fx.is_nan() || fx < 0.0 {
        return Err(ArouError::data(format!("PDF({x}) = {fx}")));
    }
    if fx.is_infinite() {
        return Err(ArouError::data(format!("PDF({x}) overflow")));
    }
    Ok(fx)
}

/// `n` points at equally spaced angles around `center`.
fn angle_points(n: usize, lo: f64, hi: f64, center: f64) -> Vec<f64> {
    let left = if lo == f64::NEG_INFINITY {
        -FRAC_PI_2
    } else {
        (lo - center).atan()
    };
    let right = if hi == f64::INFINITY {
        FRAC_PI_2
    } else {
        (hi - center).atan()
    };
    let step = (right - left) / (n as f64 + 1.0);
    (1..=n)
        .map(|k| (left + k as f64 * step).tan() + center)
        .collect()
}

/// Construction points strictly inside `(lo, hi)`, increasing, with the
/// center inserted if requested.
pub(crate) fn construction_points(opts: &ArouOptions, lo: f64, hi: f64, center: f64) -> Vec<f64> {
    let (raw, user) = match &opts.construction_points {
        Some(points) => (points.clone(), true),
        None => (angle_points(opts.n_construction_points, lo, hi, center), false),
    };

    let mut points: Vec<f64> = Vec::with_capacity(raw.len() + 1);
    for x in raw {
        let inside = x > lo && x < hi;
        let increasing = points.last().map_or(true, |&last| x > last);
        if inside && increasing {
            points.push(x);
        } else if user {
            warn!(x, inside, increasing, "construction point skipped");
        }
    }

    if opts.use_center && center > lo && center < hi {
        let pos = points.binary_search_by(|p| p.partial_cmp(&center).unwrap_or(Ordering::Less));
        if let Err(pos) = pos {
            points.insert(pos, center);
        }
    }
    points
}

/// Vertices for `lo`, `points`, `hi` with leading zeros collapsed into the
/// left boundary and the list cut at the first zero after the mode.
pub(crate) fn starting_vertices<D: Density + ?Sized>(
    density: &D,
    points: &[f64],
    lo: f64,
    hi: f64,
) -> Result<Vec<Vertex>, ArouError> {
    let dpdf = |x: f64| density.dpdf(x);
    let mut fx_last = pdf_at(density, lo)?;
    let mut vertices = vec![make_vertex(lo, fx_last, dpdf)?];
    let mut increasing = true;

    let n = points.len();
    for (i, x) in points.iter().copied().chain(std::iter::once(hi)).enumerate() {
        let is_last = i == n;
        let fx = pdf_at(density, x)?;

        if !increasing && fx > fx_last * (1.0 + f64::EPSILON) {
            return Err(ArouError::condition(format!(
                "PDF not unimodal: f({x}) = {fx} rises after the mode"
            )));
        }

        if fx <= 0.0 && fx_last <= 0.0 {
            if !increasing {
                break;
            }
            if !is_last {
                // still left of the support: move the boundary vertex
                if let Some(first) = vertices.last_mut() {
                    *first = make_vertex(x, 0.0, dpdf)?;
                }
                continue;
            }
        }

        vertices.push(make_vertex(x, fx, dpdf)?);
        if increasing && fx < fx_last {
            increasing = false;
        }
        fx_last = fx;
    }
    Ok(vertices)
}

/// Compute all segment parameters, splitting unbounded segments at their
/// arc-mean. Returns the number of extra points.
pub(crate) fn resolve_unbounded<D: Density + ?Sized>(
    env: &mut Envelope,
    density: &D,
) -> Result<usize, ArouError> {
    let mut extra = 0;
    let mut cur = Some(env.head());
    while let Some(id) = cur {
        match env.compute_params(id) {
            Ok(sp) => {
                env.set_params(id, sp);
                cur = env.segment(id).next;
            }
            Err(ParamFailure::ConcavityViolation { a_in }) => {
                let (xl, xr) = env.interval(id);
                return Err(ArouError::condition(format!(
                    "squeeze area {a_in} < 0 on [{xl}, {xr}]: PDF not T-concave"
                )));
            }
            Err(ParamFailure::Unbounded) => {
                extra += 1;
                let (xl, xr) = env.interval(id);
                if extra > MAX_RESOLVE_SPLITS {
                    return Err(ArouError::condition(format!(
                        "cannot resolve unbounded segment on [{xl}, {xr}]"
                    )));
                }
                let x = arcmean(xl, xr);
                if !(x > xl && x < xr) {
                    return Err(ArouError::condition(format!(
                        "unbounded segment [{xl}, {xr}] cannot be split"
                    )));
                }
                let fx = pdf_at(density, x)?;
                let vertex = make_vertex(x, fx, |x| density.dpdf(x))?;
                if vertex.at_origin() {
                    env.chop(id, vertex)?;
                } else {
                    env.insert_vertex(id, vertex);
                }
                // recompute `id` with its new boundary
            }
        }
    }
    Ok(extra)
}

/// Build the initial envelope for `density`.
pub fn build_envelope<D: Density + ?Sized>(
    density: &D,
    opts: &ArouOptions,
) -> Result<Envelope, ArouError> {
    let (lo, hi) = density.domain();
    let center = opts.resolve_center(density.center(), lo, hi);
    let points = construction_points(opts, lo, hi, center);
    let vertices = starting_vertices(density, &points, lo, hi)?;

    let mut env = Envelope::from_vertices(vertices, opts.geom)?;
    let extra = resolve_unbounded(&mut env, density)?;
    if env.segment_count() > opts.max_segments {
        return Err(ArouError::condition(format!(
            "{} segments exceed max_segments = {}",
            env.segment_count(),
            opts.max_segments
        )));
    }

    env.refresh_ledger();
    let a_total = env.hat_area();
    if !(a_total > 0.0 && a_total.is_finite()) {
        return Err(ArouError::condition(format!(
            "bad construction points: hat area {a_total}"
        )));
    }
    debug!(
        segments = env.segment_count(),
        extra,
        hat_area = a_total,
        squeeze_area = env.squeeze_area(),
        "envelope built"
    );
    Ok(env)
}
