//! Segment store: vertex arena, linked segments, splitting and the area ledger.
//!
//! Vertices and segments live in append-only arenas. A segment refers to its
//! two boundary vertices by index, so neighbouring segments share a boundary
//! without aliasing. Segments are never removed; `next` links keep domain order.

use nalgebra::Vector2;
use tracing::warn;

use crate::density::Density;
use crate::error::ArouError;
use crate::geom::{
    hat_u, make_vertex, segment_params, squeeze_u, GeomCfg, ParamFailure, SegmentParams,
    TouchPoint, Vertex,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentId(pub usize);

/// One segment of the hat polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub left: VertexId,
    pub right: VertexId,
    /// Intersection of the boundary tangents (apex of the outer triangle).
    pub mid: TouchPoint,
    /// Squeeze area: triangle `(origin, left, right)`.
    pub a_in: f64,
    /// Outer area: triangle `(left, mid, right)`.
    pub a_out: f64,
    /// `Σ (a_in + a_out)` from the first segment through this one.
    pub a_cum: f64,
    pub next: Option<SegmentId>,
}

impl Segment {
    fn unset(left: VertexId, right: VertexId, next: Option<SegmentId>) -> Self {
        Self {
            left,
            right,
            mid: Vector2::zeros(),
            a_in: 0.0,
            a_out: 0.0,
            a_cum: 0.0,
            next,
        }
    }

    fn apply(&mut self, sp: SegmentParams) {
        self.mid = sp.mid;
        self.a_in = sp.a_in;
        self.a_out = sp.a_out;
    }

    /// Hat area of this segment.
    #[inline]
    pub fn area(&self) -> f64 {
        self.a_in + self.a_out
    }
}

/// Result of [`Envelope::split`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// A new segment owns the right part.
    Split(SegmentId),
    /// Zero density at the split point: the support boundary moved inward.
    Chopped,
    /// Split point unusable (outside the segment or numerically degenerate);
    /// the store is unchanged.
    Ignored,
}

/// Read-only summary of one segment, in domain order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentInfo {
    pub x_left: f64,
    pub x_right: f64,
    pub a_in: f64,
    pub a_out: f64,
    pub a_cum: f64,
}

/// The hat polygon: ordered segments plus derived area totals.
#[derive(Clone, Debug)]
pub struct Envelope {
    vertices: Vec<Vertex>,
    segments: Vec<Segment>,
    head: SegmentId,
    a_total: f64,
    a_squeeze: f64,
    cfg: GeomCfg,
}

impl Envelope {
    /// Chain vertices (increasing `x`) into segments. Parameters stay unset
    /// until computed by the builder.
    pub(crate) fn from_vertices(vertices: Vec<Vertex>, cfg: GeomCfg) -> Result<Self, ArouError> {
        if vertices.len() < 2 {
            return Err(ArouError::condition(
                "need at least two construction points including the boundaries",
            ));
        }
        let n = vertices.len() - 1;
        let segments = (0..n)
            .map(|k| {
                let next = (k + 1 < n).then_some(SegmentId(k + 1));
                Segment::unset(VertexId(k), VertexId(k + 1), next)
            })
            .collect();
        Ok(Self {
            vertices,
            segments,
            head: SegmentId(0),
            a_total: 0.0,
            a_squeeze: 0.0,
            cfg,
        })
    }

    #[inline]
    pub fn cfg(&self) -> &GeomCfg {
        &self.cfg
    }

    #[inline]
    pub fn head(&self) -> SegmentId {
        self.head
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0]
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    #[inline]
    pub fn left_of(&self, id: SegmentId) -> &Vertex {
        self.vertex(self.segment(id).left)
    }

    #[inline]
    pub fn right_of(&self, id: SegmentId) -> &Vertex {
        self.vertex(self.segment(id).right)
    }

    /// `[x_left, x_right]` of a segment.
    #[inline]
    pub fn interval(&self, id: SegmentId) -> (f64, f64) {
        (self.left_of(id).x, self.right_of(id).x)
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Area below the hat (`Σ a_in + a_out`).
    #[inline]
    pub fn hat_area(&self) -> f64 {
        self.a_total
    }

    /// Area below the squeeze (`Σ a_in`).
    #[inline]
    pub fn squeeze_area(&self) -> f64 {
        self.a_squeeze
    }

    pub fn iter(&self) -> SegmentIter<'_> {
        SegmentIter {
            env: self,
            cur: Some(self.head),
        }
    }

    /// Segment ids in domain order (snapshot).
    pub fn ids(&self) -> Vec<SegmentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn infos(&self) -> Vec<SegmentInfo> {
        self.iter()
            .map(|(id, s)| {
                let (x_left, x_right) = self.interval(id);
                SegmentInfo {
                    x_left,
                    x_right,
                    a_in: s.a_in,
                    a_out: s.a_out,
                    a_cum: s.a_cum,
                }
            })
            .collect()
    }

    pub(crate) fn compute_params(&self, id: SegmentId) -> Result<SegmentParams, ParamFailure> {
        segment_params(self.left_of(id), self.right_of(id), &self.cfg)
    }

    pub(crate) fn set_params(&mut self, id: SegmentId, sp: SegmentParams) {
        self.segments[id.0].apply(sp);
    }

    /// Recompute `a_cum`, hat and squeeze totals from the segments.
    pub(crate) fn refresh_ledger(&mut self) {
        let mut a_cum = 0.0;
        let mut a_squeeze = 0.0;
        let mut cur = Some(self.head);
        while let Some(id) = cur {
            let seg = &mut self.segments[id.0];
            a_cum += seg.area();
            a_squeeze += seg.a_in;
            seg.a_cum = a_cum;
            cur = seg.next;
        }
        self.a_total = a_cum;
        self.a_squeeze = a_squeeze;
    }

    /// Insert `vertex` inside segment `id` without computing parameters.
    /// The new segment takes the right part and is returned.
    pub(crate) fn insert_vertex(&mut self, id: SegmentId, vertex: Vertex) -> SegmentId {
        let vid = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        let new_id = SegmentId(self.segments.len());
        let old = &self.segments[id.0];
        let new_seg = Segment::unset(vid, old.right, old.next);
        self.segments.push(new_seg);
        let old = &mut self.segments[id.0];
        old.right = vid;
        old.next = Some(new_id);
        new_id
    }

    /// The zero-density boundary vertex of `id` that a chop may move, right first.
    fn chop_target(&self, id: SegmentId) -> Option<VertexId> {
        let seg = self.segment(id);
        if self.vertex(seg.right).at_origin() {
            Some(seg.right)
        } else if self.vertex(seg.left).at_origin() {
            Some(seg.left)
        } else {
            None
        }
    }

    fn vanishes_inside(&self, id: SegmentId, x: f64) -> ArouError {
        let (xl, xr) = self.interval(id);
        ArouError::condition(format!(
            "PDF vanishes at {x} inside [{xl}, {xr}]: not unimodal"
        ))
    }

    /// Replace the zero-density end vertex of `id` by `vertex` (also at the origin).
    pub(crate) fn chop(&mut self, id: SegmentId, vertex: Vertex) -> Result<VertexId, ArouError> {
        let target = self
            .chop_target(id)
            .ok_or_else(|| self.vanishes_inside(id, vertex.x))?;
        debug_assert!(vertex.at_origin());
        self.vertices[target.0] = vertex;
        Ok(target)
    }

    /// Split segment `id` at `x` with `fx = f(x)`.
    ///
    /// Both halves are validated before anything is written: a failing half
    /// leaves the store untouched and yields `Ignored`, as does an `x` outside
    /// the segment. Negative or invalid `fx` inside the segment is an error. The ledger is refreshed on success; the caller
    /// rebuilds any guide table.
    pub fn split<D: Density + ?Sized>(
        &mut self,
        id: SegmentId,
        x: f64,
        fx: f64,
        density: &D,
    ) -> Result<SplitOutcome, ArouError> {
        let (xl, xr) = self.interval(id);
        if !(x > xl && x < xr) {
            return Ok(SplitOutcome::Ignored);
        }
        let vertex = make_vertex(x, fx, |x| density.dpdf(x))?;

        if vertex.at_origin() {
            let target = self
                .chop_target(id)
                .ok_or_else(|| self.vanishes_inside(id, x))?;
            let seg = self.segment(id);
            let (l, r) = if target == seg.right {
                (self.left_of(id), &vertex)
            } else {
                (&vertex, self.right_of(id))
            };
            return match segment_params(l, r, &self.cfg) {
                Ok(sp) => {
                    self.vertices[target.0] = vertex;
                    self.set_params(id, sp);
                    self.refresh_ledger();
                    Ok(SplitOutcome::Chopped)
                }
                Err(failure) => {
                    warn!(x, ?failure, "cannot chop segment at given point");
                    Ok(SplitOutcome::Ignored)
                }
            };
        }

        let left = segment_params(self.left_of(id), &vertex, &self.cfg);
        let right = segment_params(&vertex, self.right_of(id), &self.cfg);
        match (left, right) {
            (Ok(lp), Ok(rp)) => {
                let new_id = self.insert_vertex(id, vertex);
                self.set_params(id, lp);
                self.set_params(new_id, rp);
                self.refresh_ledger();
                Ok(SplitOutcome::Split(new_id))
            }
            (Err(failure), _) | (_, Err(failure)) => {
                warn!(x, ?failure, "cannot split segment at given point");
                Ok(SplitOutcome::Ignored)
            }
        }
    }

    /// Segment whose interval contains `x`.
    pub fn find(&self, x: f64) -> Option<SegmentId> {
        self.iter()
            .find(|(id, _)| {
                let (xl, xr) = self.interval(*id);
                x >= xl && x <= xr
            })
            .map(|(id, _)| id)
    }

    /// Hat at `x` on the density scale (`u²` of the polygon boundary); 0 outside.
    pub fn hat_value(&self, x: f64) -> f64 {
        match self.find(x) {
            Some(id) => {
                let u = self.hat_u_in(id, x);
                u * u
            }
            None => 0.0,
        }
    }

    /// Squeeze at `x` on the density scale; 0 outside.
    pub fn squeeze_value(&self, x: f64) -> f64 {
        match self.find(x) {
            Some(id) => {
                let u = self.squeeze_u_in(id, x);
                u * u
            }
            None => 0.0,
        }
    }

    pub(crate) fn hat_u_in(&self, id: SegmentId, x: f64) -> f64 {
        hat_u(
            x,
            self.left_of(id).p,
            self.segment(id).mid,
            self.right_of(id).p,
        )
    }

    pub(crate) fn squeeze_u_in(&self, id: SegmentId, x: f64) -> f64 {
        squeeze_u(x, self.left_of(id).p, self.right_of(id).p)
    }
}

/// Iterator over `(id, segment)` in domain order.
pub struct SegmentIter<'a> {
    env: &'a Envelope,
    cur: Option<SegmentId>,
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let seg = self.env.segment(id);
        self.cur = seg.next;
        Some((id, seg))
    }
}
