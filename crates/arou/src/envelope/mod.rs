//! The hat/squeeze envelope in the ratio-of-uniforms plane.
//!
//! Purpose
//! - Hold the ordered segments of the hat polygon and their area ledger.
//! - Build it from construction points and refine it (DARS, online splits).
//!
//! The union of the segments covers the whole support in domain order, and
//! `a_cum` of the last segment equals the hat area.

mod build;
mod dars;
mod store;

pub use build::build_envelope;
pub(crate) use build::pdf_at;
pub(crate) use dars::run_dars;
pub use dars::DarsReport;
pub use store::{
    Envelope, Segment, SegmentId, SegmentInfo, SegmentIter, SplitOutcome, VertexId,
};
