//! Automatic ratio-of-uniforms sampling for T-concave densities.
//!
//! The region `{(v, u) : 0 < u ≤ √f(v/u)}` of a T-concave density is convex.
//! A polygonal hat built from tangents at construction points covers it, and
//! the secants through neighbouring touch points form a squeeze inside it.
//! Uniform points in the hat give `x = v/u` distributed with density `f`
//! after rejection.
//!
//! Layout
//! - `geom`: touch points, tangents and per-segment areas (pure functions).
//! - `envelope`: segment store, construction, DARS refinement and splitting.
//! - `guide`: guide table for segment selection.
//! - `sampler`: the generator [`Arou`].

pub mod density;
pub mod envelope;
pub mod error;
pub mod geom;
pub mod guide;
pub mod options;
pub mod sampler;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use density::{Density, FnDensity, FnDensityBuilder};
pub use error::ArouError;
pub use geom::GeomCfg;
pub use options::ArouOptions;
pub use sampler::{Arou, Status};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::density::{Density, FnDensity};
    pub use crate::envelope::{DarsReport, SegmentInfo};
    pub use crate::error::ArouError;
    pub use crate::options::ArouOptions;
    pub use crate::sampler::{Arou, Status};
}
