//! Error type shared by envelope construction, refinement and sampling.

use std::fmt;

/// Errors reported while building or refining a generator.
///
/// - `DistributionRequirement`: the density lacks something the method needs
///   (pdf or derivative missing, invalid domain or center).
/// - `GenCondition`: the envelope is geometrically inconsistent, typically
///   because the density is not T-concave or not unimodal.
/// - `GenData`: a density value is invalid (negative, NaN or overflowing).
/// - `InvalidOptions`: a configuration value is out of range.
#[derive(Clone, Debug, PartialEq)]
pub enum ArouError {
    DistributionRequirement { reason: String },
    GenCondition { reason: String },
    GenData { reason: String },
    InvalidOptions { reason: String },
}

impl ArouError {
    pub(crate) fn requirement(reason: impl Into<String>) -> Self {
        Self::DistributionRequirement {
            reason: reason.into(),
        }
    }

    pub(crate) fn condition(reason: impl Into<String>) -> Self {
        Self::GenCondition {
            reason: reason.into(),
        }
    }

    pub(crate) fn data(reason: impl Into<String>) -> Self {
        Self::GenData {
            reason: reason.into(),
        }
    }

    pub(crate) fn options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }

    /// True for `GenCondition`.
    pub fn is_condition(&self) -> bool {
        matches!(self, Self::GenCondition { .. })
    }
}

impl fmt::Display for ArouError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DistributionRequirement { reason } => {
                write!(f, "distribution requirement not met: {reason}")
            }
            Self::GenCondition { reason } => write!(f, "condition for method violated: {reason}"),
            Self::GenData { reason } => write!(f, "invalid density data: {reason}"),
            Self::InvalidOptions { reason } => write!(f, "invalid options: {reason}"),
        }
    }
}

impl std::error::Error for ArouError {}
