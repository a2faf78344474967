//! Error type for sign decisions, graph construction and configuration.
//!
//! Only sign certification and configuration are fallible. Programming errors
//! (mixed tiers, dividing by an ambiguous interval through `/`, square root of
//! a non-positive value) panic instead.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcpError {
    /// The sign could not be certified at `bits`; more precision may help.
    AmbiguousSign { bits: u32 },
    /// Still ambiguous at the configured maximum precision: a true
    /// degeneracy or a modeling defect. The caller decides what to do.
    AmbiguousAtMaxPrecision { bits: u32 },
    /// A node referenced a dependency that is not in the graph.
    UnknownNode { id: usize, len: usize },
    InvalidConfig { reason: String },
}

impl AcpError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// True for the one condition an escalation round can resolve.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AmbiguousSign { .. })
    }
}

impl fmt::Display for AcpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousSign { bits } => write!(f, "sign is ambiguous at {bits} bits"),
            Self::AmbiguousAtMaxPrecision { bits } => write!(
                f,
                "sign is still ambiguous at the maximum precision of {bits} bits (degenerate input?)"
            ),
            Self::UnknownNode { id, len } => {
                write!(f, "node {id} is not in the graph (it holds {len} nodes)")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for AcpError {}
