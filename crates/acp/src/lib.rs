//! Adaptive-precision arithmetic for robust geometric predicates.
//!
//! Geometric code computes with [`Parameter`]s (certified intervals around
//! once-perturbed inputs) and asks signs through [`SignPredicate`]s. A sign
//! that cannot be certified at the current precision is retried with more
//! bits: the predicate's inputs in the [`DependencyGraph`] are promoted from
//! doubles to quad-doubles to multi-precision floats and recomputed, then
//! collapsed back. A wrong sign is never returned; when even the maximum
//! precision cannot decide, the caller gets
//! [`AcpError::AmbiguousAtMaxPrecision`].
//!
//! Modules
//! - `num`: value tiers with directed rounding, and `Interval<T>`.
//! - `param`: `Parameter`, perturbation, square root, thread-local context.
//! - `graph`: node arena, escalation driver, `sign_predicate!`.
//! - `geom`: planar points, orientation/ordering predicates, segments.
//!
//! Arithmetic state is thread-local; bracket work in a [`Session`].

pub mod error;
pub mod geom;
pub mod graph;
pub mod num;
pub mod param;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::AcpError;
pub use graph::{DependencyGraph, DependencyNode, NodeId, SignPredicate};
pub use param::{AcpCfg, Parameter, Session};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::AcpError;
    pub use crate::geom::{
        point, Ccw, InputPoint, LeftTurn, LineIntersection, LineSegment, Normal, Vector, XOrder,
        YOrder, PV2,
    };
    pub use crate::graph::{
        DependencyGraph, DependencyNode, EscalationStats, NodeId, ParameterSource, SignPredicate,
        Upstream,
    };
    pub use crate::param::{context, AcpCfg, Parameter, Session};
    pub use nalgebra::Vector2 as Vec2;
}
