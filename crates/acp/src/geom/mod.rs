//! Planar geometric primitives on top of the escalation protocol.
//!
//! Purpose
//! - Points as graph nodes (`InputPoint`, `Vector`, `Normal`,
//!   `LineIntersection`) and the predicates geometric algorithms branch on
//!   (`XOrder`, `YOrder`, `Ccw`, `LeftTurn`), each returning a certified sign.
//!
//! Usage
//! - Insert points into a `DependencyGraph`, then `eval`/`holds` a predicate
//!   against the same graph. Coordinates for display come from
//!   `point(&graph, id).mid()`.
//!
//! Code cross-refs: `graph::sign_predicate!`, `param::Parameter`.

mod point;
mod predicates;
mod pv2;

pub use point::{line_intersection, InputPoint, LineIntersection, Normal, Vector};
pub use predicates::{naive_intersects, Ccw, LeftTurn, LineSegment, XOrder, YOrder};
pub use pv2::{point, PV2};

#[cfg(test)]
mod tests;
