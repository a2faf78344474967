//! Orientation and ordering predicates, and segment intersection.

use crate::error::AcpError;
use crate::graph::{DependencyGraph, NodeId, SignPredicate};
use crate::sign_predicate;

use super::pv2::point;

sign_predicate! {
    /// Positive when `a.x < b.x`.
    pub struct XOrder { a, b }
    |g, p| (point(g, p.b).x() - point(g, p.a).x()).sign()
}

sign_predicate! {
    /// Positive when `a.y < b.y`.
    pub struct YOrder { a, b }
    |g, p| (point(g, p.b).y() - point(g, p.a).y()).sign()
}

sign_predicate! {
    /// Positive when vector `b` is counter-clockwise from vector `a`.
    pub struct Ccw { a, b }
    |g, p| point(g, p.a).cross(&point(g, p.b)).sign()
}

sign_predicate! {
    /// Positive when `a, b, c` turn left (counter-clockwise).
    pub struct LeftTurn { a, b, c }
    |g, p| {
        let b = point(g, p.b);
        (&point(g, p.c) - &b).cross(&(&point(g, p.a) - &b)).sign()
    }
}

/// Segment between two point nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSegment {
    pub p0: NodeId,
    pub p1: NodeId,
}

impl LineSegment {
    pub fn new(p0: NodeId, p1: NodeId) -> Self {
        Self { p0, p1 }
    }

    /// Proper crossing: each segment's endpoints lie strictly on opposite
    /// sides of the other's line.
    pub fn intersects(&self, g: &mut DependencyGraph, l: &LineSegment) -> Result<bool, AcpError> {
        Ok(LeftTurn::new(self.p0, l.p0, l.p1).eval(g)?
            != LeftTurn::new(self.p1, l.p0, l.p1).eval(g)?
            && LeftTurn::new(l.p0, self.p0, self.p1).eval(g)?
                != LeftTurn::new(l.p1, self.p0, self.p1).eval(g)?)
    }

    /// Both endpoints strictly left of point `b`.
    pub fn left_of(&self, g: &mut DependencyGraph, b: NodeId) -> Result<bool, AcpError> {
        Ok(XOrder::new(self.p0, b).holds(g)? && XOrder::new(self.p1, b).holds(g)?)
    }

    /// Both endpoints strictly below point `b`.
    pub fn below(&self, g: &mut DependencyGraph, b: NodeId) -> Result<bool, AcpError> {
        Ok(YOrder::new(self.p0, b).holds(g)? && YOrder::new(self.p1, b).holds(g)?)
    }
}

/// Whether `l` crosses any of `segments`, by testing each in turn.
pub fn naive_intersects(
    g: &mut DependencyGraph,
    segments: &[LineSegment],
    l: &LineSegment,
) -> Result<bool, AcpError> {
    for s in segments {
        if s.intersects(g, l)? {
            return Ok(true);
        }
    }
    Ok(false)
}
