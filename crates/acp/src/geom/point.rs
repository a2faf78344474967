//! Point nodes: inputs and the derived points built from them.

use crate::error::AcpError;
use crate::graph::{DependencyNode, NodeId, Upstream};
use crate::param::Parameter;

use super::pv2::{point, PV2};

/// A literal input point.
#[derive(Clone, Debug)]
pub struct InputPoint {
    p: PV2,
}

impl InputPoint {
    /// Perturbed coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { p: PV2::new(x, y) }
    }

    /// Exact coordinates (no perturbation).
    pub fn exact(x: f64, y: f64) -> Self {
        Self {
            p: PV2::constant(x, y),
        }
    }

    pub fn from_pv2(p: PV2) -> Self {
        Self { p }
    }
}

impl DependencyNode for InputPoint {
    fn dependencies(&self) -> &[NodeId] {
        &[]
    }
    fn parameters(&self) -> &[Parameter] {
        self.p.as_slice()
    }
    fn parameters_mut(&mut self) -> &mut [Parameter] {
        self.p.as_mut_slice()
    }
}

/// `h - t`.
#[derive(Clone, Debug)]
pub struct Vector {
    deps: [NodeId; 2],
    p: PV2,
}

impl Vector {
    pub fn new(t: NodeId, h: NodeId) -> Self {
        Self {
            deps: [t, h],
            p: PV2::default(),
        }
    }
}

impl DependencyNode for Vector {
    fn dependencies(&self) -> &[NodeId] {
        &self.deps
    }
    fn parameters(&self) -> &[Parameter] {
        self.p.as_slice()
    }
    fn parameters_mut(&mut self) -> &mut [Parameter] {
        self.p.as_mut_slice()
    }
    fn calculate(&mut self, up: Upstream<'_>) -> Result<(), AcpError> {
        let [t, h] = self.deps;
        self.p = &point(&up, h) - &point(&up, t);
        Ok(())
    }
}

/// `h - t` turned a quarter counter-clockwise.
#[derive(Clone, Debug)]
pub struct Normal {
    deps: [NodeId; 2],
    p: PV2,
}

impl Normal {
    pub fn new(t: NodeId, h: NodeId) -> Self {
        Self {
            deps: [t, h],
            p: PV2::default(),
        }
    }
}

impl DependencyNode for Normal {
    fn dependencies(&self) -> &[NodeId] {
        &self.deps
    }
    fn parameters(&self) -> &[Parameter] {
        self.p.as_slice()
    }
    fn parameters_mut(&mut self) -> &mut [Parameter] {
        self.p.as_mut_slice()
    }
    fn calculate(&mut self, up: Upstream<'_>) -> Result<(), AcpError> {
        let [t, h] = self.deps;
        self.p = (&point(&up, h) - &point(&up, t)).perp();
        Ok(())
    }
}

/// Intersection of line `ab` with line `cd`.
///
/// The lines must not be parallel; a near-parallel pair escalates, an exactly
/// parallel one fails with `AmbiguousAtMaxPrecision` on insert.
#[derive(Clone, Debug)]
pub struct LineIntersection {
    deps: [NodeId; 4],
    p: PV2,
}

impl LineIntersection {
    pub fn new(a: NodeId, b: NodeId, c: NodeId, d: NodeId) -> Self {
        Self {
            deps: [a, b, c, d],
            p: PV2::default(),
        }
    }
}

/// `a + k (b - a)` with `k = ((c - a) × (d - c)) / ((b - a) × (d - c))`.
pub fn line_intersection(a: &PV2, b: &PV2, c: &PV2, d: &PV2) -> Result<PV2, AcpError> {
    let u = b - a;
    let v = d - c;
    let k = (c - a).cross(&v).checked_div(&u.cross(&v))?;
    Ok(a + &u.scale(&k))
}

impl DependencyNode for LineIntersection {
    fn dependencies(&self) -> &[NodeId] {
        &self.deps
    }
    fn parameters(&self) -> &[Parameter] {
        self.p.as_slice()
    }
    fn parameters_mut(&mut self) -> &mut [Parameter] {
        self.p.as_mut_slice()
    }
    fn calculate(&mut self, up: Upstream<'_>) -> Result<(), AcpError> {
        let [a, b, c, d] = self.deps.map(|id| point(&up, id));
        self.p = line_intersection(&a, &b, &c, &d)?;
        Ok(())
    }
}
