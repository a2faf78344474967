//! `PV2`: a planar point or vector with `Parameter` coordinates.

use std::ops::{Add, Neg, Sub};

use nalgebra::Vector2;

use crate::graph::{NodeId, ParameterSource};
use crate::param::Parameter;

/// Coordinates `[x, y]`, stored as a slice so nodes can expose them directly.
#[derive(Clone, Debug, Default)]
pub struct PV2 {
    c: [Parameter; 2],
}

impl PV2 {
    /// Perturbed literal coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self::from_params(Parameter::new(x), Parameter::new(y))
    }

    /// Exact coordinates, never perturbed.
    pub fn constant(x: f64, y: f64) -> Self {
        Self::from_params(Parameter::constant(x), Parameter::constant(y))
    }

    #[inline]
    pub fn from_params(x: Parameter, y: Parameter) -> Self {
        Self { c: [x, y] }
    }

    /// First two parameters of `params`.
    pub fn from_slice(params: &[Parameter]) -> Self {
        Self::from_params(params[0].clone(), params[1].clone())
    }

    #[inline]
    pub fn x(&self) -> &Parameter {
        &self.c[0]
    }

    #[inline]
    pub fn y(&self) -> &Parameter {
        &self.c[1]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Parameter] {
        &self.c
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Parameter] {
        &mut self.c
    }

    /// `x₁ y₂ − y₁ x₂`.
    pub fn cross(&self, b: &PV2) -> Parameter {
        self.x() * b.y() - self.y() * b.x()
    }

    pub fn dot(&self, b: &PV2) -> Parameter {
        self.x() * b.x() + self.y() * b.y()
    }

    pub fn scale(&self, k: &Parameter) -> PV2 {
        PV2::from_params(self.x() * k, self.y() * k)
    }

    /// `(−y, x)`: rotation by a quarter turn counter-clockwise.
    pub fn perp(&self) -> PV2 {
        PV2::from_params(-self.y(), self.x().clone())
    }

    /// Approximate coordinates for display.
    #[inline]
    pub fn mid(&self) -> Vector2<f64> {
        Vector2::new(self.x().mid(), self.y().mid())
    }
}

/// Coordinates of node `id` (its first two parameters).
#[inline]
pub fn point<S: ParameterSource + ?Sized>(src: &S, id: NodeId) -> PV2 {
    PV2::from_slice(src.parameters(id))
}

impl Add for &PV2 {
    type Output = PV2;
    fn add(self, b: &PV2) -> PV2 {
        PV2::from_params(self.x() + b.x(), self.y() + b.y())
    }
}

impl Sub for &PV2 {
    type Output = PV2;
    fn sub(self, b: &PV2) -> PV2 {
        PV2::from_params(self.x() - b.x(), self.y() - b.y())
    }
}

impl Neg for &PV2 {
    type Output = PV2;
    fn neg(self) -> PV2 {
        PV2::from_params(-self.x(), -self.y())
    }
}

impl Add for PV2 {
    type Output = PV2;
    fn add(self, b: PV2) -> PV2 {
        &self + &b
    }
}

impl Sub for PV2 {
    type Output = PV2;
    fn sub(self, b: PV2) -> PV2 {
        &self - &b
    }
}
