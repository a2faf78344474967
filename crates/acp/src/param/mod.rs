//! `Parameter`: the interval-valued number geometric code computes with.
//!
//! Purpose
//! - Certified enclosure `[lo, hi]` of a once-perturbed real number, with
//!   ordinary-looking arithmetic (`+ - * /`, unary `-`, constants on either
//!   side) and a sign query that refuses to guess.
//!
//! Why this design
//! - Tier 0 lives inline; tiers 1 and up sit behind an `Rc`, so cloning a
//!   parameter is a refcount bump and the bounds are freed with the last clone.
//! - The tier is the enum tag. No bound value is reserved as a marker.
//! - Perturbation puts literal inputs in general position, so exactly
//!   degenerate inputs still get definite signs after a few escalations.
//!
//! Mixed-tier operands are a programming error and panic. Escalation changes
//! the tier of every parameter a predicate depends on at once (see `graph`).

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use crate::error::AcpError;
use crate::num::{Interval, MValue, QValue, DOUBLE_BITS, QUAD_BITS};

pub mod context;
mod sqrt;

pub use context::{AcpCfg, Session};

#[derive(Clone, Debug)]
enum Repr {
    Double(Interval<f64>),
    Quad(Rc<Interval<QValue>>),
    Multi(Rc<Interval<MValue>>),
}

/// Evaluate `$body` on whichever interval `$p` holds.
macro_rules! on_tier {
    ($p:expr, |$i:ident| $body:expr) => {
        match &$p.repr {
            Repr::Double($i) => $body,
            Repr::Quad($i) => $body,
            Repr::Multi($i) => $body,
        }
    };
}

/// Build a new interval at the tier of `$p`.
macro_rules! map_tier {
    ($p:expr, |$i:ident| $body:expr) => {
        match &$p.repr {
            Repr::Double($i) => Repr::Double($body),
            Repr::Quad($i) => Repr::Quad(Rc::new($body)),
            Repr::Multi($i) => Repr::Multi(Rc::new($body)),
        }
    };
}

/// Combine two same-tier intervals; mixed tiers panic.
macro_rules! zip_tier {
    ($a:expr, $b:expr, |$x:ident, $y:ident| $body:expr) => {
        match (&$a.repr, &$b.repr) {
            (Repr::Double($x), Repr::Double($y)) => Repr::Double($body),
            (Repr::Quad($x), Repr::Quad($y)) => Repr::Quad(Rc::new($body)),
            (Repr::Multi($x), Repr::Multi($y)) => Repr::Multi(Rc::new($body)),
            _ => panic!(
                "mixed-tier operands ({} and {} bits)",
                $a.bits(),
                $b.bits()
            ),
        }
    };
}

#[derive(Clone, Debug)]
pub struct Parameter {
    repr: Repr,
    initialized: bool,
}

impl Default for Parameter {
    /// The uninitialized `[0, 0]`.
    fn default() -> Self {
        Self {
            repr: Repr::Double(Interval::point(0.0, DOUBLE_BITS)),
            initialized: false,
        }
    }
}

impl Parameter {
    #[inline]
    fn from_repr(repr: Repr) -> Self {
        Self {
            repr,
            initialized: true,
        }
    }

    /// Perturbed literal: `x + delta * (1 + |x|) * U(-1, 1)`, a tier-0 point.
    pub fn new(x: f64) -> Self {
        assert!(x.is_finite(), "non-finite input {x}");
        let v = x + context::jitter() * (1.0 + x.abs());
        Self::from_repr(Repr::Double(Interval::point(v, DOUBLE_BITS)))
    }

    /// Exact constant, never perturbed.
    pub fn constant(x: f64) -> Self {
        assert!(x.is_finite(), "non-finite constant {x}");
        Self::from_repr(Repr::Double(Interval::point(x, DOUBLE_BITS)))
    }

    /// Tier-0 interval `[lo, hi]`.
    pub fn from_bounds(lo: f64, hi: f64) -> Self {
        assert!(lo <= hi, "inverted bounds [{lo}, {hi}]");
        Self::from_repr(Repr::Double(Interval::new(lo, hi)))
    }

    /// True only for a default-constructed parameter never assigned a value.
    #[inline]
    pub fn is_uninitialized(&self) -> bool {
        !self.initialized
    }

    /// Precision of the current tier in bits.
    #[inline]
    pub fn bits(&self) -> u32 {
        on_tier!(self, |i| i.bits())
    }

    /// Lower bound as a double (informational).
    #[inline]
    pub fn lb(&self) -> f64 {
        on_tier!(self, |i| i.lb())
    }

    /// Upper bound as a double (informational).
    #[inline]
    pub fn ub(&self) -> f64 {
        on_tier!(self, |i| i.ub())
    }

    /// Midpoint as a double, for display only.
    #[inline]
    pub fn mid(&self) -> f64 {
        0.5 * self.lb() + 0.5 * self.ub()
    }

    #[inline]
    pub fn width(&self) -> f64 {
        on_tier!(self, |i| i.width())
    }

    /// Degenerate interval at the approximate midpoint, same tier.
    pub fn mid_point(&self) -> Parameter {
        Self::from_repr(map_tier!(self, |i| {
            let m = i.mid_value();
            Interval::new(m.clone(), m)
        }))
    }

    /// `x` as an exact point at this parameter's tier.
    pub fn lift(&self, x: f64) -> Parameter {
        Self::from_repr(map_tier!(self, |i| Interval::point(x, i.bits())))
    }

    /// `[lo, hi]` at this parameter's tier.
    pub(crate) fn lift_bounds(&self, lo: f64, hi: f64) -> Parameter {
        Self::from_repr(map_tier!(self, |i| Interval::from_f64(lo, hi, i.bits())))
    }

    /// Certified sign, or an ambiguity error when the interval touches zero.
    pub fn sign(&self) -> Result<i32, AcpError> {
        match on_tier!(self, |i| i.sign()) {
            0 => Err(self.ambiguity()),
            s => Ok(s),
        }
    }

    /// Sign with 0 standing for "ambiguous".
    #[inline]
    pub fn sign_or_zero(&self) -> i32 {
        on_tier!(self, |i| i.sign())
    }

    fn ambiguity(&self) -> AcpError {
        let bits = self.bits();
        if bits >= context::config().max_precision {
            AcpError::AmbiguousAtMaxPrecision { bits }
        } else {
            AcpError::AmbiguousSign { bits }
        }
    }

    /// Sign of `self - b`.
    pub fn compare(&self, b: &Parameter) -> Result<i32, AcpError> {
        (self - b).sign()
    }

    pub fn lt(&self, b: &Parameter) -> Result<bool, AcpError> {
        Ok(self.compare(b)? < 0)
    }

    pub fn gt(&self, b: &Parameter) -> Result<bool, AcpError> {
        Ok(self.compare(b)? > 0)
    }

    pub fn abs(&self) -> Result<Parameter, AcpError> {
        Ok(if self.sign()? < 0 {
            -self
        } else {
            self.clone()
        })
    }

    /// Division with the divisor's sign certified first.
    pub fn checked_div(&self, b: &Parameter) -> Result<Parameter, AcpError> {
        b.sign()?;
        Ok(Self::from_repr(zip_tier!(self, b, |x, y| x.divide(y))))
    }

    /// Strict containment in `b`.
    pub fn subset(&self, b: &Parameter) -> bool {
        match (&self.repr, &b.repr) {
            (Repr::Double(x), Repr::Double(y)) => x.subset(y),
            (Repr::Quad(x), Repr::Quad(y)) => x.subset(y),
            (Repr::Multi(x), Repr::Multi(y)) => x.subset(y),
            _ => panic!("mixed-tier operands ({} and {} bits)", self.bits(), b.bits()),
        }
    }

    /// Common part of two enclosures of the same quantity.
    pub fn intersect(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.intersect(y)))
    }

    pub fn hull(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.hull(y)))
    }

    /// `[self.lo, b.hi]`.
    pub fn span(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.span(y)))
    }

    /// Move to the current escalation ceiling, starting from the double
    /// bounds. No-op when already there.
    pub fn increase_precision(&mut self) {
        let ceiling = context::ceiling();
        if self.bits() >= ceiling {
            return;
        }
        debug_assert!(context::is_enabled(), "escalation outside a session");
        let (lo, hi) = (self.lb(), self.ub());
        self.repr = if ceiling <= QUAD_BITS {
            Repr::Quad(Rc::new(Interval::from_f64(lo, hi, QUAD_BITS)))
        } else {
            Repr::Multi(Rc::new(Interval::from_f64(lo, hi, ceiling)))
        };
    }

    /// Collapse to tier 0 by exporting the double bounds.
    pub fn decrease_precision(&mut self) {
        if matches!(self.repr, Repr::Double(_)) {
            return;
        }
        let (lo, hi) = (self.lb(), self.ub());
        self.repr = Repr::Double(Interval::new(lo, hi));
    }

    /// Clones sharing this parameter's boxed interval (`None` at tier 0).
    pub(crate) fn shared_count(&self) -> Option<usize> {
        match &self.repr {
            Repr::Double(_) => None,
            Repr::Quad(rc) => Some(Rc::strong_count(rc)),
            Repr::Multi(rc) => Some(Rc::strong_count(rc)),
        }
    }

    fn plus(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.plus(y)))
    }

    fn minus(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.minus(y)))
    }

    fn times(&self, b: &Parameter) -> Parameter {
        Self::from_repr(zip_tier!(self, b, |x, y| x.times(y)))
    }

    fn divide(&self, b: &Parameter) -> Parameter {
        match self.checked_div(b) {
            Ok(q) => q,
            Err(e) => panic!("divisor sign not certified ({e}); use checked_div"),
        }
    }

    fn negated(&self) -> Parameter {
        Self::from_repr(map_tier!(self, |i| i.negated()))
    }

    fn plus_f64(&self, b: f64) -> Parameter {
        Self::from_repr(map_tier!(self, |i| i.plus_f64(b)))
    }

    fn times_f64(&self, b: f64) -> Parameter {
        Self::from_repr(map_tier!(self, |i| i.times_f64(b)))
    }

    fn divide_f64(&self, b: f64) -> Parameter {
        Self::from_repr(map_tier!(self, |i| i.divide_f64(b)))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:e}, {:e}]@{}", self.lb(), self.ub(), self.bits())
    }
}

impl Neg for &Parameter {
    type Output = Parameter;
    fn neg(self) -> Parameter {
        self.negated()
    }
}

impl Neg for Parameter {
    type Output = Parameter;
    fn neg(self) -> Parameter {
        self.negated()
    }
}

/// Owned/borrowed combinations forward to the `&Parameter op &Parameter` core.
macro_rules! binop {
    ($Tr:ident, $m:ident, $core:ident, |$p:ident, $c:ident| $with_f64:expr, |$c2:ident, $q:ident| $f64_with:expr) => {
        impl $Tr<&Parameter> for &Parameter {
            type Output = Parameter;
            fn $m(self, b: &Parameter) -> Parameter {
                self.$core(b)
            }
        }
        impl $Tr<Parameter> for Parameter {
            type Output = Parameter;
            fn $m(self, b: Parameter) -> Parameter {
                self.$core(&b)
            }
        }
        impl $Tr<&Parameter> for Parameter {
            type Output = Parameter;
            fn $m(self, b: &Parameter) -> Parameter {
                self.$core(b)
            }
        }
        impl $Tr<Parameter> for &Parameter {
            type Output = Parameter;
            fn $m(self, b: Parameter) -> Parameter {
                self.$core(&b)
            }
        }
        impl $Tr<f64> for &Parameter {
            type Output = Parameter;
            fn $m(self, $c: f64) -> Parameter {
                let $p = self;
                $with_f64
            }
        }
        impl $Tr<f64> for Parameter {
            type Output = Parameter;
            fn $m(self, $c: f64) -> Parameter {
                let $p = &self;
                $with_f64
            }
        }
        impl $Tr<&Parameter> for f64 {
            type Output = Parameter;
            fn $m(self, $q: &Parameter) -> Parameter {
                let $c2 = self;
                $f64_with
            }
        }
        impl $Tr<Parameter> for f64 {
            type Output = Parameter;
            fn $m(self, $q: Parameter) -> Parameter {
                let $c2 = self;
                let $q = &$q;
                $f64_with
            }
        }
    };
}

binop!(Add, add, plus, |p, c| p.plus_f64(c), |c, q| q.plus_f64(c));
binop!(Sub, sub, minus, |p, c| p.plus_f64(-c), |c, q| q.negated().plus_f64(c));
binop!(Mul, mul, times, |p, c| p.times_f64(c), |c, q| q.times_f64(c));
binop!(Div, div, divide, |p, c| p.divide_f64(c), |c, q| q.lift(c).divide(q));
