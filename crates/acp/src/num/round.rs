//! Directed rounding for native doubles (tier 0).
//!
//! Purpose
//! - Round `+ - × ÷` of two doubles down, up, or to nearest without touching
//!   the hardware rounding mode.
//!
//! How
//! - Compute the nearest result, recover the exact error term with an
//!   error-free transformation (TwoSum, FMA residual, FMA remainder), then move
//!   the result by one ulp when the error points the wrong way.
//! - Near the underflow range the residual is no longer exact; there we widen
//!   by one ulp unconditionally, which is still conservative.
//!
//! Code cross-refs: `quad::QValue` builds its expansions on `two_sum`/`two_prod`.

use super::Value;

/// Rounding direction of a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundMode {
    /// Toward −∞: never overestimates.
    Down,
    /// To nearest (display and midpoints only).
    Nearest,
    /// Toward +∞: never underestimates.
    Up,
}

/// Bit width of a native double.
pub const DOUBLE_BITS: u32 = 53;

/// Below this magnitude products and quotients may lose residual exactness.
pub(crate) const TINY: f64 = 1.0e-290;

/// Smallest double strictly greater than `x`.
#[inline]
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest double strictly less than `x`.
#[inline]
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

/// Knuth's TwoSum: `a + b == s + e` exactly.
#[inline]
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// TwoProduct via FMA: `a * b == p + e` exactly (barring underflow).
#[inline]
pub(crate) fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

/// Move the nearest result `s` one ulp in `round` direction if the exact
/// remainder `err` (true = s + err, in sign) demands it.
#[inline]
fn adjust(s: f64, err: f64, round: RoundMode) -> f64 {
    if s.is_infinite() {
        return match (round, s > 0.0) {
            (RoundMode::Down, true) => f64::MAX,
            (RoundMode::Up, false) => f64::MIN,
            _ => s,
        };
    }
    match round {
        RoundMode::Nearest => s,
        RoundMode::Down if err < 0.0 => next_down(s),
        RoundMode::Up if err > 0.0 => next_up(s),
        _ => s,
    }
}

/// Widen by one ulp regardless of the residual (underflow fallback).
#[inline]
fn widen(s: f64, round: RoundMode) -> f64 {
    match round {
        RoundMode::Nearest => s,
        RoundMode::Down => next_down(s),
        RoundMode::Up => next_up(s),
    }
}

/// `a + b` rounded in direction `round`.
#[inline]
pub fn add(a: f64, b: f64, round: RoundMode) -> f64 {
    let (s, e) = two_sum(a, b);
    adjust(s, e, round)
}

/// `a - b` rounded in direction `round`.
#[inline]
pub fn sub(a: f64, b: f64, round: RoundMode) -> f64 {
    add(a, -b, round)
}

/// `a * b` rounded in direction `round`.
#[inline]
pub fn mul(a: f64, b: f64, round: RoundMode) -> f64 {
    let (p, e) = two_prod(a, b);
    if p != 0.0 && p.abs() < TINY {
        return widen(p, round);
    }
    if p == 0.0 && a != 0.0 && b != 0.0 {
        // Total underflow: the true product is a nonzero value of sign(a*b).
        let positive = (a > 0.0) == (b > 0.0);
        return match (round, positive) {
            (RoundMode::Up, true) => next_up(0.0),
            (RoundMode::Down, false) => next_down(0.0),
            _ => 0.0,
        };
    }
    adjust(p, e, round)
}

/// `a / b` rounded in direction `round`. `b != 0` is the caller's job.
#[inline]
pub fn div(a: f64, b: f64, round: RoundMode) -> f64 {
    let q = a / b;
    if q.is_infinite() {
        return adjust(q, 0.0, round);
    }
    if a != 0.0 && (q.abs() < TINY || a.abs() < TINY) {
        return widen(q, round);
    }
    // r = a - q*b exactly; true quotient = q + r/b.
    let r = -q.mul_add(b, -a);
    let err = if (r > 0.0) == (b > 0.0) { r.abs() } else { -r.abs() };
    adjust(q, err, round)
}

impl Value for f64 {
    #[inline]
    fn bits(&self) -> u32 {
        DOUBLE_BITS
    }
    #[inline]
    fn from_f64(x: f64, _bits: u32) -> Self {
        x
    }
    #[inline]
    fn to_f64(&self, _round: RoundMode) -> f64 {
        *self
    }
    #[inline]
    fn plus(&self, b: &Self, round: RoundMode) -> Self {
        add(*self, *b, round)
    }
    #[inline]
    fn minus(&self, b: &Self, round: RoundMode) -> Self {
        sub(*self, *b, round)
    }
    #[inline]
    fn times(&self, b: &Self, round: RoundMode) -> Self {
        mul(*self, *b, round)
    }
    #[inline]
    fn divide(&self, b: &Self, round: RoundMode) -> Self {
        div(*self, *b, round)
    }
    #[inline]
    fn negated(&self) -> Self {
        -*self
    }
    #[inline]
    fn sign(&self) -> i32 {
        if *self > 0.0 {
            1
        } else if *self < 0.0 {
            -1
        } else {
            0
        }
    }
    #[inline]
    fn lt(&self, b: &Self) -> bool {
        *self < *b
    }
}
