//! Numeric tiers and interval arithmetic.
//!
//! Purpose
//! - One `Value` interface over three representations of increasing width:
//!   native `f64` (53 bits), quad-double `QValue` (212 bits), and
//!   arbitrary-bit `MValue`.
//! - `Interval<T>` builds conservative enclosures on top of the directed
//!   rounding each tier provides.
//!
//! Why this design
//! - The interval code is written once; a tier only has to round `+ - × ÷`
//!   in a requested direction and decide signs exactly.
//! - No hardware rounding-mode state is touched. Every tier certifies its
//!   own rounding direction, so arithmetic is reentrant and thread-safe.
//!
//! References
//! - J. R. Shewchuk, "Adaptive Precision Floating-Point Arithmetic and Fast
//!   Robust Geometric Predicates" (expansions, TwoSum/TwoProduct).
//! - R. E. Moore, "Interval Analysis" (sign-case multiplication and division).

use std::fmt::Debug;

mod interval;
mod multi;
mod quad;
pub mod round;

pub use interval::Interval;
pub use multi::MValue;
pub use quad::{QValue, QUAD_BITS};
pub use round::{RoundMode, DOUBLE_BITS};

/// A number at one precision tier with directed-rounding arithmetic.
///
/// Contract: an operation rounded `Down` never overestimates the exact
/// result, `Up` never underestimates it. `sign` and `lt` are exact.
/// Division by a zero value is the caller's responsibility.
pub trait Value: Clone + Debug {
    /// Precision in bits.
    fn bits(&self) -> u32;
    /// Exact lift of a finite double at `bits` of precision.
    fn from_f64(x: f64, bits: u32) -> Self;
    /// Nearest double in direction `round`.
    fn to_f64(&self, round: RoundMode) -> f64;
    fn plus(&self, b: &Self, round: RoundMode) -> Self;
    fn minus(&self, b: &Self, round: RoundMode) -> Self;
    fn times(&self, b: &Self, round: RoundMode) -> Self;
    fn divide(&self, b: &Self, round: RoundMode) -> Self;
    fn negated(&self) -> Self;
    /// -1, 0 or 1.
    fn sign(&self) -> i32;
    fn lt(&self, b: &Self) -> bool;
}

#[cfg(test)]
mod tests;
