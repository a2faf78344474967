//! Multi-precision values (tiers 2 and up).
//!
//! Each value carries its own bit count; a binary operation runs at the larger
//! of the two and rounds its result in the requested direction. The number
//! itself is a `dashu_float::FBig`; the direction is chosen per call by
//! picking the rounding mode of the `Context` that performs the operation.

use dashu_float::round::mode::{Down, HalfEven, Up};
use dashu_float::{Context, FBig};

use super::round::{next_down, next_up, RoundMode};
use super::Value;

type Big = FBig<HalfEven>;

/// Run `Context::$op` on two reprs at `$bits` with the rounding of `$round`.
macro_rules! directed {
    ($round:expr, $bits:expr, $op:ident, $a:expr, $b:expr) => {{
        let prec = $bits as usize;
        match $round {
            RoundMode::Down => Context::<Down>::new(prec)
                .$op($a, $b)
                .value()
                .with_rounding::<HalfEven>(),
            RoundMode::Up => Context::<Up>::new(prec)
                .$op($a, $b)
                .value()
                .with_rounding::<HalfEven>(),
            RoundMode::Nearest => Context::<HalfEven>::new(prec).$op($a, $b).value(),
        }
    }};
}

/// A binary floating-point number with an explicit precision in bits.
#[derive(Clone, Debug)]
pub struct MValue {
    v: Big,
    bits: u32,
}

impl MValue {
    /// Exact lift of a finite double at `bits` of precision.
    pub fn new(x: f64, bits: u32) -> Self {
        let Ok(v) = Big::try_from(x) else {
            panic!("cannot lift non-finite {x}");
        };
        let v = v.with_precision(bits as usize).value();
        Self { v, bits }
    }

    /// The underlying big float.
    #[inline]
    pub fn big(&self) -> &FBig<HalfEven> {
        &self.v
    }

    fn binary(&self, b: &Self) -> u32 {
        self.bits.max(b.bits)
    }
}

impl Value for MValue {
    #[inline]
    fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    fn from_f64(x: f64, bits: u32) -> Self {
        Self::new(x, bits)
    }

    fn to_f64(&self, round: RoundMode) -> f64 {
        let near = self.v.to_f64().value();
        if near.is_infinite() {
            return match (round, near > 0.0) {
                (RoundMode::Down, true) => f64::MAX,
                (RoundMode::Up, false) => f64::MIN,
                _ => near,
            };
        }
        let Ok(back) = Big::try_from(near) else {
            return near;
        };
        match round {
            RoundMode::Down if back > self.v => next_down(near),
            RoundMode::Up if back < self.v => next_up(near),
            _ => near,
        }
    }

    fn plus(&self, b: &Self, round: RoundMode) -> Self {
        let bits = self.binary(b);
        let v = directed!(round, bits, add, self.v.repr(), b.v.repr());
        Self { v, bits }
    }

    fn minus(&self, b: &Self, round: RoundMode) -> Self {
        let bits = self.binary(b);
        let v = directed!(round, bits, sub, self.v.repr(), b.v.repr());
        Self { v, bits }
    }

    fn times(&self, b: &Self, round: RoundMode) -> Self {
        let bits = self.binary(b);
        let v = directed!(round, bits, mul, self.v.repr(), b.v.repr());
        Self { v, bits }
    }

    fn divide(&self, b: &Self, round: RoundMode) -> Self {
        let bits = self.binary(b);
        let v = directed!(round, bits, div, self.v.repr(), b.v.repr());
        Self { v, bits }
    }

    fn negated(&self) -> Self {
        Self {
            v: -self.v.clone(),
            bits: self.bits,
        }
    }

    fn sign(&self) -> i32 {
        if self.v.repr().is_zero() {
            0
        } else if self.v > Big::ZERO {
            1
        } else {
            -1
        }
    }

    #[inline]
    fn lt(&self, b: &Self) -> bool {
        self.v < b.v
    }
}
