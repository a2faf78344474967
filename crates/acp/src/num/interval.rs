//! Closed intervals `[lo, hi]` over one value tier.
//!
//! Every operation rounds its lower bound down and its upper bound up, so the
//! result contains `op(x, y)` for all `x`, `y` in the operands. Multiplication
//! and division dispatch on operand signs and only evaluate the corner
//! products that can bound the result.

use super::round::RoundMode::{Down, Nearest, Up};
use super::Value;

#[derive(Clone, Copy, Debug)]
pub struct Interval<T> {
    lo: T,
    hi: T,
}

#[inline]
fn min_of<T: Value>(a: T, b: T) -> T {
    if b.lt(&a) {
        b
    } else {
        a
    }
}

#[inline]
fn max_of<T: Value>(a: T, b: T) -> T {
    if a.lt(&b) {
        b
    } else {
        a
    }
}

impl<T: Value> Interval<T> {
    /// `lo <= hi` is the caller's job.
    #[inline]
    pub fn new(lo: T, hi: T) -> Self {
        debug_assert!(!hi.lt(&lo), "inverted interval {lo:?} > {hi:?}");
        Self { lo, hi }
    }

    /// Degenerate interval `[x, x]` at `bits` of precision.
    #[inline]
    pub fn point(x: f64, bits: u32) -> Self {
        let v = T::from_f64(x, bits);
        Self {
            lo: v.clone(),
            hi: v,
        }
    }

    /// `[lo, hi]` lifted from doubles at `bits` of precision.
    #[inline]
    pub fn from_f64(lo: f64, hi: f64, bits: u32) -> Self {
        Self::new(T::from_f64(lo, bits), T::from_f64(hi, bits))
    }

    #[inline]
    pub fn lo(&self) -> &T {
        &self.lo
    }

    #[inline]
    pub fn hi(&self) -> &T {
        &self.hi
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.lo.bits()
    }

    /// Largest double not above the interval.
    #[inline]
    pub fn lb(&self) -> f64 {
        self.lo.to_f64(Down)
    }

    /// Smallest double not below the interval.
    #[inline]
    pub fn ub(&self) -> f64 {
        self.hi.to_f64(Up)
    }

    /// Approximate midpoint at this tier, inside `[lo, hi]`.
    pub fn mid_value(&self) -> T {
        let two = T::from_f64(2.0, self.bits());
        let m = self
            .lo
            .divide(&two, Nearest)
            .plus(&self.hi.divide(&two, Nearest), Nearest);
        if m.lt(&self.lo) {
            self.lo.clone()
        } else if self.hi.lt(&m) {
            self.hi.clone()
        } else {
            m
        }
    }

    /// Approximate midpoint as a double.
    #[inline]
    pub fn mid(&self) -> f64 {
        self.mid_value().to_f64(Nearest)
    }

    /// Upper bound on `hi - lo`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.hi.minus(&self.lo, Up).to_f64(Up)
    }

    /// 1 if the interval is positive, -1 if negative, 0 if it touches zero.
    #[inline]
    pub fn sign(&self) -> i32 {
        if self.lo.sign() > 0 {
            1
        } else if self.hi.sign() < 0 {
            -1
        } else {
            0
        }
    }

    pub fn plus(&self, b: &Self) -> Self {
        Self::new(self.lo.plus(&b.lo, Down), self.hi.plus(&b.hi, Up))
    }

    pub fn plus_f64(&self, b: f64) -> Self {
        self.plus(&Self::point(b, self.bits()))
    }

    pub fn minus(&self, b: &Self) -> Self {
        Self::new(self.lo.minus(&b.hi, Down), self.hi.minus(&b.lo, Up))
    }

    pub fn negated(&self) -> Self {
        Self::new(self.hi.negated(), self.lo.negated())
    }

    pub fn times(&self, b: &Self) -> Self {
        if self.hi.sign() < 0 {
            return self.negated().times(&b.negated());
        }
        let (sl, su, tl, tu) = (&self.lo, &self.hi, &b.lo, &b.hi);
        if sl.sign() >= 0 {
            if tl.sign() >= 0 {
                Self::new(sl.times(tl, Down), su.times(tu, Up))
            } else if tu.sign() <= 0 {
                Self::new(su.times(tl, Down), sl.times(tu, Up))
            } else {
                Self::new(su.times(tl, Down), su.times(tu, Up))
            }
        } else if tl.sign() >= 0 {
            Self::new(sl.times(tu, Down), su.times(tu, Up))
        } else if tu.sign() <= 0 {
            Self::new(su.times(tl, Down), sl.times(tl, Up))
        } else {
            Self::new(
                min_of(sl.times(tu, Down), su.times(tl, Down)),
                max_of(sl.times(tl, Up), su.times(tu, Up)),
            )
        }
    }

    pub fn times_f64(&self, b: f64) -> Self {
        self.times(&Self::point(b, self.bits()))
    }

    /// Divide by an interval of definite sign (asserted).
    pub fn divide(&self, b: &Self) -> Self {
        let bs = b.sign();
        assert!(bs != 0, "divisor interval straddles zero");
        let (al, au, bl, bu) = (&self.lo, &self.hi, &b.lo, &b.hi);
        if bs > 0 {
            if al.sign() >= 0 {
                Self::new(al.divide(bu, Down), au.divide(bl, Up))
            } else if au.sign() <= 0 {
                Self::new(al.divide(bl, Down), au.divide(bu, Up))
            } else {
                Self::new(al.divide(bl, Down), au.divide(bl, Up))
            }
        } else if al.sign() >= 0 {
            Self::new(au.divide(bu, Down), al.divide(bl, Up))
        } else if au.sign() <= 0 {
            Self::new(au.divide(bl, Down), al.divide(bu, Up))
        } else {
            Self::new(au.divide(bu, Down), al.divide(bu, Up))
        }
    }

    pub fn divide_f64(&self, b: f64) -> Self {
        assert!(b != 0.0, "division by constant zero");
        self.divide(&Self::point(b, self.bits()))
    }

    /// Strict containment: `b.lo < lo` and `hi < b.hi`.
    #[inline]
    pub fn subset(&self, b: &Self) -> bool {
        b.lo.lt(&self.lo) && self.hi.lt(&b.hi)
    }

    /// Smallest interval containing both.
    pub fn hull(&self, b: &Self) -> Self {
        Self::new(
            min_of(self.lo.clone(), b.lo.clone()),
            max_of(self.hi.clone(), b.hi.clone()),
        )
    }

    /// `[self.lo, b.hi]`.
    pub fn span(&self, b: &Self) -> Self {
        Self::new(self.lo.clone(), b.hi.clone())
    }

    /// Common part of two enclosures of the same quantity.
    pub fn intersect(&self, b: &Self) -> Self {
        assert!(
            !(self.hi.lt(&b.lo) || b.hi.lt(&self.lo)),
            "intersecting disjoint intervals {self:?} and {b:?}"
        );
        Self::new(
            max_of(self.lo.clone(), b.lo.clone()),
            min_of(self.hi.clone(), b.hi.clone()),
        )
    }
}
