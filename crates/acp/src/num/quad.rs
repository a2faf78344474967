//! Quad-double values (tier 1, 212 bits).
//!
//! Purpose
//! - Provide the first escalation tier: four doubles whose exact sum is the
//!   value, with `+ - × ÷` rounded down, up, or to nearest.
//!
//! How
//! - Work on floating-point expansions (Shewchuk): `+ - ×` are formed exactly
//!   with TwoSum/TwoProduct, then compressed and cut back to four components.
//!   The three leading components are kept; everything below them is rounded
//!   to one double whose direction is certified by an exact sign test.
//! - `÷` runs four steps of long division, then adds a directed double bound
//!   of `remainder / divisor` taken over the corners of their double bounds.
//! - A TwoProduct residual is exact only above `TINY`. Products below it are
//!   counted, and the result is pushed outward by `RESIDUAL_SLACK` per count,
//!   which bounds the residual's rounding error. Overflow saturates to `±∞` in
//!   the rounding direction.
//!
//! Expansion invariant: components in increasing magnitude, nonoverlapping,
//! no zeros; the sign of an expansion is the sign of its last component.

use super::round::{div as div_f64, next_down, next_up, two_prod, two_sum, RoundMode, TINY};
use super::Value;

/// Bit width of a quad-double value.
pub const QUAD_BITS: u32 = 212;

/// Rounding error bound of one FMA residual for a product below `TINY`
/// (`2^-1070`; the residual is below `2^-1016`).
fn residual_slack() -> f64 {
    f64::MIN_POSITIVE * 2f64.powi(-48)
}

/// Add one double to an expansion (grow-expansion with zero elimination).
fn grow(e: &[f64], b: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(e.len() + 1);
    let mut q = b;
    for &x in e {
        let (s, h) = two_sum(q, x);
        if h != 0.0 {
            out.push(h);
        }
        q = s;
    }
    if q != 0.0 {
        out.push(q);
    }
    out
}

/// Exact sum of two expansions.
fn sum(e: &[f64], f: &[f64]) -> Vec<f64> {
    f.iter().fold(e.to_vec(), |acc, &x| grow(&acc, x))
}

/// Exact sum of arbitrary doubles, as an expansion.
fn from_terms<I: IntoIterator<Item = f64>>(terms: I) -> Vec<f64> {
    terms.into_iter().fold(Vec::new(), |acc, x| grow(&acc, x))
}

/// TwoProduct terms of a sum of products, with the number of products whose
/// residual may have been rounded.
#[derive(Default)]
struct Products {
    terms: Vec<f64>,
    inexact: u32,
    overflow: bool,
}

impl Products {
    fn push(&mut self, x: f64, y: f64) {
        if x == 0.0 || y == 0.0 {
            return;
        }
        let (p, e) = two_prod(x, y);
        if !p.is_finite() || !e.is_finite() {
            self.overflow = true;
            return;
        }
        if p.abs() < TINY {
            self.inexact += 1;
        }
        self.terms.push(p);
        self.terms.push(e);
    }

    /// Bound on `|exact sum - sum of terms|`.
    fn slack(&self) -> f64 {
        f64::from(self.inexact) * residual_slack()
    }
}

/// Product of an expansion and a double, exact up to `slack()`.
fn scale(e: &[f64], b: f64, prod: &mut Products) -> Vec<f64> {
    prod.terms.clear();
    for &x in e {
        prod.push(x, b);
    }
    from_terms(prod.terms.drain(..))
}

/// Move an expansion outward by `slack` in direction `round`.
fn widen(e: Vec<f64>, slack: f64, round: RoundMode) -> Vec<f64> {
    match round {
        _ if slack == 0.0 => e,
        RoundMode::Nearest => e,
        RoundMode::Down => grow(&e, -slack),
        RoundMode::Up => grow(&e, slack),
    }
}

fn negate(e: &[f64]) -> Vec<f64> {
    e.iter().map(|x| -x).collect()
}

fn sign_of(e: &[f64]) -> i32 {
    e.last().map_or(0, |x| x.sign())
}

fn approx(e: &[f64]) -> f64 {
    e.iter().sum()
}

/// Shewchuk's compress: same value, leading component within an ulp of it.
fn compress(e: &[f64]) -> Vec<f64> {
    let m = e.len();
    if m == 0 {
        return Vec::new();
    }
    let mut g = vec![0.0; m];
    let mut bottom = m - 1;
    let mut q = e[m - 1];
    for i in (0..m - 1).rev() {
        let (s, t) = two_sum(q, e[i]);
        if t != 0.0 {
            g[bottom] = s;
            bottom -= 1;
            q = t;
        } else {
            q = s;
        }
    }
    let mut top = 0;
    for i in bottom + 1..m {
        let (s, t) = two_sum(g[i], q);
        if t != 0.0 {
            g[top] = t;
            top += 1;
        }
        q = s;
    }
    g[top] = q;
    g.truncate(top + 1);
    g.retain(|x| *x != 0.0);
    g
}

/// Round the value of an expansion to a single double.
fn round_to_double(e: &[f64], round: RoundMode) -> f64 {
    let mut t = approx(e);
    // A finite value whose naive sum overflowed.
    if t == f64::INFINITY && round == RoundMode::Down {
        t = f64::MAX;
    } else if t == f64::NEG_INFINITY && round == RoundMode::Up {
        t = f64::MIN;
    }
    match round {
        RoundMode::Nearest => t,
        RoundMode::Down => {
            while sign_of(&grow(e, -t)) < 0 {
                t = next_down(t);
            }
            t
        }
        RoundMode::Up => {
            while sign_of(&grow(e, -t)) > 0 {
                t = next_up(t);
            }
            t
        }
    }
}

/// A quad-double: the exact sum `c[0] + c[1] + c[2] + c[3]`, leading first.
#[derive(Clone, Copy, Debug, Default)]
pub struct QValue {
    c: [f64; 4],
}

impl QValue {
    #[inline]
    pub fn new(x: f64) -> Self {
        Self {
            c: [x, 0.0, 0.0, 0.0],
        }
    }

    /// Components, leading first.
    #[inline]
    pub fn components(&self) -> [f64; 4] {
        self.c
    }

    fn expansion(&self) -> Vec<f64> {
        from_terms(self.c.iter().rev().copied())
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.c.iter().all(|x| x.is_finite())
    }

    /// Out of range: `-∞` rounding down, `+∞` rounding up, `near` otherwise.
    fn saturated(round: RoundMode, near: f64) -> Self {
        Self::new(match round {
            RoundMode::Down => f64::NEG_INFINITY,
            RoundMode::Up => f64::INFINITY,
            RoundMode::Nearest => near,
        })
    }

    /// Cut an exact expansion back to four components, rounding the tail.
    fn from_expansion(e: &[f64], round: RoundMode) -> Self {
        let e = compress(e);
        if e.iter().any(|x| !x.is_finite()) {
            return Self::saturated(round, approx(&e));
        }
        let n = e.len();
        let mut c = [0.0; 4];
        if n <= 4 {
            for (k, &x) in e.iter().rev().enumerate() {
                c[k] = x;
            }
            return Self { c };
        }
        let tail = round_to_double(&e[..n - 3], round);
        c[0] = e[n - 1];
        c[1] = e[n - 2];
        c[2] = e[n - 3];
        c[3] = tail;
        Self { c }
    }
}

impl Value for QValue {
    #[inline]
    fn bits(&self) -> u32 {
        QUAD_BITS
    }

    #[inline]
    fn from_f64(x: f64, _bits: u32) -> Self {
        Self::new(x)
    }

    fn to_f64(&self, round: RoundMode) -> f64 {
        if !self.is_finite() {
            return self.c[0];
        }
        round_to_double(&self.expansion(), round)
    }

    fn plus(&self, b: &Self, round: RoundMode) -> Self {
        if !self.is_finite() || !b.is_finite() {
            return Self::saturated(round, self.c[0] + b.c[0]);
        }
        Self::from_expansion(&sum(&self.expansion(), &b.expansion()), round)
    }

    fn minus(&self, b: &Self, round: RoundMode) -> Self {
        self.plus(&b.negated(), round)
    }

    fn times(&self, b: &Self, round: RoundMode) -> Self {
        let near = self.c[0] * b.c[0];
        let mut prod = Products::default();
        for &x in &self.c {
            for &y in &b.c {
                prod.push(x, y);
            }
        }
        if prod.overflow || !self.is_finite() || !b.is_finite() {
            return Self::saturated(round, near);
        }
        let slack = prod.slack();
        let e = from_terms(prod.terms);
        Self::from_expansion(&widen(e, slack, round), round)
    }

    fn divide(&self, b: &Self, round: RoundMode) -> Self {
        let near = self.c[0] / b.c[0];
        if !self.is_finite() || !b.is_finite() {
            return Self::saturated(round, near);
        }
        let be = b.expansion();
        let bd = approx(&be);
        let mut rem = self.expansion();
        let mut digits = Vec::with_capacity(5);
        let mut prod = Products::default();
        let mut slack = 0.0;
        for _ in 0..4 {
            let qi = approx(&rem) / bd;
            if qi == 0.0 {
                break;
            }
            if !qi.is_finite() {
                return Self::saturated(round, near);
            }
            digits.push(qi);
            let step = scale(&be, -qi, &mut prod);
            if prod.overflow {
                return Self::saturated(round, near);
            }
            slack += prod.slack();
            prod.inexact = 0;
            rem = sum(&rem, &step);
        }
        // self = b * digits + r with |r - rem| <= slack; the quotient is
        // digits + r / b, and r / b is bounded over the corners of r and b.
        let tail = match round {
            RoundMode::Nearest => approx(&rem) / bd,
            RoundMode::Down | RoundMode::Up => {
                let r = [
                    round_to_double(&grow(&rem, -slack), RoundMode::Down),
                    round_to_double(&grow(&rem, slack), RoundMode::Up),
                ];
                let d = [
                    round_to_double(&be, RoundMode::Down),
                    round_to_double(&be, RoundMode::Up),
                ];
                let corners = r
                    .iter()
                    .flat_map(|&x| d.iter().map(move |&y| div_f64(x, y, round)));
                if round == RoundMode::Down {
                    corners.fold(f64::INFINITY, f64::min)
                } else {
                    corners.fold(f64::NEG_INFINITY, f64::max)
                }
            }
        };
        digits.push(tail);
        Self::from_expansion(&from_terms(digits), round)
    }

    #[inline]
    fn negated(&self) -> Self {
        Self {
            c: self.c.map(|x| -x),
        }
    }

    fn sign(&self) -> i32 {
        sign_of(&self.expansion())
    }

    fn lt(&self, b: &Self) -> bool {
        if !self.is_finite() || !b.is_finite() {
            return self.c[0] < b.c[0];
        }
        sign_of(&sum(&self.expansion(), &negate(&b.expansion()))) < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_preserves_value_and_drops_zeros() {
        let e = from_terms([1.0, 1e-20, -1.0, 3.0, 1e-40]);
        let c = compress(&e);
        assert!(c.iter().all(|x| *x != 0.0));
        assert_eq!(approx(&c), 3.0);
        assert_eq!(sign_of(&sum(&c, &negate(&e))), 0);
    }

    #[test]
    fn tiny_differences_keep_their_sign() {
        let one = QValue::new(1.0);
        let eps = QValue::new(1e-40);
        let a = one.plus(&eps, RoundMode::Nearest);
        let d = a.minus(&one, RoundMode::Down);
        assert_eq!(d.sign(), 1);
        assert!(one.lt(&a));
        assert!(!a.lt(&one));
    }

    #[test]
    fn third_is_bracketed_well_beyond_double_precision() {
        let one = QValue::new(1.0);
        let three = QValue::new(3.0);
        let lo = one.divide(&three, RoundMode::Down);
        let hi = one.divide(&three, RoundMode::Up);
        assert!(lo.lt(&hi));
        // 3*lo <= 1 <= 3*hi, checked exactly at tier 1.
        assert!(!one.lt(&lo.times(&three, RoundMode::Down)));
        assert!(!hi.times(&three, RoundMode::Up).lt(&one));
        let width = hi.minus(&lo, RoundMode::Up).to_f64(RoundMode::Up);
        assert!(width < 1e-60, "width {width}");
    }

    #[test]
    fn export_rounds_outward() {
        let x = QValue::new(0.1).plus(&QValue::new(1e-30), RoundMode::Nearest);
        let lo = x.to_f64(RoundMode::Down);
        let hi = x.to_f64(RoundMode::Up);
        assert_eq!(lo, 0.1);
        assert_eq!(hi, next_up(0.1));
    }
}
