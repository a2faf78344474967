use dashu_float::round::mode::HalfEven;
use dashu_float::{Context, FBig};
use proptest::prelude::*;

use super::*;

type Exact = FBig<HalfEven>;

// Precision 0 is unlimited: additions and products below are exact.
fn exact_add(a: &Exact, b: &Exact) -> Exact {
    Context::<HalfEven>::new(0).add(a.repr(), b.repr()).value()
}

fn exact_mul(a: &Exact, b: &Exact) -> Exact {
    Context::<HalfEven>::new(0).mul(a.repr(), b.repr()).value()
}

fn exact_f64(x: f64) -> Exact {
    Exact::try_from(x).expect("finite")
}

/// Exact value of a tier value; `None` for `±∞` (direction from `sign`).
trait ToExact: Value {
    fn exact(&self) -> Option<Exact>;
}

impl ToExact for f64 {
    fn exact(&self) -> Option<Exact> {
        self.is_finite().then(|| exact_f64(*self))
    }
}

impl ToExact for QValue {
    fn exact(&self) -> Option<Exact> {
        let c = self.components();
        c.iter().all(|x| x.is_finite()).then(|| {
            c.iter()
                .fold(Exact::ZERO, |acc, &x| exact_add(&acc, &exact_f64(x)))
        })
    }
}

impl ToExact for MValue {
    fn exact(&self) -> Option<Exact> {
        Some(self.big().clone())
    }
}

/// `v * y <= x`, reading an infinite `v` as `±∞`.
fn scaled_le<T: ToExact>(v: &T, y: &Exact, x: &Exact) -> bool {
    match v.exact() {
        Some(e) => exact_mul(&e, y) <= *x,
        None => (v.sign() > 0) != (*y > Exact::ZERO),
    }
}

/// `x <= v * y`, reading an infinite `v` as `±∞`.
fn scaled_ge<T: ToExact>(v: &T, y: &Exact, x: &Exact) -> bool {
    match v.exact() {
        Some(e) => *x <= exact_mul(&e, y),
        None => (v.sign() > 0) == (*y > Exact::ZERO),
    }
}

fn contains<T: ToExact>(iv: &Interval<T>, x: &Exact) -> bool {
    let one = exact_f64(1.0);
    scaled_le(iv.lo(), &one, x) && scaled_ge(iv.hi(), &one, x)
}

/// A double inside `[lo, lo + w]` selected by `t` in `[0, 1]`.
fn pick(lo: f64, w: f64, t: f64) -> f64 {
    (lo + t * w).clamp(lo, lo + w)
}

/// Checks `+ - × ÷` and a composed expression `a*b + a` for one tier.
fn check_tier<T: ToExact>(bits: u32, a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
    check_scaled::<T>(bits, a, 0, b, 0)
}

/// As `check_tier`, with the operands scaled by `2^ka` and `2^kb`.
fn check_scaled<T: ToExact>(
    bits: u32,
    a: (f64, f64, f64),
    ka: i32,
    b: (f64, f64, f64),
    kb: i32,
) -> bool {
    let (sa, sb) = (2f64.powi(ka), 2f64.powi(kb));
    let (alo, aw, at) = a;
    let (blo, bw, bt) = b;
    let ia = Interval::<T>::from_f64(alo * sa, (alo + aw) * sa, bits).divide_f64(3.0);
    let ib = Interval::<T>::from_f64(blo * sb, (blo + bw) * sb, bits).times_f64(1.1);
    // Exact sample points inside the operands.
    let x = exact_mul(
        &exact_f64(pick(alo, aw, at) * sa),
        &Context::<HalfEven>::new(4096)
            .div(exact_f64(1.0).repr(), exact_f64(3.0).repr())
            .value(),
    );
    let y = exact_mul(&exact_f64(pick(blo, bw, bt) * sb), &exact_f64(1.1));
    // x = pick / 3 is only approximated above; keep it if it is inside `ia`.
    if !contains(&ia, &x) || !contains(&ib, &y) {
        return true;
    }
    let neg_y = -y.clone();
    let mut ok = contains(&ia.plus(&ib), &exact_add(&x, &y))
        && contains(&ia.minus(&ib), &exact_add(&x, &neg_y))
        && contains(&ia.times(&ib), &exact_mul(&x, &y))
        && contains(&ia.times(&ib).plus(&ia), &exact_add(&exact_mul(&x, &y), &x))
        && contains(&ia.negated(), &-x.clone());
    if ib.sign() != 0 {
        // x / y in [qlo, qhi] checked by multiplying back with y.
        let q = ia.divide(&ib);
        ok &= if y > Exact::ZERO {
            scaled_le(q.lo(), &y, &x) && scaled_ge(q.hi(), &y, &x)
        } else {
            scaled_le(q.hi(), &y, &x) && scaled_ge(q.lo(), &y, &x)
        };
    }
    ok
}

fn operand() -> impl Strategy<Value = (f64, f64, f64)> {
    (-50.0f64..50.0, 0.0f64..5.0, 0.0f64..=1.0)
}

/// Binary exponents that push products and quotients into the subnormal
/// range and past overflow.
fn exponent() -> impl Strategy<Value = i32> {
    prop_oneof![-540i32..=-480, -60i32..=60, 450i32..=510]
}

proptest! {
    #[test]
    fn double_tier_is_sound(a in operand(), b in operand()) {
        prop_assert!(check_tier::<f64>(DOUBLE_BITS, a, b));
    }

    #[test]
    fn quad_tier_is_sound(a in operand(), b in operand()) {
        prop_assert!(check_tier::<QValue>(QUAD_BITS, a, b));
    }

    #[test]
    fn multi_tier_is_sound(a in operand(), b in operand(), bits in prop::sample::select(vec![424u32, 848])) {
        prop_assert!(check_tier::<MValue>(bits, a, b));
    }

    #[test]
    fn double_tier_is_sound_at_extreme_exponents(
        a in operand(), ka in exponent(), b in operand(), kb in exponent()
    ) {
        prop_assert!(check_scaled::<f64>(DOUBLE_BITS, a, ka, b, kb));
    }

    #[test]
    fn quad_tier_is_sound_at_extreme_exponents(
        a in operand(), ka in exponent(), b in operand(), kb in exponent()
    ) {
        prop_assert!(check_scaled::<QValue>(QUAD_BITS, a, ka, b, kb));
    }

    #[test]
    fn multi_tier_is_sound_at_extreme_exponents(
        a in operand(), ka in exponent(), b in operand(), kb in exponent()
    ) {
        prop_assert!(check_scaled::<MValue>(424, a, ka, b, kb));
    }

    #[test]
    fn directed_export_brackets_quad_values(x in -1.0e6f64..1.0e6, y in 1.0f64..1.0e3) {
        let q = QValue::new(x).divide(&QValue::new(y), RoundMode::Nearest);
        let (lo, hi) = (q.to_f64(RoundMode::Down), q.to_f64(RoundMode::Up));
        let e = q.exact().unwrap();
        prop_assert!(exact_f64(lo) <= e && e <= exact_f64(hi));
        prop_assert!(hi == lo || round::next_up(lo) == hi);
    }
}

#[test]
fn quad_sign_sees_below_double_resolution() {
    // (1 + 2^-80) - 1 is zero at tier 0 and positive at tier 1.
    let tiny = 2f64.powi(-80);
    let d = 1.0f64.plus(&tiny, RoundMode::Nearest).minus(&1.0, RoundMode::Nearest);
    assert_eq!(d.sign(), 0);
    let one = QValue::new(1.0);
    let q = one.plus(&QValue::new(tiny), RoundMode::Down).minus(&one, RoundMode::Down);
    assert_eq!(q.sign(), 1);
}

fn product_is_enclosed<T: ToExact>(bits: u32, a: f64, b: f64) -> bool {
    let p = Interval::<T>::point(a, bits).times(&Interval::point(b, bits));
    contains(&p, &exact_mul(&exact_f64(a), &exact_f64(b)))
}

fn quotient_is_enclosed<T: ToExact>(bits: u32, a: f64, b: f64) -> bool {
    let q = Interval::<T>::point(a, bits).divide(&Interval::point(b, bits));
    let (x, y) = (exact_f64(a), exact_f64(b));
    if y > Exact::ZERO {
        scaled_le(q.lo(), &y, &x) && scaled_ge(q.hi(), &y, &x)
    } else {
        scaled_le(q.hi(), &y, &x) && scaled_ge(q.lo(), &y, &x)
    }
}

#[test]
fn subnormal_products_are_enclosed_on_every_tier() {
    for (a, b) in [(3e-162, 1.7e-161), (-2.5e-160, 7.0e-163), (1e-300, 1e-20)] {
        assert!(product_is_enclosed::<f64>(DOUBLE_BITS, a, b), "{a} * {b}");
        assert!(product_is_enclosed::<QValue>(QUAD_BITS, a, b), "{a} * {b}");
        assert!(product_is_enclosed::<MValue>(424, a, b), "{a} * {b}");
    }
}

#[test]
fn subnormal_quotients_are_enclosed_on_every_tier() {
    for (a, b) in [(1e-300, 3e10), (-4e-310, 7.0), (1e-160, -1e150)] {
        assert!(quotient_is_enclosed::<f64>(DOUBLE_BITS, a, b), "{a} / {b}");
        assert!(quotient_is_enclosed::<QValue>(QUAD_BITS, a, b), "{a} / {b}");
        assert!(quotient_is_enclosed::<MValue>(424, a, b), "{a} / {b}");
    }
}

#[test]
fn overflowing_products_saturate_outward() {
    for (a, b) in [(1e300, 1e10), (-3e200, 5e150)] {
        assert!(product_is_enclosed::<f64>(DOUBLE_BITS, a, b), "{a} * {b}");
        assert!(product_is_enclosed::<QValue>(QUAD_BITS, a, b), "{a} * {b}");
        assert!(quotient_is_enclosed::<QValue>(QUAD_BITS, a, 1.0 / b), "{a} / {}", 1.0 / b);
    }
    let p = QValue::new(1e300).times(&QValue::new(1e10), RoundMode::Up);
    assert_eq!(p.to_f64(RoundMode::Up), f64::INFINITY);
    // Products in range keep all their bits.
    let q = QValue::new(1e150).times(&QValue::new(3.0), RoundMode::Down);
    assert_eq!(q.to_f64(RoundMode::Down), round::mul(1e150, 3.0, RoundMode::Down));
}

#[test]
fn tiny_products_do_not_decide_a_sign_at_tier_one() {
    // (a*b)*2^200 - 8e-263 is positive; the residual of a*b underflows.
    let (a, b) = (3e-162, 1.7e-161);
    let k = 2f64.powi(200);
    let t = Interval::<QValue>::point(a, QUAD_BITS)
        .times(&Interval::point(b, QUAD_BITS))
        .times_f64(k)
        .minus(&Interval::point(8e-263, QUAD_BITS));
    assert_ne!(t.sign(), -1);
    let m = Interval::<MValue>::point(a, 424)
        .times(&Interval::point(b, 424))
        .times_f64(k)
        .minus(&Interval::point(8e-263, 424));
    assert_eq!(m.sign(), 1);
}
