//! Square root by interval Newton iteration.
//!
//! Seed from the double bounds, then refine at the parameter's own tier with
//! `y' = y ∩ (m - (m² - x) / y / 2)`, `m = mid(y)`, until an iterate is no
//! longer a strict subset of the previous one.

use crate::error::AcpError;
use crate::num::round::{self, RoundMode};

use super::Parameter;

impl Parameter {
    /// Enclosure of `√self`. The sign must be certifiably positive; an
    /// ambiguous sign is returned as an error, a negative one panics.
    pub fn sqrt(&self) -> Result<Parameter, AcpError> {
        let s = self.sign()?;
        assert!(s > 0, "square root of a negative parameter {self}");
        let (lb, ub) = (self.lb(), self.ub());
        let seed = (0.5 * (lb + ub)).sqrt();
        // One of ub/seed and ub/(ub/seed) is above √ub.
        let s1 = round::div(ub, seed, RoundMode::Up);
        let s2 = round::div(ub, s1, RoundMode::Up);
        let yr = s1.max(s2);
        let yl = round::div(lb, yr, RoundMode::Down);
        let mut y = self.lift_bounds(yl, yr);
        loop {
            let prev = y.clone();
            let m = y.mid_point();
            let step = (&(&m * &m) - self).checked_div(&y)? / 2.0;
            y = prev.intersect(&(&m - &step));
            if !y.subset(&prev) {
                return Ok(y);
            }
        }
    }
}
