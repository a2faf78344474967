//! Arithmetic context: configuration and escalation state.
//!
//! Purpose
//! - Hold the perturbation magnitude, the precision cap, the perturbation RNG
//!   and the current escalation ceiling.
//!
//! Why this design
//! - The state is thread-local. Each thread has its own ceiling and RNG, so
//!   independent computations never observe each other's escalation.
//! - Rounding direction is chosen per operation (see `num::round`), so
//!   `enable`/`disable` only bracket a session; they switch no hardware mode.
//!
//! Ceiling ladder: 53 when idle, then 212 (quad-double), then doubling
//! (424, 848, ...) up to `max_precision`.

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AcpError;
use crate::num::{DOUBLE_BITS, QUAD_BITS};

/// Perturbation and precision settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcpCfg {
    /// Relative perturbation magnitude for literal inputs.
    pub delta: f64,
    /// Largest bit width an escalation may reach.
    pub max_precision: u32,
    /// Seed of the perturbation RNG.
    pub seed: u64,
}

impl Default for AcpCfg {
    fn default() -> Self {
        Self {
            delta: 2f64.powi(-27),
            max_precision: 848,
            seed: 0x5eed_acb0,
        }
    }
}

impl AcpCfg {
    pub fn validate(&self) -> Result<(), AcpError> {
        if !self.delta.is_finite() || self.delta < 0.0 || self.delta >= 1.0 {
            return Err(AcpError::invalid("delta must be finite and in [0, 1)"));
        }
        if self.max_precision < DOUBLE_BITS {
            return Err(AcpError::invalid(format!(
                "max_precision must be at least {DOUBLE_BITS}"
            )));
        }
        Ok(())
    }
}

struct State {
    cfg: AcpCfg,
    enabled: bool,
    ceiling: u32,
    rng: StdRng,
}

impl State {
    fn new(cfg: AcpCfg) -> Self {
        Self {
            cfg,
            enabled: false,
            ceiling: DOUBLE_BITS,
            rng: StdRng::seed_from_u64(cfg.seed),
        }
    }
}

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::new(AcpCfg::default()));
}

/// Start a session on this thread. Idempotent.
pub fn enable() {
    STATE.with(|s| s.borrow_mut().enabled = true);
}

/// End the session on this thread and drop any leftover escalation. Idempotent.
pub fn disable() {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        s.enabled = false;
        s.ceiling = DOUBLE_BITS;
    });
}

pub fn is_enabled() -> bool {
    STATE.with(|s| s.borrow().enabled)
}

/// Replace this thread's configuration and reseed its RNG.
pub fn configure(cfg: AcpCfg) -> Result<(), AcpError> {
    cfg.validate()?;
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        let enabled = s.enabled;
        *s = State::new(cfg);
        s.enabled = enabled;
    });
    Ok(())
}

pub fn config() -> AcpCfg {
    STATE.with(|s| s.borrow().cfg)
}

/// Current escalation ceiling in bits (53 outside escalation).
pub fn ceiling() -> u32 {
    STATE.with(|s| s.borrow().ceiling)
}

/// Step the ceiling one rung up; `None` once `max_precision` would be exceeded.
pub(crate) fn raise_ceiling() -> Option<u32> {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        let next = if s.ceiling < QUAD_BITS {
            QUAD_BITS
        } else {
            s.ceiling.saturating_mul(2)
        };
        if next > s.cfg.max_precision {
            return None;
        }
        s.ceiling = next;
        Some(next)
    })
}

pub(crate) fn restore_ceiling(bits: u32) {
    STATE.with(|s| s.borrow_mut().ceiling = bits);
}

/// Uniform sample in `[-1, 1]` scaled by `delta`.
pub(crate) fn jitter() -> f64 {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        debug_assert!(s.enabled, "perturbed input outside an enabled session");
        let delta = s.cfg.delta;
        delta * s.rng.gen_range(-1.0..=1.0)
    })
}

/// Enables on creation; disables on drop if this guard did the enabling.
#[must_use = "the session ends when the guard is dropped"]
pub struct Session {
    owned: bool,
}

impl Session {
    pub fn start() -> Self {
        let owned = !is_enabled();
        enable();
        Self { owned }
    }

    /// Configure, then start.
    pub fn with_cfg(cfg: AcpCfg) -> Result<Self, AcpError> {
        configure(cfg)?;
        Ok(Self::start())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.owned {
            disable();
        }
    }
}
