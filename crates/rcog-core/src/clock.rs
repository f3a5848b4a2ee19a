//! Time sources for the engine.
//!
//! Transforms never read the wall clock themselves: they take an explicit
//! `time_scale` (seconds as f64). Only the orchestrator owns a [`Clock`] and
//! reads it once per step, so tests can pin or script time.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the `time_scale` fed to holographic phases.
pub trait Clock: Send {
    fn time_scale(&self) -> f64;
}

/// Wall-clock time as fractional Unix seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_scale(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn time_scale(&self) -> f64 {
        self.0
    }
}

/// First instant read by a seeded session. Every holographic phase is zero
/// at `t = 0`, so scripted time starts one unit later.
pub const SEEDED_START: f64 = 1.0;

/// Per-read advance of a seeded session's clock.
pub const SEEDED_STEP: f64 = 0.1;

/// Starts at `start` and advances by `step` after every read.
#[derive(Debug)]
pub struct TickClock {
    next: Cell<f64>,
    step: f64,
}

impl TickClock {
    pub fn new(start: f64, step: f64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// The scripted clock behind seeded sessions.
    pub fn seeded() -> Self {
        Self::new(SEEDED_START, SEEDED_STEP)
    }
}

impl Clock for TickClock {
    fn time_scale(&self) -> f64 {
        let t = self.next.get();
        self.next.set(t + self.step);
        t
    }
}
