//! Simulation clock.
//!
//! Every timer in the simulation (spawn cadence, cleanup cadence, fire cadence,
//! hit timestamps) reads this clock instead of wall-clock time. It only moves
//! when a fixed tick runs, so tests can step it exactly.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    elapsed_ms: f64,
    step_secs: f32,
    ticks: u64,
}

impl SimClock {
    /// Advance by one tick of `dt_secs`. Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, dt_secs: f32) {
        self.step_secs = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        self.elapsed_ms += f64::from(self.step_secs) * 1000.0;
        self.ticks += 1;
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Duration of the most recent tick.
    #[inline]
    pub fn step_secs(&self) -> f32 {
        self.step_secs
    }

    #[inline]
    pub fn step_ms(&self) -> f64 {
        f64::from(self.step_secs) * 1000.0
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
