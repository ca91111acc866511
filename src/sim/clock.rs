//! Simulation clock with two independent periodic triggers
//!
//! The host feeds elapsed wall time through `advance`; the clock reports which
//! triggers fired, in time order. Nothing fires while a trigger is cancelled,
//! so cancelling is synchronous: once `stop` returns no further ticks exist.

use crate::consts::{MAX_FIRES_PER_UPDATE, MAX_UPDATE_DELTA_MS};

/// Which trigger fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Position update
    Frame,
    /// Object spawn
    Spawn,
}

/// A cancellable periodic task handle
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    period_ms: f64,
    accumulator_ms: f64,
    armed: bool,
}

impl Trigger {
    /// Arm with a fresh period; the first fire happens one full period later
    pub fn start(&mut self, period_ms: f64) {
        self.period_ms = period_ms.max(1.0);
        self.accumulator_ms = 0.0;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.accumulator_ms = 0.0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Offsets (ms into this update) at which the trigger fires
    fn advance(&mut self, dt_ms: f64) -> Vec<f64> {
        let mut fires = Vec::new();
        if !self.armed {
            return fires;
        }

        let mut next_at = self.period_ms - self.accumulator_ms;
        self.accumulator_ms += dt_ms;
        while self.accumulator_ms >= self.period_ms && (fires.len() as u32) < MAX_FIRES_PER_UPDATE {
            fires.push(next_at);
            next_at += self.period_ms;
            self.accumulator_ms -= self.period_ms;
        }
        // Drop backlog we refused to replay
        if self.accumulator_ms >= self.period_ms {
            self.accumulator_ms %= self.period_ms;
        }
        fires
    }
}

/// Frame and spawn triggers driven by host time
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    frame: Trigger,
    spawn: Trigger,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start both triggers
    pub fn start(&mut self, frame_ms: f64, spawn_ms: f64) {
        self.frame.start(frame_ms);
        self.spawn.start(spawn_ms);
        log::debug!("Clock started: frame={}ms spawn={}ms", frame_ms, spawn_ms);
    }

    /// Cancel both triggers
    pub fn stop(&mut self) {
        if self.is_running() {
            log::debug!("Clock stopped");
        }
        self.frame.cancel();
        self.spawn.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_armed() || self.spawn.is_armed()
    }

    pub fn frame_interval_ms(&self) -> f64 {
        self.frame.period_ms()
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn.period_ms()
    }

    /// Advance by host time and return fired ticks in chronological order.
    /// Frame ticks sort before spawn ticks scheduled at the same instant.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ClockTick> {
        // NaN survives clamp
        let dt_ms = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_UPDATE_DELTA_MS)
        } else {
            0.0
        };

        let mut fired: Vec<(f64, ClockTick)> = self
            .frame
            .advance(dt_ms)
            .into_iter()
            .map(|t| (t, ClockTick::Frame))
            .chain(self.spawn.advance(dt_ms).into_iter().map(|t| (t, ClockTick::Spawn)))
            .collect();

        // Stable sort keeps frame-before-spawn on ties
        fired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        fired.into_iter().map(|(_, tick)| tick).collect()
    }
}
