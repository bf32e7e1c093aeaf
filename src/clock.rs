// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Simulation Clock

use chrono::{DateTime, Duration, Utc};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Running,
    /// TERMINAL: `now >= end`
    Terminated,
}

/// Fixed-step simulated time from `start` to `end`.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    now: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl SimulationClock {
    /// `step` must be positive; the caller validates it.
    pub fn new(start: DateTime<Utc>, duration: Duration, step: Duration) -> Result<Self, ConfigurationError> {
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| ConfigurationError::TimeOutOfRange {
                start: start.to_rfc3339(),
                duration: duration.to_string(),
            })?;
        Ok(Self { now: start, end, step })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn state(&self) -> ClockState {
        if self.now < self.end {
            ClockState::Running
        } else {
            ClockState::Terminated
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ClockState::Running
    }

    /// Move one step forward. No-op once terminated.
    pub fn advance(&mut self) -> ClockState {
        if self.is_running() {
            // a step past the representable range still ends the run
            self.now = self.now.checked_add_signed(self.step).unwrap_or(self.end);
        }
        self.state()
    }

    /// Ticks a full run performs: `ceil(duration / step)`.
    pub fn total_ticks(&self) -> u64 {
        let total = (self.end - self.now).num_milliseconds();
        let step = self.step.num_milliseconds();
        if total <= 0 || step <= 0 {
            return 0;
        }
        ((total + step - 1) / step) as u64
    }
}
