//! Sampling helpers for the loop that drives the controllers.
//!
//! The controllers never look at a clock; the loop measures the time between
//! readings and passes it as `dt`. Between fresh outputs the actuator keeps
//! its last command (zero-order hold).

use fsc_core::ensure_positive;
use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::output::ControlOutput;

/// Sample configuration for a control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Nominal sample period in seconds.
    pub interval: f64,
}

impl SampleConfig {
    /// Create a new sample configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not a finite positive number.
    pub fn new(interval: f64) -> ControlResult<Self> {
        ensure_positive(interval, "sample interval")?;
        Ok(Self { interval })
    }
}

/// Tracks sample timestamps and yields `dt` for each evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    /// Sample configuration.
    pub config: SampleConfig,
    /// Timestamp of the previous sample.
    pub last_sample_time: Option<f64>,
}

impl SampleClock {
    /// Create a clock that has not seen a sample yet.
    pub fn new(config: SampleConfig) -> Self {
        Self {
            config,
            last_sample_time: None,
        }
    }

    /// Record a sample at `now` and return the elapsed time since the previous one.
    ///
    /// The first sample, and any sample whose timestamp does not move forward,
    /// reports the nominal interval so that `dt` stays positive.
    pub fn tick(&mut self, now: f64) -> f64 {
        let dt = match self.last_sample_time {
            Some(prev) if now > prev => now - prev,
            _ => self.config.interval,
        };
        self.last_sample_time = Some(now);
        dt
    }
}

/// Zero-order hold of the command applied to an actuator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputHold {
    /// Command currently applied, if any has been issued.
    pub value: Option<f64>,
}

impl OutputHold {
    /// Create a hold with an initial command.
    pub fn new(initial: Option<f64>) -> Self {
        Self { value: initial }
    }

    /// Get the current command.
    pub fn get(&self) -> Option<f64> {
        self.value
    }

    /// Apply a controller output.
    ///
    /// Returns `true` if the command changed.
    pub fn apply(&mut self, output: ControlOutput) -> bool {
        match output {
            ControlOutput::Value(v) if self.value != Some(v) => {
                self.value = Some(v);
                true
            }
            _ => false,
        }
    }
}
