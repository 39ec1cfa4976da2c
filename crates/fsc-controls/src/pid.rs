//! One-sided PID controller with a hysteresis dead zone.
//!
//! The controller only acts when the reading rises above
//! `max_threshold = setpoint + pos_hyst`. Below
//! `min_threshold = setpoint - neg_hyst` it disengages: the integral is
//! cleared and the output becomes [`ControlOutput::Held`]. Between the two
//! thresholds nothing changes and the last output is repeated.
//!
//! The error is `max_threshold - value`, so it is negative while the reading
//! overshoots. Gains are tuned against that sign (typically negative `kp`/`ki`
//! for a fan that must speed up as temperature rises).

use fsc_core::{ensure_finite, ensure_non_negative};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ControlError, ControlResult};
use crate::output::ControlOutput;

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Target value, in the units of the monitored signal.
    pub setpoint: f64,
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Distance below the setpoint at which the controller disengages.
    pub neg_hyst: f64,
    /// Distance above the setpoint at which the controller engages.
    pub pos_hyst: f64,
}

impl PidConfig {
    /// Create a configuration with zero gains and no hysteresis.
    pub fn new(setpoint: f64) -> Self {
        Self {
            setpoint,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            neg_hyst: 0.0,
            pos_hyst: 0.0,
        }
    }

    /// Set the three gains.
    pub fn with_gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// Set the negative and positive hysteresis offsets.
    pub fn with_hysteresis(mut self, neg_hyst: f64, pos_hyst: f64) -> Self {
        self.neg_hyst = neg_hyst;
        self.pos_hyst = pos_hyst;
        self
    }

    /// Reading below which the controller resets.
    pub fn min_threshold(&self) -> f64 {
        self.setpoint - self.neg_hyst
    }

    /// Reading above which the controller computes a new output.
    pub fn max_threshold(&self) -> f64 {
        self.setpoint + self.pos_hyst
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is not finite or a hysteresis offset is negative.
    pub fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.setpoint, "setpoint")?;
        ensure_finite(self.kp, "kp")?;
        ensure_finite(self.ki, "ki")?;
        ensure_finite(self.kd, "kd")?;
        ensure_non_negative(self.neg_hyst, "neg_hyst")?;
        ensure_non_negative(self.pos_hyst, "pos_hyst")?;
        Ok(())
    }
}

/// PID running state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PidState {
    /// Sum of `error * dt` since the last reset.
    pub integral: f64,
    /// Error from the most recent active evaluation.
    pub last_error: f64,
    /// Most recent output, `Held` until the first active evaluation.
    pub last_output: ControlOutput,
}

/// PID controller instance: fixed configuration plus its own running state.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    config: PidConfig,
    state: PidState,
}

impl PidController {
    /// Create a new PID controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: PidConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: PidState::default(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Get the running state.
    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Evaluate one sample.
    ///
    /// # Arguments
    ///
    /// * `value` - Current reading
    /// * `dt` - Seconds since the previous evaluation
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidInput`] if `value` is not finite, if the
    /// reading is above `max_threshold` and `dt` is not a finite positive
    /// number, or if the integral, derivative or output would overflow. The
    /// state is not modified in any of these cases.
    pub fn evaluate(&mut self, value: f64, dt: f64) -> ControlResult<ControlOutput> {
        if !value.is_finite() {
            return Err(ControlError::InvalidInput { what: "value", value });
        }

        let min_threshold = self.config.min_threshold();
        let max_threshold = self.config.max_threshold();

        if value > max_threshold && !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidInput { what: "dt", value: dt });
        }

        if value < min_threshold {
            if !self.state.last_output.is_held() {
                debug!(value, min_threshold, "pid disengaged");
            }
            self.state.integral = 0.0;
            self.state.last_output = ControlOutput::Held;
        }

        if value > max_threshold {
            let error = max_threshold - value;
            let integral = self.state.integral + error * dt;
            let derivative = (error - self.state.last_error) / dt;
            let output =
                self.config.kp * error + self.config.ki * integral + self.config.kd * derivative;

            // Extreme but finite inputs can overflow the terms.
            if !(integral.is_finite() && derivative.is_finite() && output.is_finite()) {
                return Err(ControlError::InvalidInput { what: "value", value });
            }

            if self.state.last_output.is_held() {
                debug!(value, max_threshold, output, "pid engaged");
            }
            self.state.integral = integral;
            self.state.last_output = ControlOutput::Value(output);
            self.state.last_error = error;
            return Ok(self.state.last_output);
        }

        Ok(self.state.last_output)
    }
}
