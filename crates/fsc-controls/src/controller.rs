//! Common controller interface.
//!
//! Both controller kinds share one shape: `evaluate(value, dt)`. The kind is
//! chosen per channel when the configuration is loaded, so [`AnyController`]
//! is a closed enum over the built-in kinds; [`Controller`] is the trait the
//! zone drives.

use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::output::ControlOutput;
use crate::pid::{PidConfig, PidController};
use crate::table::{TableConfig, ThresholdTable};

/// A controller that turns readings into commands.
pub trait Controller {
    /// Evaluate one sample.
    ///
    /// `dt` is the elapsed time in seconds since the previous call on this
    /// instance. Implementations that use it require `dt > 0`.
    fn evaluate(&mut self, value: f64, dt: f64) -> ControlResult<ControlOutput>;

    /// Most recent output without evaluating.
    fn last_output(&self) -> ControlOutput;
}

impl Controller for PidController {
    fn evaluate(&mut self, value: f64, dt: f64) -> ControlResult<ControlOutput> {
        PidController::evaluate(self, value, dt)
    }

    fn last_output(&self) -> ControlOutput {
        self.state().last_output
    }
}

impl Controller for ThresholdTable {
    fn evaluate(&mut self, value: f64, dt: f64) -> ControlResult<ControlOutput> {
        ThresholdTable::evaluate(self, value, dt)
    }

    fn last_output(&self) -> ControlOutput {
        self.state().last_output
    }
}

/// Controller kind and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerConfig {
    /// One-sided PID controller.
    Pid(PidConfig),
    /// Threshold table controller.
    Table(TableConfig),
}

impl ControllerConfig {
    /// Build a fresh controller instance with empty state.
    pub fn build(&self) -> ControlResult<AnyController> {
        match self {
            Self::Pid(config) => Ok(AnyController::Pid(PidController::new(config.clone())?)),
            Self::Table(config) => Ok(AnyController::Table(ThresholdTable::new(config.clone())?)),
        }
    }
}

/// Any built-in controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyController {
    Pid(PidController),
    Table(ThresholdTable),
}

impl AnyController {
    /// Short kind name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pid(_) => "pid",
            Self::Table(_) => "table",
        }
    }
}

impl Controller for AnyController {
    fn evaluate(&mut self, value: f64, dt: f64) -> ControlResult<ControlOutput> {
        match self {
            Self::Pid(c) => c.evaluate(value, dt),
            Self::Table(c) => c.evaluate(value, dt),
        }
    }

    fn last_output(&self) -> ControlOutput {
        match self {
            Self::Pid(c) => Controller::last_output(c),
            Self::Table(c) => Controller::last_output(c),
        }
    }
}

impl From<PidController> for AnyController {
    fn from(c: PidController) -> Self {
        Self::Pid(c)
    }
}

impl From<ThresholdTable> for AnyController {
    fn from(c: ThresholdTable) -> Self {
        Self::Table(c)
    }
}
