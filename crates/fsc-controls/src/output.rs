//! Controller output values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of one controller evaluation.
///
/// `Held` means the controller has no new command for this cycle: either the
/// reading sits inside a dead zone or hysteresis band, or the controller has
/// disengaged and has not produced a value since. It is never equal to
/// `Value(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOutput {
    /// Fresh or previously computed command.
    Value(f64),
    /// No command; leave the actuator unchanged.
    #[default]
    Held,
}

impl ControlOutput {
    /// Get the command, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Held => None,
        }
    }

    /// Check if this is the held state.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Held)
    }

    /// Clamp a command into `[min, max]`. `Held` stays `Held`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`, or if either bound is NaN. [`crate::ZoneLimits::validate`]
    /// rejects such ranges.
    pub fn clamp(self, min: f64, max: f64) -> Self {
        match self {
            Self::Value(v) => Self::Value(v.clamp(min, max)),
            Self::Held => Self::Held,
        }
    }
}

impl From<f64> for ControlOutput {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl From<Option<f64>> for ControlOutput {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Held, Self::Value)
    }
}

impl fmt::Display for ControlOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::Held => f.write_str("held"),
        }
    }
}
