//! Closed-loop fan control primitives.
//!
//! This crate turns a measured signal (usually a temperature) into a fan
//! command. Sensor acquisition and actuator programming live outside; the
//! caller owns the sampling loop and passes each reading together with the
//! elapsed time since the previous one.
//!
//! # Architecture
//!
//! - [`PidController`]: PID action above `setpoint + pos_hyst`, integral reset
//!   below `setpoint - neg_hyst`, held output in between
//! - [`ThresholdTable`]: descending step-function lookup with independent
//!   up/down hysteresis bands
//! - [`Zone`]: one controller per sensor channel, combined into a single
//!   clamped command for a fan group
//!
//! Every evaluation yields a [`ControlOutput`], which is either a fresh value
//! or [`ControlOutput::Held`], meaning "leave the actuator where it is".

pub mod controller;
pub mod error;
pub mod output;
pub mod pid;
pub mod sampled;
pub mod table;
pub mod zone;

pub use controller::{AnyController, Controller, ControllerConfig};
pub use error::{ControlError, ControlResult};
pub use output::ControlOutput;
pub use pid::{PidConfig, PidController, PidState};
pub use sampled::{OutputHold, SampleClock, SampleConfig};
pub use table::{TableConfig, TableState, ThresholdTable};
pub use zone::{SensorReadings, Zone, ZoneChannel, ZoneLimits, ZoneOutput};
