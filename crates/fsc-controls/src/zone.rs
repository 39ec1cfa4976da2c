//! Zones: several sensor channels driving one fan group.
//!
//! Each channel pairs a sensor with its own controller instance. A zone
//! evaluates every channel, takes the highest fresh command and clamps it into
//! the fan group's range. When every channel is held the zone is held.
//!
//! A channel whose reading is missing or rejected is reported back. If the
//! zone has a fail-safe output, any such channel forces the command to it.

use std::collections::{BTreeMap, HashMap};

use fsc_core::{ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::controller::{AnyController, Controller};
use crate::error::{ControlError, ControlResult};
use crate::output::ControlOutput;

/// Source of sensor readings for one sample.
pub trait SensorReadings {
    /// Get the current reading for `sensor`, or `None` if it is unavailable.
    fn reading(&self, sensor: &str) -> Option<f64>;
}

impl SensorReadings for HashMap<String, f64> {
    fn reading(&self, sensor: &str) -> Option<f64> {
        self.get(sensor).copied()
    }
}

impl SensorReadings for BTreeMap<String, f64> {
    fn reading(&self, sensor: &str) -> Option<f64> {
        self.get(sensor).copied()
    }
}

/// Output range of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneLimits {
    /// Lowest command sent to the fans.
    pub min_output: f64,
    /// Highest command sent to the fans.
    pub max_output: f64,
    /// Command used while any channel has no usable reading.
    pub fail_safe_output: Option<f64>,
}

impl ZoneLimits {
    /// Create limits without a fail-safe output.
    pub fn new(min_output: f64, max_output: f64) -> Self {
        Self {
            min_output,
            max_output,
            fail_safe_output: None,
        }
    }

    /// Set the fail-safe output.
    pub fn with_fail_safe(mut self, output: f64) -> Self {
        self.fail_safe_output = Some(output);
        self
    }

    /// Check that the range is usable.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite bounds, an inverted range, or a
    /// fail-safe output outside the range.
    pub fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.min_output, "min_output")?;
        ensure_finite(self.max_output, "max_output")?;
        if self.min_output > self.max_output {
            return Err(ControlError::InvalidArg {
                what: "min_output must not exceed max_output",
            });
        }
        if let Some(fail_safe) = self.fail_safe_output {
            ensure_finite(fail_safe, "fail_safe_output")?;
            if fail_safe < self.min_output || fail_safe > self.max_output {
                return Err(ControlError::InvalidArg {
                    what: "fail_safe_output must lie within [min_output, max_output]",
                });
            }
        }
        Ok(())
    }
}

/// One sensor feeding one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneChannel {
    /// Sensor name looked up in the readings.
    pub sensor: String,
    /// Profile the controller was built from.
    pub profile: String,
    controller: AnyController,
}

impl ZoneChannel {
    pub fn new(
        sensor: impl Into<String>,
        profile: impl Into<String>,
        controller: AnyController,
    ) -> Self {
        Self {
            sensor: sensor.into(),
            profile: profile.into(),
            controller,
        }
    }

    fn sensor_reading<R: SensorReadings + ?Sized>(&self, readings: &R) -> Option<f64> {
        readings.reading(&self.sensor)
    }
}

/// Result of evaluating a zone for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOutput {
    /// Clamped command, or `Held` if no channel produced one.
    pub output: ControlOutput,
    /// Sensors whose reading was missing or rejected.
    pub failed_sensors: Vec<String>,
    /// Whether the fail-safe output was applied.
    pub fail_safe: bool,
}

/// A fan group and the channels that drive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    limits: ZoneLimits,
    channels: Vec<ZoneChannel>,
}

impl Zone {
    /// Create a zone without channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits do not validate.
    pub fn new(name: impl Into<String>, limits: ZoneLimits) -> ControlResult<Self> {
        limits.validate()?;
        Ok(Self {
            name: name.into(),
            limits,
            channels: Vec::new(),
        })
    }

    /// Add a channel.
    pub fn add_channel(&mut self, channel: ZoneChannel) {
        self.channels.push(channel);
    }

    /// Add a channel, builder style.
    pub fn with_channel(mut self, channel: ZoneChannel) -> Self {
        self.add_channel(channel);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[ZoneChannel] {
        &self.channels
    }

    /// Last output of the first channel reading `sensor`.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownChannel`] if no channel reads `sensor`.
    pub fn channel_output(&self, sensor: &str) -> ControlResult<ControlOutput> {
        self.channels
            .iter()
            .find(|c| c.sensor == sensor)
            .map(|c| c.controller.last_output())
            .ok_or_else(|| ControlError::UnknownChannel {
                sensor: sensor.to_string(),
            })
    }

    /// Evaluate every channel for one sample.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidInput`] if `dt` is not a finite positive number.
    /// No channel is evaluated in that case.
    pub fn evaluate<R: SensorReadings + ?Sized>(
        &mut self,
        readings: &R,
        dt: f64,
    ) -> ControlResult<ZoneOutput> {
        if ensure_positive(dt, "dt").is_err() {
            return Err(ControlError::InvalidInput { what: "dt", value: dt });
        }

        let mut best: Option<f64> = None;
        let mut failed_sensors = Vec::new();

        for channel in &mut self.channels {
            let Some(value) = channel.sensor_reading(readings) else {
                warn!(zone = %self.name, sensor = %channel.sensor, "sensor reading unavailable");
                failed_sensors.push(channel.sensor.clone());
                continue;
            };

            match channel.controller.evaluate(value, dt) {
                Ok(ControlOutput::Value(v)) => {
                    best = Some(best.map_or(v, |b| b.max(v)));
                }
                Ok(ControlOutput::Held) => {}
                Err(err) => {
                    warn!(zone = %self.name, sensor = %channel.sensor, %err, "reading rejected");
                    failed_sensors.push(channel.sensor.clone());
                }
            }
        }

        let (output, fail_safe) = match self.limits.fail_safe_output {
            Some(fail_safe) if !failed_sensors.is_empty() => {
                warn!(zone = %self.name, fail_safe, "fail-safe output engaged");
                (ControlOutput::Value(fail_safe), true)
            }
            _ => (
                ControlOutput::from(best).clamp(self.limits.min_output, self.limits.max_output),
                false,
            ),
        };

        debug!(zone = %self.name, %output, "zone evaluated");
        Ok(ZoneOutput {
            output,
            failed_sensors,
            fail_safe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::{PidConfig, PidController};
    use crate::table::{TableConfig, ThresholdTable};

    fn readings(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn table_channel(sensor: &str) -> ZoneChannel {
        let table =
            ThresholdTable::new(TableConfig::new(vec![(20.0, 30.0), (30.0, 45.0), (40.0, 70.0)]))
                .unwrap();
        ZoneChannel::new(sensor, "linear", table.into())
    }

    fn pid_channel(sensor: &str) -> ZoneChannel {
        let pid = PidController::new(
            PidConfig::new(70.0)
                .with_gains(-5.0, 0.0, 0.0)
                .with_hysteresis(3.0, 0.0),
        )
        .unwrap();
        ZoneChannel::new(sensor, "pid", pid.into())
    }

    fn zone(limits: ZoneLimits) -> Zone {
        Zone::new("zone_0", limits)
            .unwrap()
            .with_channel(table_channel("inlet"))
            .with_channel(pid_channel("soc"))
    }

    #[test]
    fn max_of_channels() {
        let mut z = zone(ZoneLimits::new(0.0, 100.0));
        // table: 45, pid: -5 * (70 - 80) = 50
        let out = z.evaluate(&readings(&[("inlet", 35.0), ("soc", 80.0)]), 1.0).unwrap();
        assert_eq!(out.output, ControlOutput::Value(50.0));
        assert!(out.failed_sensors.is_empty());
        assert!(!out.fail_safe);
    }

    #[test]
    fn clamps_to_limits() {
        let mut z = zone(ZoneLimits::new(35.0, 60.0));
        let out = z.evaluate(&readings(&[("inlet", 25.0), ("soc", 69.0)]), 1.0).unwrap();
        assert_eq!(out.output, ControlOutput::Value(35.0));

        let out = z.evaluate(&readings(&[("inlet", 25.0), ("soc", 90.0)]), 1.0).unwrap();
        assert_eq!(out.output, ControlOutput::Value(60.0));
    }

    #[test]
    fn held_when_every_channel_holds() {
        let mut z = Zone::new("z", ZoneLimits::new(0.0, 100.0))
            .unwrap()
            .with_channel(pid_channel("soc"));
        let out = z.evaluate(&readings(&[("soc", 68.0)]), 1.0).unwrap();
        assert_eq!(out.output, ControlOutput::Held);
        assert_eq!(z.channel_output("soc").unwrap(), ControlOutput::Held);
    }

    #[test]
    fn missing_sensor_is_skipped_without_fail_safe() {
        let mut z = zone(ZoneLimits::new(0.0, 100.0));
        let out = z.evaluate(&readings(&[("inlet", 45.0)]), 1.0).unwrap();
        assert_eq!(out.output, ControlOutput::Value(70.0));
        assert_eq!(out.failed_sensors, vec!["soc".to_string()]);
        assert!(!out.fail_safe);
    }

    #[test]
    fn invalid_reading_triggers_fail_safe() {
        let mut z = zone(ZoneLimits::new(20.0, 100.0).with_fail_safe(90.0));
        let out = z
            .evaluate(&readings(&[("inlet", 25.0), ("soc", f64::NAN)]), 1.0)
            .unwrap();
        assert_eq!(out.output, ControlOutput::Value(90.0));
        assert_eq!(out.failed_sensors, vec!["soc".to_string()]);
        assert!(out.fail_safe);
        // the healthy channel still advanced
        assert_eq!(z.channel_output("inlet").unwrap(), ControlOutput::Value(30.0));
    }

    #[test]
    fn overflowing_pid_is_reported_not_commanded() {
        let pid = PidController::new(PidConfig::new(0.0).with_gains(1.0, 0.0, 0.0)).unwrap();
        let mut z = Zone::new("z", ZoneLimits::new(0.0, 100.0))
            .unwrap()
            .with_channel(ZoneChannel::new("soc", "pid", pid.into()));
        let out = z.evaluate(&readings(&[("soc", 1e308)]), 10.0).unwrap();
        assert_eq!(out.output, ControlOutput::Held);
        assert_eq!(out.failed_sensors, vec!["soc".to_string()]);
    }

    #[test]
    fn rejects_bad_dt() {
        let mut z = zone(ZoneLimits::new(0.0, 100.0));
        assert!(matches!(
            z.evaluate(&readings(&[("inlet", 25.0)]), 0.0),
            Err(ControlError::InvalidInput { what: "dt", .. })
        ));
        assert_eq!(z.channel_output("inlet").unwrap(), ControlOutput::Held);
    }

    #[test]
    fn unknown_channel() {
        let z = zone(ZoneLimits::new(0.0, 100.0));
        assert!(matches!(
            z.channel_output("nope"),
            Err(ControlError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn invalid_limits() {
        assert!(Zone::new("z", ZoneLimits::new(80.0, 20.0)).is_err());
        assert!(Zone::new("z", ZoneLimits::new(20.0, 80.0).with_fail_safe(100.0)).is_err());
        assert!(Zone::new("z", ZoneLimits::new(f64::NAN, 80.0)).is_err());
    }
}
