//! Threshold table controller.
//!
//! Maps a reading to an output through a step function. Entries are
//! `(input_threshold, output)` pairs; the table is sorted once, descending by
//! threshold, and the first entry whose threshold is `<= value` wins. Readings
//! below every threshold saturate at the smallest entry's output.
//!
//! Two hysteresis bands suppress re-evaluation while the reading stays close
//! to the value that was last compared against the table. The comparison value
//! moves on every lookup, not only when the output changes.

use std::cmp::Ordering;

use fsc_core::{ensure_finite, ensure_non_negative};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ControlError, ControlResult};
use crate::output::ControlOutput;

/// Threshold table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// `(input_threshold, output)` pairs in any order.
    pub data: Vec<(f64, f64)>,
    /// Band below the last compared value that is ignored.
    pub neg_hyst: f64,
    /// Band above the last compared value that is ignored.
    pub pos_hyst: f64,
}

impl TableConfig {
    /// Create a configuration without hysteresis.
    pub fn new(data: Vec<(f64, f64)>) -> Self {
        Self {
            data,
            neg_hyst: 0.0,
            pos_hyst: 0.0,
        }
    }

    /// Set the negative and positive hysteresis bands.
    pub fn with_hysteresis(mut self, neg_hyst: f64, pos_hyst: f64) -> Self {
        self.neg_hyst = neg_hyst;
        self.pos_hyst = pos_hyst;
        self
    }

    /// Check that the table is usable.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty table, non-finite entries or negative bands.
    pub fn validate(&self) -> ControlResult<()> {
        if self.data.is_empty() {
            return Err(ControlError::InvalidArg {
                what: "threshold table must have at least one entry",
            });
        }
        for &(threshold, output) in &self.data {
            ensure_finite(threshold, "table threshold")?;
            ensure_finite(output, "table output")?;
        }
        ensure_non_negative(self.neg_hyst, "neg_hyst")?;
        ensure_non_negative(self.pos_hyst, "pos_hyst")?;
        Ok(())
    }
}

/// Threshold table running state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableState {
    /// Reading used for the most recent table lookup. Starts at zero.
    pub last_compared: f64,
    /// Most recent output, `Held` until the first lookup.
    pub last_output: ControlOutput,
}

/// Threshold table controller instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    /// Sorted descending by threshold; never re-sorted.
    entries: Vec<(f64, f64)>,
    /// Output of the smallest-threshold entry.
    floor_output: f64,
    neg_hyst: f64,
    pos_hyst: f64,
    state: TableState,
}

impl ThresholdTable {
    /// Create a new threshold table controller.
    ///
    /// Entries with equal thresholds keep their configured order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: TableConfig) -> ControlResult<Self> {
        config.validate()?;

        let mut entries = config.data;
        // stable: ties stay in configuration order
        entries.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let floor_output = entries
            .last()
            .map(|&(_, output)| output)
            .ok_or(ControlError::InvalidArg {
                what: "threshold table must have at least one entry",
            })?;

        Ok(Self {
            entries,
            floor_output,
            neg_hyst: config.neg_hyst,
            pos_hyst: config.pos_hyst,
            state: TableState::default(),
        })
    }

    /// Get the sorted entries.
    pub fn entries(&self) -> &[(f64, f64)] {
        &self.entries
    }

    /// Get the running state.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Look up a reading without touching the state.
    pub fn lookup(&self, value: f64) -> f64 {
        self.entries
            .iter()
            .find(|(threshold, _)| *threshold <= value)
            .map_or(self.floor_output, |&(_, output)| output)
    }

    /// Evaluate one sample. `dt` is ignored.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidInput`] if `value` is not finite.
    pub fn evaluate(&mut self, value: f64, _dt: f64) -> ControlResult<ControlOutput> {
        if !value.is_finite() {
            return Err(ControlError::InvalidInput { what: "value", value });
        }

        let last = self.state.last_compared;
        let distance = (last - value).abs();
        if value >= last && distance <= self.pos_hyst {
            return Ok(self.state.last_output);
        }
        if value <= last && distance <= self.neg_hyst {
            return Ok(self.state.last_output);
        }

        let output = ControlOutput::Value(self.lookup(value));
        if output != self.state.last_output {
            debug!(value, %output, "threshold table step");
        }
        self.state.last_compared = value;
        self.state.last_output = output;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(data: &[(f64, f64)], neg: f64, pos: f64) -> ThresholdTable {
        ThresholdTable::new(TableConfig::new(data.to_vec()).with_hysteresis(neg, pos)).unwrap()
    }

    #[test]
    fn sorted_descending_at_construction() {
        let t = table(&[(0.0, 30.0), (80.0, 100.0), (60.0, 70.0)], 0.0, 0.0);
        assert_eq!(t.entries(), &[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)]);
    }

    #[test]
    fn step_lookup_and_saturation() {
        let mut t = table(&[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)], 0.0, 0.0);
        assert_eq!(t.evaluate(90.0, 1.0).unwrap(), ControlOutput::Value(100.0));
        assert_eq!(t.evaluate(65.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.evaluate(10.0, 1.0).unwrap(), ControlOutput::Value(30.0));
        assert_eq!(t.evaluate(-5.0, 1.0).unwrap(), ControlOutput::Value(30.0));
        assert_eq!(t.state().last_compared, -5.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut t = table(&[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)], 0.0, 0.0);
        assert_eq!(t.evaluate(60.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.evaluate(80.0, 1.0).unwrap(), ControlOutput::Value(100.0));
    }

    #[test]
    fn positive_band_holds() {
        let mut t = table(&[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)], 0.0, 3.0);
        assert_eq!(t.evaluate(65.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.evaluate(67.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.state().last_compared, 65.0);
        // band edge is inclusive
        assert_eq!(t.evaluate(68.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.state().last_compared, 65.0);
        assert_eq!(t.evaluate(69.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.state().last_compared, 69.0);
    }

    #[test]
    fn positive_band_delays_step_up() {
        let mut t = table(&[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)], 0.0, 3.0);
        t.evaluate(78.0, 1.0).unwrap();
        // 80 crosses the breakpoint but is within 3 of 78
        assert_eq!(t.evaluate(80.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.evaluate(81.5, 1.0).unwrap(), ControlOutput::Value(100.0));
    }

    #[test]
    fn bands_are_independent() {
        let mut t = table(&[(80.0, 100.0), (60.0, 70.0), (0.0, 30.0)], 5.0, 0.0);
        assert_eq!(t.evaluate(62.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        // falling by up to 5 is ignored
        assert_eq!(t.evaluate(58.0, 1.0).unwrap(), ControlOutput::Value(70.0));
        // rising by any amount re-scans
        assert_eq!(t.evaluate(62.5, 1.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.state().last_compared, 62.5);
        assert_eq!(t.evaluate(57.0, 1.0).unwrap(), ControlOutput::Value(30.0));
    }

    #[test]
    fn recenters_even_when_output_unchanged() {
        let mut t = table(&[(60.0, 70.0), (0.0, 30.0)], 2.0, 2.0);
        t.evaluate(40.0, 1.0).unwrap();
        t.evaluate(43.0, 1.0).unwrap();
        assert_eq!(t.state().last_compared, 43.0);
        // 45 is within 2 of 43 (but not of 40)
        t.evaluate(45.0, 1.0).unwrap();
        assert_eq!(t.state().last_compared, 43.0);
    }

    #[test]
    fn first_reading_near_zero_is_held() {
        let mut t = table(&[(10.0, 50.0), (0.0, 20.0)], 1.0, 1.0);
        assert_eq!(t.evaluate(0.5, 1.0).unwrap(), ControlOutput::Held);
        assert_eq!(t.evaluate(5.0, 1.0).unwrap(), ControlOutput::Value(20.0));
    }

    #[test]
    fn duplicate_thresholds_use_configured_order() {
        let mut t = table(&[(50.0, 40.0), (70.0, 90.0), (50.0, 60.0)], 0.0, 0.0);
        assert_eq!(t.entries(), &[(70.0, 90.0), (50.0, 40.0), (50.0, 60.0)]);
        assert_eq!(t.evaluate(55.0, 1.0).unwrap(), ControlOutput::Value(40.0));
        assert_eq!(t.evaluate(10.0, 1.0).unwrap(), ControlOutput::Value(60.0));
    }

    #[test]
    fn dt_is_ignored() {
        let mut t = table(&[(60.0, 70.0), (0.0, 30.0)], 0.0, 0.0);
        assert_eq!(t.evaluate(65.0, 0.0).unwrap(), ControlOutput::Value(70.0));
        assert_eq!(t.evaluate(5.0, f64::NAN).unwrap(), ControlOutput::Value(30.0));
    }

    #[test]
    fn rejects_nan_value_without_touching_state() {
        let mut t = table(&[(60.0, 70.0), (0.0, 30.0)], 0.0, 0.0);
        t.evaluate(65.0, 1.0).unwrap();
        let before = t.state().clone();
        assert!(t.evaluate(f64::NAN, 1.0).is_err());
        assert_eq!(t.state(), &before);
    }

    #[test]
    fn invalid_config() {
        assert!(ThresholdTable::new(TableConfig::new(vec![])).is_err());
        assert!(ThresholdTable::new(TableConfig::new(vec![(f64::NAN, 1.0)])).is_err());
        assert!(
            ThresholdTable::new(TableConfig::new(vec![(1.0, 1.0)]).with_hysteresis(0.0, -1.0))
                .is_err()
        );
    }

    proptest! {
        #[test]
        fn repeated_value_is_held(
            data in prop::collection::vec((-20.0_f64..120.0, 0.0_f64..100.0), 1..8),
            neg in 0.0_f64..5.0,
            pos in 0.0_f64..5.0,
            value in -50.0_f64..150.0,
        ) {
            let mut t = table(&data, neg, pos);
            let first = t.evaluate(value, 1.0).unwrap();
            prop_assert_eq!(t.evaluate(value, 1.0).unwrap(), first);
        }

        #[test]
        fn output_always_from_table(
            data in prop::collection::vec((-20.0_f64..120.0, 0.0_f64..100.0), 1..8),
            values in prop::collection::vec(-50.0_f64..150.0, 1..20),
        ) {
            let mut t = table(&data, 0.0, 0.0);
            for v in values {
                if let ControlOutput::Value(out) = t.evaluate(v, 1.0).unwrap() {
                    prop_assert!(data.iter().any(|&(_, o)| o == out));
                }
            }
        }
    }
}
