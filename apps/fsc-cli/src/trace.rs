//! Recorded sensor traces for offline replay.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// One sampling instant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    /// Timestamp in seconds.
    pub t: f64,
    /// Sensor name to reading. Sensors absent here count as failed reads.
    #[serde(default)]
    pub readings: BTreeMap<String, f64>,
}

/// Load a trace by extension: `.json` is JSON, anything else is YAML.
pub fn load_trace(path: &Path) -> CliResult<Vec<Sample>> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::TraceRead {
        path: path.to_path_buf(),
        source,
    })?;

    let samples: Vec<Sample> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| CliError::Trace(e.to_string()))?,
        _ => serde_yaml::from_str(&content).map_err(|e| CliError::Trace(e.to_string()))?,
    };
    check_order(&samples)?;
    Ok(samples)
}

fn check_order(samples: &[Sample]) -> CliResult<()> {
    for pair in samples.windows(2) {
        if !(pair[1].t > pair[0].t) {
            return Err(CliError::Trace(format!(
                "timestamps must increase: {} then {}",
                pair[0].t, pair[1].t
            )));
        }
    }
    Ok(())
}
