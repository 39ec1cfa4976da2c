//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FscConfig {
    pub version: u32,
    #[serde(default)]
    pub profiles: Vec<ProfileDef>,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
}

impl FscConfig {
    pub fn profile(&self, name: &str) -> Option<&ProfileDef> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneDef> {
        self.zones.iter().find(|z| z.name == name)
    }
}

/// A named controller recipe. Every channel that references it gets its own
/// controller instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDef {
    pub name: String,
    pub kind: ProfileKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileKindDef {
    Pid {
        setpoint: f64,
        #[serde(default)]
        kp: f64,
        #[serde(default)]
        ki: f64,
        #[serde(default)]
        kd: f64,
        #[serde(default)]
        negative_hysteresis: f64,
        #[serde(default)]
        positive_hysteresis: f64,
    },
    Table {
        /// `[input_threshold, output]` pairs.
        data: Vec<(f64, f64)>,
        #[serde(default)]
        negative_hysteresis: f64,
        #[serde(default)]
        positive_hysteresis: f64,
    },
}

impl ProfileKindDef {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pid { .. } => "pid",
            Self::Table { .. } => "table",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub name: String,
    #[serde(default)]
    pub fans: Vec<String>,
    pub min_output: f64,
    pub max_output: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_safe_output: Option<f64>,
    #[serde(default = "default_interval_s")]
    pub interval_s: f64,
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
    /// Version 0 layout: one profile shared by a list of sensors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelDef {
    pub sensor: String,
    pub profile: String,
}

fn default_interval_s() -> f64 {
    3.0
}
