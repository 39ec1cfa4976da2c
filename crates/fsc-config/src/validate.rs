//! Configuration validation logic.

use std::collections::HashSet;

use crate::schema::{FscConfig, ProfileDef, ProfileKindDef, ZoneDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &FscConfig) -> Result<(), ValidationError> {
    if config.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let mut profile_names = HashSet::new();
    for profile in &config.profiles {
        if !profile_names.insert(profile.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: profile.name.clone(),
                context: "profiles".to_string(),
            });
        }
        validate_profile(profile)?;
    }

    let mut zone_names = HashSet::new();
    for zone in &config.zones {
        if !zone_names.insert(zone.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: zone.name.clone(),
                context: "zones".to_string(),
            });
        }
        validate_zone(zone, &profile_names)?;
    }

    Ok(())
}

fn validate_profile(profile: &ProfileDef) -> Result<(), ValidationError> {
    let ctx = |field: &str| format!("profile '{}' {}", profile.name, field);

    match &profile.kind {
        ProfileKindDef::Pid {
            setpoint,
            kp,
            ki,
            kd,
            negative_hysteresis,
            positive_hysteresis,
        } => {
            finite(ctx("setpoint"), *setpoint)?;
            finite(ctx("kp"), *kp)?;
            finite(ctx("ki"), *ki)?;
            finite(ctx("kd"), *kd)?;
            non_negative(ctx("negative_hysteresis"), *negative_hysteresis)?;
            non_negative(ctx("positive_hysteresis"), *positive_hysteresis)?;
        }
        ProfileKindDef::Table {
            data,
            negative_hysteresis,
            positive_hysteresis,
        } => {
            if data.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: ctx("data"),
                    value: "[]".to_string(),
                    reason: "table needs at least one entry".to_string(),
                });
            }
            for (threshold, output) in data {
                finite(ctx("data threshold"), *threshold)?;
                finite(ctx("data output"), *output)?;
            }
            non_negative(ctx("negative_hysteresis"), *negative_hysteresis)?;
            non_negative(ctx("positive_hysteresis"), *positive_hysteresis)?;
        }
    }

    Ok(())
}

fn validate_zone(zone: &ZoneDef, profile_names: &HashSet<&str>) -> Result<(), ValidationError> {
    let ctx = |field: &str| format!("zone '{}' {}", zone.name, field);

    finite(ctx("min_output"), zone.min_output)?;
    finite(ctx("max_output"), zone.max_output)?;
    if zone.min_output > zone.max_output {
        return Err(ValidationError::InvalidValue {
            field: ctx("min_output"),
            value: zone.min_output.to_string(),
            reason: format!("greater than max_output {}", zone.max_output),
        });
    }

    if let Some(fail_safe) = zone.fail_safe_output {
        finite(ctx("fail_safe_output"), fail_safe)?;
        if fail_safe < zone.min_output || fail_safe > zone.max_output {
            return Err(ValidationError::InvalidValue {
                field: ctx("fail_safe_output"),
                value: fail_safe.to_string(),
                reason: format!("outside [{}, {}]", zone.min_output, zone.max_output),
            });
        }
    }

    if !(zone.interval_s.is_finite() && zone.interval_s > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: ctx("interval_s"),
            value: zone.interval_s.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if zone.profile.is_some() || !zone.sensors.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: ctx("sensors"),
            value: zone.sensors.join(","),
            reason: "version 0 layout, list channels instead".to_string(),
        });
    }

    if zone.channels.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: ctx("channels"),
            value: "[]".to_string(),
            reason: "zone needs at least one channel".to_string(),
        });
    }

    for channel in &zone.channels {
        if !profile_names.contains(channel.profile.as_str()) {
            return Err(ValidationError::MissingReference {
                name: channel.profile.clone(),
                context: ctx("channel profile"),
            });
        }
    }

    Ok(())
}

fn finite(field: String, value: f64) -> Result<(), ValidationError> {
    fsc_core::ensure_finite(value, "config value")
        .map(|_| ())
        .map_err(|err| ValidationError::InvalidValue {
            field,
            value: value.to_string(),
            reason: err.to_string(),
        })
}

fn non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    fsc_core::ensure_non_negative(value, "hysteresis")
        .map(|_| ())
        .map_err(|err| ValidationError::InvalidValue {
            field,
            value: value.to_string(),
            reason: err.to_string(),
        })
}
