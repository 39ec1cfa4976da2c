//! Configuration migration.

use crate::ConfigError;
use crate::schema::{ChannelDef, FscConfig};

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: FscConfig) -> Result<FscConfig, ConfigError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: FscConfig) -> Result<FscConfig, ConfigError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ConfigError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 zones named one `profile` and a list of `sensors`; version 1
/// lists explicit channels.
fn migrate_v0_to_v1(mut config: FscConfig) -> Result<FscConfig, ConfigError> {
    for zone in &mut config.zones {
        let sensors = std::mem::take(&mut zone.sensors);
        let Some(profile) = zone.profile.take() else {
            if !sensors.is_empty() {
                return Err(ConfigError::Migration {
                    what: format!("zone '{}' lists sensors without a profile", zone.name),
                });
            }
            continue;
        };

        zone.channels.extend(sensors.into_iter().map(|sensor| ChannelDef {
            sensor,
            profile: profile.clone(),
        }));
    }

    config.version = 1;
    Ok(config)
}
