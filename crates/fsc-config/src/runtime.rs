//! Building live controllers and zones from a validated configuration.

use fsc_controls::{
    AnyController, ControllerConfig, PidConfig, SampleClock, SampleConfig, TableConfig, Zone,
    ZoneChannel, ZoneLimits,
};

use crate::schema::{FscConfig, ProfileDef, ProfileKindDef, ZoneDef};
use crate::validate::ValidationError;
use crate::{ConfigError, ConfigResult};

impl From<&ProfileKindDef> for ControllerConfig {
    fn from(kind: &ProfileKindDef) -> Self {
        match kind {
            ProfileKindDef::Pid {
                setpoint,
                kp,
                ki,
                kd,
                negative_hysteresis,
                positive_hysteresis,
            } => ControllerConfig::Pid(
                PidConfig::new(*setpoint)
                    .with_gains(*kp, *ki, *kd)
                    .with_hysteresis(*negative_hysteresis, *positive_hysteresis),
            ),
            ProfileKindDef::Table {
                data,
                negative_hysteresis,
                positive_hysteresis,
            } => ControllerConfig::Table(
                TableConfig::new(data.clone())
                    .with_hysteresis(*negative_hysteresis, *positive_hysteresis),
            ),
        }
    }
}

/// Build a fresh controller for one profile.
pub fn build_profile(profile: &ProfileDef) -> ConfigResult<AnyController> {
    Ok(ControllerConfig::from(&profile.kind).build()?)
}

/// Build a zone and its sample clock. Each channel gets its own controller.
pub fn build_zone(config: &FscConfig, zone: &ZoneDef) -> ConfigResult<(Zone, SampleClock)> {
    let mut limits = ZoneLimits::new(zone.min_output, zone.max_output);
    if let Some(fail_safe) = zone.fail_safe_output {
        limits = limits.with_fail_safe(fail_safe);
    }

    let mut built = Zone::new(zone.name.clone(), limits)?;
    for channel in &zone.channels {
        let profile = config
            .profile(&channel.profile)
            .ok_or_else(|| ValidationError::MissingReference {
                name: channel.profile.clone(),
                context: format!("zone '{}' channel profile", zone.name),
            })?;
        let controller = build_profile(profile)?;
        tracing::debug!(
            zone = %zone.name,
            sensor = %channel.sensor,
            profile = %profile.name,
            kind = controller.kind(),
            "channel built"
        );
        built.add_channel(ZoneChannel::new(
            channel.sensor.clone(),
            profile.name.clone(),
            controller,
        ));
    }

    let clock = SampleClock::new(SampleConfig::new(zone.interval_s)?);
    Ok((built, clock))
}

/// Build every zone in configuration order.
pub fn build_zones(config: &FscConfig) -> ConfigResult<Vec<(Zone, SampleClock)>> {
    config
        .zones
        .iter()
        .map(|zone| build_zone(config, zone))
        .collect::<Result<Vec<_>, ConfigError>>()
}
