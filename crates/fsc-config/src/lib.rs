//! fsc-config: fan control configuration file format and validation.

pub mod migrate;
pub mod runtime;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use runtime::{build_profile, build_zone, build_zones};
pub use schema::*;
pub use validate::{ValidationError, validate_config};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Controller error: {0}")]
    Control(#[from] fsc_controls::ControlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ConfigResult<FscConfig> {
    let config: FscConfig = serde_yaml::from_str(content)?;
    finish_load(config)
}

pub fn from_json_str(content: &str) -> ConfigResult<FscConfig> {
    let config: FscConfig = serde_json::from_str(content)?;
    finish_load(config)
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<FscConfig> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, config: &FscConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<FscConfig> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &std::path::Path, config: &FscConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` is JSON, anything else is YAML.
pub fn load(path: &std::path::Path) -> ConfigResult<FscConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

fn finish_load(config: FscConfig) -> ConfigResult<FscConfig> {
    let config = migrate_to_latest(config)?;
    validate_config(&config)?;
    tracing::debug!(
        profiles = config.profiles.len(),
        zones = config.zones.len(),
        "configuration loaded"
    );
    Ok(config)
}
