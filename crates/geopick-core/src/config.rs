use thiserror::Error;

use crate::app_config::AppConfig;
use crate::location::Coordinates;

/// Where the map looks before anything has been picked, as `"lat,lng"`.
const DEFAULT_MAP_CENTER: &str = "41.311081,69.240562";

/// Errors raised while resolving [`AppConfig`] from the environment. Every
/// variable has a default, so only unparseable values fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT touch `.env` files, which suits
/// tests and callers that manage env setup themselves.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Holds all the parsing/validation logic, decoupled from the actual environment
/// so tests can drive it with a plain `HashMap` lookup instead of `set_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_path = PathBuf::from(or_default("GEOPICK_DATA_PATH", "./geopick.json"));
    let nominatim_url = or_default("GEOPICK_NOMINATIM_URL", "https://nominatim.openstreetmap.org");
    let request_timeout_secs = parse_u64("GEOPICK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GEOPICK_USER_AGENT", "geopick/0.1 (location-picker)");
    let log_level = or_default("GEOPICK_LOG_LEVEL", "info");

    let map_center = parse_coordinates(
        "GEOPICK_MAP_CENTER",
        &or_default("GEOPICK_MAP_CENTER", DEFAULT_MAP_CENTER),
    )?;

    // Unset means this environment has no position sensor at all.
    let device_position = match lookup("GEOPICK_DEVICE_POSITION") {
        Ok(raw) => Some(parse_coordinates("GEOPICK_DEVICE_POSITION", &raw)?),
        Err(_) => None,
    };

    Ok(AppConfig {
        data_path,
        nominatim_url,
        request_timeout_secs,
        user_agent,
        log_level,
        map_center,
        device_position,
    })
}

/// Parse a `"lat,lng"` pair into [`Coordinates`], requiring both halves to
/// be finite numbers.
fn parse_coordinates(var: &str, raw: &str) -> Result<Coordinates, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected \"lat,lng\"".to_string()))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(invalid("coordinates must be finite".to_string()));
    }

    Ok(Coordinates::new(lat, lng))
}
