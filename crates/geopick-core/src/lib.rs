//! Shared domain types and collaborator interfaces for the geopick widget:
//! coordinates and location records, the address normalizer, the geocoding
//! and device-position traits, and runtime configuration.

mod app_config;
mod config;
mod geocode;
mod location;
mod normalize;
mod position;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use geocode::{GeocodeError, GeocodeMatch, Geocoder};
pub use location::{Coordinates, LocationDetails, RawAddress, SavedLocation};
pub use normalize::location_details;
pub use position::{PositionError, PositionSource};
