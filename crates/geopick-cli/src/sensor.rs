//! Position sources available to the CLI.

use std::sync::Arc;

use async_trait::async_trait;

use geopick_core::{Coordinates, PositionError, PositionSource};

/// A fixed position configured through the environment, standing in for a
/// real device sensor.
struct ConfiguredPosition {
    point: Coordinates,
}

#[async_trait]
impl PositionSource for ConfiguredPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        Ok(self.point)
    }
}

/// The sensor that is not there: every request fails as unsupported.
struct UnsupportedPosition;

#[async_trait]
impl PositionSource for UnsupportedPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// Builds the position source for this run: the configured fix when one is
/// set, otherwise a source that reports the capability as missing.
pub fn from_config(device_position: Option<Coordinates>) -> Arc<dyn PositionSource> {
    match device_position {
        Some(point) => Arc::new(ConfiguredPosition { point }),
        None => Arc::new(UnsupportedPosition),
    }
}
