//! Geocoding collaborator interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::location::{Coordinates, RawAddress};

/// A forward-geocode match: where the query resolved and what the service
/// said about the place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub point: Coordinates,
    pub address: RawAddress,
}

/// Errors surfaced across the geocoding boundary. Transport detail stays in
/// the concrete client's own error type; callers only distinguish a failed
/// request from a response that made no sense.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Coordinate-to-address and free-text-to-coordinates lookups.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up the address at `point`. A point with nothing addressable
    /// nearby is not an error; implementations return an empty bag.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the lookup cannot be completed.
    async fn reverse_geocode(&self, point: Coordinates) -> Result<RawAddress, GeocodeError>;

    /// Resolves free text to candidate locations, best match first. Zero
    /// matches is `Ok` with an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the lookup cannot be completed.
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError>;
}
