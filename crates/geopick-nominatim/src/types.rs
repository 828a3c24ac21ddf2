//! Nominatim API response types.
//!
//! Models the JSON returned by the `/reverse` and `/search` endpoints with
//! `format=json&addressdetails=1`. Two quirks matter here: search results
//! carry coordinates as decimal strings, and a reverse lookup over open
//! water answers 200 with an `error` key instead of address data.

use serde::Deserialize;

use geopick_core::RawAddress;

/// Payload of a `/reverse` lookup.
#[derive(Debug, Deserialize)]
pub struct ReversePayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: RawAddress,
}

/// One entry of a `/search` response array.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: RawAddress,
}
