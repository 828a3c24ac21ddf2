//! Domain types shared across the picker: coordinates, the raw address bag
//! a geocoder returns, and the records the picker persists.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    /// Formats as `"lat, lng"` with four decimal places, the form used
    /// when a saved entry needs an address and no lookup ever supplied one.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Raw address components as a geocoding service reports them.
///
/// Field names follow the Nominatim `address` object so responses
/// deserialize into it directly; `display_name` sits in the response
/// envelope and is hoisted in by the client. Every field is optional and
/// unrecognized components are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAddress {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub postcode: Option<String>,
    pub display_name: Option<String>,
}

/// Canonical address record attached to a picked point.
///
/// Produced by [`location_details`](crate::location_details): every string
/// field is present (empty rather than absent), and the coordinates are the
/// ones the caller picked, not whatever the geocoder echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    pub country: String,
    pub region: String,
    pub district: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    pub full_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A persisted, user-named location entry.
///
/// Ids are assigned by the store on insert. `is_selected` is an advisory
/// flag kept for interchange with existing data files; the store's separate
/// selection pointer is what actually decides the current entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub details: LocationDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_selected: Option<bool>,
}
