//! Normalization of raw geocoder output into the canonical
//! [`LocationDetails`] shape.

use crate::location::{Coordinates, LocationDetails, RawAddress};

/// Converts a raw address bag plus the coordinates that produced it into a
/// total [`LocationDetails`].
///
/// Absent and empty components both degrade to `""`. The one exception is
/// `region`: any present value wins over `city`, even an empty string, and
/// `city` fills in only when `region` is absent altogether. The caller's
/// coordinates pass through unchanged; coordinates echoed inside `raw` are
/// never consulted.
#[must_use]
pub fn location_details(raw: &RawAddress, point: Coordinates) -> LocationDetails {
    LocationDetails {
        country: non_empty(&raw.country),
        region: raw
            .region
            .clone()
            .or_else(|| raw.city.clone())
            .unwrap_or_default(),
        district: non_empty(&raw.district),
        street: non_empty(&raw.road),
        house: non_empty(&raw.house_number),
        postal_code: non_empty(&raw.postcode),
        full_address: non_empty(&raw.display_name),
        latitude: point.lat,
        longitude: point.lng,
    }
}

fn non_empty(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|component| !component.is_empty())
        .unwrap_or_default()
        .to_string()
}
