//! Nominatim client: the concrete [`Geocoder`](geopick_core::Geocoder)
//! implementation behind the picker's reverse and forward lookups.

mod client;
mod error;
mod types;

pub use client::NominatimClient;
pub use error::NominatimError;
