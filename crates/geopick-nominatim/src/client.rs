//! HTTP client for the Nominatim geocoding API.
//!
//! Wraps `reqwest` with Nominatim-specific error handling and typed
//! response deserialization. Construction takes a User-Agent because the
//! public Nominatim instance rejects anonymous clients.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use geopick_core::{Coordinates, GeocodeError, GeocodeMatch, Geocoder, RawAddress};

use crate::error::NominatimError;
use crate::types::{ReversePayload, SearchHit};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// How many candidates a forward search asks for. The picker only ever
/// consumes the best match.
const SEARCH_LIMIT: u8 = 1;

/// Client for the Nominatim REST API.
///
/// Use [`NominatimClient::new`] for the public instance or
/// [`NominatimClient::with_base_url`] to point at a self-hosted server or a
/// mock server in tests.
pub struct NominatimClient {
    client: Client,
    reverse_url: Url,
    search_url: Url,
}

impl NominatimClient {
    /// Creates a new client pointed at the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`NominatimError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, NominatimError> {
        Self::with_base_url(user_agent, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for self-hosted servers
    /// or testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NominatimError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NominatimError::BaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NominatimError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining an endpoint appends a segment rather than replacing the
        // last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |e| NominatimError::BaseUrl(format!("'{base_url}': {e}"));
        let base = Url::parse(&normalised).map_err(invalid)?;
        let reverse_url = base.join("reverse").map_err(invalid)?;
        let search_url = base.join("search").map_err(invalid)?;

        Ok(Self {
            client,
            reverse_url,
            search_url,
        })
    }

    /// Looks up the address at the given coordinates.
    ///
    /// Calls `/reverse` with `addressdetails=1` and hoists the top-level
    /// `display_name` into the returned bag. A body carrying Nominatim's
    /// `error` key (a point with nothing addressable nearby) yields an
    /// empty bag rather than an error.
    ///
    /// # Errors
    ///
    /// - [`NominatimError::Http`] on network failure or non-2xx HTTP status.
    /// - [`NominatimError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn reverse(&self, point: Coordinates) -> Result<RawAddress, NominatimError> {
        let url = Self::build_url(
            &self.reverse_url,
            &[
                ("lat", &point.lat.to_string()),
                ("lon", &point.lng.to_string()),
            ],
        );
        let body = self.request_json(&url).await?;

        let payload: ReversePayload =
            serde_json::from_value(body).map_err(|e| NominatimError::Deserialize {
                context: format!("reverse(lat={}, lon={})", point.lat, point.lng),
                source: e,
            })?;

        if let Some(reason) = payload.error {
            tracing::debug!(%reason, "reverse lookup found nothing addressable");
            return Ok(RawAddress::default());
        }

        let mut address = payload.address;
        address.display_name = payload.display_name;
        Ok(address)
    }

    /// Resolves free text to candidate locations, best match first.
    ///
    /// Calls `/search` with `addressdetails=1`. Nominatim serializes the
    /// coordinates of each hit as strings; entries whose coordinates fail
    /// to parse are skipped.
    ///
    /// # Errors
    ///
    /// - [`NominatimError::Http`] on network failure or non-2xx HTTP status.
    /// - [`NominatimError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search(
        &self,
        query: &str,
        limit: u8,
    ) -> Result<Vec<GeocodeMatch>, NominatimError> {
        let url = Self::build_url(
            &self.search_url,
            &[("limit", &limit.to_string()), ("q", query)],
        );
        let body = self.request_json(&url).await?;

        let hits: Vec<SearchHit> =
            serde_json::from_value(body).map_err(|e| NominatimError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        Ok(hits.into_iter().filter_map(hit_to_match).collect())
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters. `format=json` and `addressdetails=1` are always sent.
    fn build_url(endpoint: &Url, extra: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("addressdetails", "1");
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`NominatimError::Http`] on network failure or a non-2xx
    /// status. Returns [`NominatimError::Deserialize`] if the body is not
    /// valid JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, NominatimError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NominatimError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

fn hit_to_match(hit: SearchHit) -> Option<GeocodeMatch> {
    let lat: f64 = hit.lat.trim().parse().ok()?;
    let lng: f64 = hit.lon.trim().parse().ok()?;
    let mut address = hit.address;
    address.display_name = hit.display_name;
    Some(GeocodeMatch {
        point: Coordinates::new(lat, lng),
        address,
    })
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn reverse_geocode(&self, point: Coordinates) -> Result<RawAddress, GeocodeError> {
        self.reverse(point).await.map_err(port_error)
    }

    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        self.search(query, SEARCH_LIMIT).await.map_err(port_error)
    }
}

fn port_error(err: NominatimError) -> GeocodeError {
    match &err {
        NominatimError::Deserialize { .. } => GeocodeError::Malformed(err.to_string()),
        NominatimError::Http(_) | NominatimError::BaseUrl(_) => {
            GeocodeError::Request(err.to_string())
        }
    }
}
