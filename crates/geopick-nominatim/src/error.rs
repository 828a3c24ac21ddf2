use thiserror::Error;

/// Errors returned by the Nominatim API client.
#[derive(Debug, Error)]
pub enum NominatimError {
    /// Network or TLS failure from the underlying HTTP client, or a non-2xx
    /// response status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    BaseUrl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
