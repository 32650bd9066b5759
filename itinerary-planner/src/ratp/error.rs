//! Provider error types.

/// Errors from fetching schedule or mission data.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", .body.as_ref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The API rejected the request as invalid.
    ///
    /// For missions this means the code carries no passengers
    /// ("sans voyageurs") and will never serve a station.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Unknown line, station or mission
    #[error("not found: {message}")]
    NotFound { message: String },

    /// API returned another error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Offline fixture data could not be loaded
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl ProviderError {
    /// Returns true if the provider rejected the request as invalid.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ProviderError::BadRequest { .. })
    }
}
