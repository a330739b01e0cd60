use chrono::{DateTime, Utc};
use thiserror::Error;
pub use url::ParseError as UrlParseError;

/// Error types for the UniFi reports client.
#[derive(Error, Debug)]
pub enum UniFiError {
    /// Authentication failed with the UniFi controller.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The API returned an error.
    #[error("API error: {0}")]
    ApiError(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error parsing URL.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] UrlParseError),

    /// Error serializing or deserializing JSON.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Client is not authenticated.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    /// The resolved report window is empty or inverted.
    ///
    /// A bound is `None` when the caller left it unset and no default window
    /// applied.
    #[error("Invalid time range: end time ({end:?}) must occur after start time ({start:?})")]
    InvalidTimeRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },

    /// Report type outside of `site`, `user`, `ap` and `speedtest`.
    #[error("Invalid report type specified: {0}")]
    InvalidReportType(String),

    /// Report interval outside of `5minutes`, `hourly`, `daily` and `archive`.
    #[error("Invalid interval specified: {0}")]
    InvalidInterval(String),

    /// First requested attribute that is not part of the report vocabulary.
    #[error("Invalid report attribute specified: {0}")]
    InvalidAttribute(String),
}

/// Result type for UniFi API operations.
pub type UniFiResult<T> = Result<T, UniFiError>;
