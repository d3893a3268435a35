//! Unified error types for the small-giants tools.

use crate::config::ConfigError;

/// Unified error types shared by the client, server and CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing or invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// A page request failed (network, timeout, non-success status).
    #[error("UPSTREAM_FETCH_FAILED: page {page}: {reason}")]
    UpstreamFetch { page: u32, reason: String },

    /// A page payload could not be parsed as XML.
    #[error("UPSTREAM_PARSE_FAILED: page {page}: {reason}")]
    Parse { page: u32, reason: String },

    /// Output format is not one of `json` or `csv`.
    #[error("UNSUPPORTED_FORMAT: {0}")]
    UnsupportedFormat(String),

    /// Invalid input parameters (e.g., display out of range).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Cache backend failure. Absorbed by the tiered cache, never surfaced to callers.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Serialization of output or cache payloads failed.
    #[error("SERIALIZE_ERROR: {0}")]
    Serialize(String),

    /// Writing output failed.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable code, the prefix of the display string.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::UpstreamFetch { .. } => "UPSTREAM_FETCH_FAILED",
            Error::Parse { .. } => "UPSTREAM_PARSE_FAILED",
            Error::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Cache(_) => "CACHE_ERROR",
            Error::Serialize(_) => "SERIALIZE_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error came from the upstream registry (transport or payload).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamFetch { .. } | Error::Parse { .. })
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
