//! Data-store client error types.

/// Errors from data-store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Store returned a non-2xx status.
    #[error("store {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// A write asked for its row back and got none.
    #[error("{endpoint} returned no rows")]
    EmptyResponse { endpoint: String },
    /// A maybe-single read matched more than one row.
    #[error("{endpoint} expected at most one row, got {count}")]
    MultipleRows { endpoint: String, count: usize },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl StoreError {
    /// HTTP status for errors the store itself reported.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
