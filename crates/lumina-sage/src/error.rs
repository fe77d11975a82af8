//! Failures inside a Sage call. Never returned to callers: each public
//! operation logs the error and substitutes its fallback text.

#[derive(Debug, thiserror::Error)]
pub(crate) enum SageError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
}
