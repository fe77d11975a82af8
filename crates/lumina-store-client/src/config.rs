//! Data-store client configuration.
//!
//! The store speaks PostgREST under `{base_url}/rest/v1`. Every request
//! carries the project's anon key as `apikey` and the signed-in user's
//! access token as a bearer credential.

use lumina_core::UserId;
use url::Url;
use zeroize::Zeroizing;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the data store.
///
/// Custom `Debug` implementation redacts both credentials.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub base_url: Url,
    /// Public anon key sent as the `apikey` header.
    pub anon_key: Zeroizing<String>,
    /// Bearer token for the signed-in user. Falls back to the anon key.
    pub access_token: Zeroizing<String>,
    /// Owner of every row this client reads or writes.
    pub user_id: UserId,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LUMINA_STORE_URL` (required)
    /// - `LUMINA_STORE_ANON_KEY` (required)
    /// - `LUMINA_ACCESS_TOKEN` (default: the anon key)
    /// - `LUMINA_USER_ID` (required, UUID)
    /// - `LUMINA_STORE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = required("LUMINA_STORE_URL")?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("LUMINA_STORE_URL".to_string(), e.to_string()))?;
        let anon_key = Zeroizing::new(required("LUMINA_STORE_ANON_KEY")?);
        let access_token = match optional("LUMINA_ACCESS_TOKEN") {
            Some(token) => Zeroizing::new(token),
            None => anon_key.clone(),
        };
        let raw_user = required("LUMINA_USER_ID")?;
        let user_id =
            UserId::parse(&raw_user).map_err(|_| ConfigError::InvalidUserId(raw_user.clone()))?;

        Ok(Self {
            base_url,
            anon_key,
            access_token,
            user_id,
            timeout_secs: optional("LUMINA_STORE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, user_id: UserId) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            anon_key: Zeroizing::new("test-anon-key".into()),
            access_token: Zeroizing::new("test-access-token".into()),
            user_id,
            timeout_secs: 5,
        })
    }

    /// Endpoint URL for a table.
    pub(crate) fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::MissingVar(var))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("LUMINA_USER_ID is not a UUID: {0}")]
    InvalidUserId(String),
    #[error("credential contains characters not allowed in an HTTP header")]
    InvalidCredential,
}
