//! Sage client configuration.
//!
//! The API key is optional. Without one the client still constructs, logs
//! a single warning, and answers every call with its fallback text.

use url::Url;
use zeroize::Zeroizing;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Low-latency model for the daily insight.
pub const DEFAULT_FAST_MODEL: &str = "gemini-flash-lite-latest";
/// Conversational model for chat.
pub const DEFAULT_SMART_MODEL: &str = "gemini-3-pro-preview";
/// Vision-capable model for image analysis.
pub const DEFAULT_VISION_MODEL: &str = "gemini-3-pro-preview";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the generative-AI provider.
///
/// Custom `Debug` implementation redacts the API key.
#[derive(Clone)]
pub struct SageConfig {
    pub api_key: Option<Zeroizing<String>>,
    pub base_url: Url,
    pub fast_model: String,
    pub smart_model: String,
    pub vision_model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("fast_model", &self.fast_model)
            .field("smart_model", &self.smart_model)
            .field("vision_model", &self.vision_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SageConfig {
    /// Configuration with default endpoint and models.
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(Zeroizing::new),
            base_url: parse_url("base_url", DEFAULT_BASE_URL)?,
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            smart_model: DEFAULT_SMART_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GEMINI_API_KEY`, else `API_KEY` (optional)
    /// - `LUMINA_SAGE_URL` (default: `https://generativelanguage.googleapis.com`)
    /// - `LUMINA_SAGE_FAST_MODEL`, `LUMINA_SAGE_SMART_MODEL`, `LUMINA_SAGE_VISION_MODEL`
    /// - `LUMINA_SAGE_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env("GEMINI_API_KEY").or_else(|| env("API_KEY"));
        let mut config = Self::new(api_key)?;
        if let Some(raw) = env("LUMINA_SAGE_URL") {
            config.base_url = parse_url("LUMINA_SAGE_URL", &raw)?;
        }
        if let Some(model) = env("LUMINA_SAGE_FAST_MODEL") {
            config.fast_model = model;
        }
        if let Some(model) = env("LUMINA_SAGE_SMART_MODEL") {
            config.smart_model = model;
        }
        if let Some(model) = env("LUMINA_SAGE_VISION_MODEL") {
            config.vision_model = model;
        }
        if let Some(secs) = env("LUMINA_SAGE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout_secs = secs;
        }
        Ok(config)
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::new(api_key.map(str::to_string))?;
        config.base_url = parse_url("base_url", base_url)?;
        config.timeout_secs = 5;
        Ok(config)
    }

    pub(crate) fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:{method}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

fn env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_counts_as_missing() {
        assert!(SageConfig::new(Some(String::new())).unwrap().api_key.is_none());
    }

    #[test]
    fn model_url_joins_method() {
        let cfg = SageConfig::local_mock("http://127.0.0.1:9000/", None).unwrap();
        assert_eq!(
            cfg.model_url("gemini-flash-lite-latest", "generateContent"),
            "http://127.0.0.1:9000/v1beta/models/gemini-flash-lite-latest:generateContent"
        );
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = SageConfig::new(Some("sk-secret".into())).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("sk-secret"));
    }
}
