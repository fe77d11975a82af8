//! Image payloads for the vision model.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const DEFAULT_MIME: &str = "image/jpeg";

/// A base64-encoded image ready to send inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    mime_type: String,
    data: String,
}

impl Image {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Accept either a `data:<mime>;base64,<payload>` URL or bare base64.
    ///
    /// The data-URL prefix is stripped. Bare payloads are assumed JPEG.
    pub fn from_encoded(encoded: &str) -> Self {
        match encoded.split_once(',') {
            Some((header, payload)) => {
                let mime_type = header
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split(';').next())
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_MIME);
                Self {
                    mime_type: mime_type.to_string(),
                    data: payload.to_string(),
                }
            }
            None => Self {
                mime_type: DEFAULT_MIME.to_string(),
                data: encoded.to_string(),
            },
        }
    }

    /// MIME type guessed from a file extension, defaulting to JPEG.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "heic" => "image/heic",
            "heif" => "image/heif",
            "gif" => "image/gif",
            _ => DEFAULT_MIME,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without any prefix.
    pub fn data(&self) -> &str {
        &self.data
    }
}
