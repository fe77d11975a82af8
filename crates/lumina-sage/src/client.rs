//! The Sage client.
//!
//! | Operation | Model | Method |
//! |-----------|-------|--------|
//! | [`Sage::daily_insight`] | fast | `POST /v1beta/models/{model}:generateContent` |
//! | [`Sage::stream_chat`] | smart | `POST /v1beta/models/{model}:streamGenerateContent?alt=sse` |
//! | [`Sage::analyze_image`] | vision | `POST /v1beta/models/{model}:generateContent` |
//!
//! Every operation returns text. Failures are logged at `error` and
//! replaced by the operation's fixed fallback reply.

use std::time::Duration;

use lumina_core::{AppMode, ChatTurn, SymptomLog};
use reqwest::header::{HeaderMap, HeaderValue};

use crate::config::{ConfigError, SageConfig};
use crate::error::SageError;
use crate::image::Image;
use crate::prompt::{
    self, CHAT_ERROR_REPLY, IMAGE_DEFAULT_PROMPT, IMAGE_EMPTY_REPLY, IMAGE_ERROR_REPLY,
    INSIGHT_EMPTY_REPLY, INSIGHT_ERROR_REPLY, SAGE_PERSONA,
};
use crate::wire::{Content, GenerateRequest, GenerateResponse, Part};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the generative-AI provider.
#[derive(Debug, Clone)]
pub struct Sage {
    http: reqwest::Client,
    config: SageConfig,
}

impl Sage {
    pub fn new(config: SageConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        match &config.api_key {
            Some(key) => {
                let mut value =
                    HeaderValue::from_str(key.as_str()).map_err(|_| ConfigError::InvalidApiKey)?;
                value.set_sensitive(true);
                headers.insert(API_KEY_HEADER, value);
            }
            None => {
                tracing::warn!("no Gemini API key configured; the Sage will answer with fallback text");
            }
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SageConfig {
        &self.config
    }

    /// Short "hormonal weather report" for the given day.
    pub async fn daily_insight(&self, day: u32, mode: AppMode, symptoms: &SymptomLog) -> String {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text(&prompt::daily_insight(
                day, mode, symptoms,
            ))])],
            system_instruction: None,
        };
        match self.generate(&self.config.fast_model, &request).await {
            Ok(text) if text.is_empty() => INSIGHT_EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                absorb("daily_insight", &e);
                INSIGHT_ERROR_REPLY.to_string()
            }
        }
    }

    /// Stream a chat reply, calling `on_chunk` for each non-empty fragment.
    ///
    /// Returns the concatenation of every fragment delivered. On failure the
    /// error reply is delivered as one more fragment, after any text that
    /// already arrived.
    pub async fn stream_chat<F>(&self, history: &[ChatTurn], message: &str, mut on_chunk: F) -> String
    where
        F: FnMut(&str),
    {
        let mut contents: Vec<Content> = history.iter().map(Content::from_turn).collect();
        contents.push(Content::user(vec![Part::text(message)]));
        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content::text(SAGE_PERSONA)),
        };

        let mut full = String::new();
        let mut deliver = |text: &str| {
            full.push_str(text);
            on_chunk(text);
        };
        if let Err(e) = self.stream(&self.config.smart_model, &request, &mut deliver).await {
            absorb("stream_chat", &e);
            deliver(CHAT_ERROR_REPLY);
        }
        full
    }

    /// Describe an image. An empty prompt uses the default health/nutrition prompt.
    pub async fn analyze_image(&self, image: &Image, prompt: &str) -> String {
        let prompt = if prompt.trim().is_empty() {
            IMAGE_DEFAULT_PROMPT
        } else {
            prompt
        };
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::inline(image.mime_type(), image.data()),
                Part::text(prompt),
            ])],
            system_instruction: None,
        };
        match self.generate(&self.config.vision_model, &request).await {
            Ok(text) if text.is_empty() => IMAGE_EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                absorb("analyze_image", &e);
                IMAGE_ERROR_REPLY.to_string()
            }
        }
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, SageError> {
        let endpoint = format!("{model}:generateContent");
        let resp = self
            .post(&endpoint, self.config.model_url(model, "generateContent"), request)
            .await?;
        let body = resp.bytes().await.map_err(|e| SageError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let parsed: GenerateResponse =
            serde_json::from_slice(&body).map_err(|e| SageError::Deserialization {
                endpoint,
                source: e,
            })?;
        Ok(parsed.text())
    }

    async fn stream<F>(
        &self,
        model: &str,
        request: &GenerateRequest,
        deliver: &mut F,
    ) -> Result<(), SageError>
    where
        F: FnMut(&str),
    {
        let endpoint = format!("{model}:streamGenerateContent");
        let url = format!(
            "{}?alt=sse",
            self.config.model_url(model, "streamGenerateContent")
        );
        let mut resp = self.post(&endpoint, url, request).await?;

        let mut events = SseLines::default();
        loop {
            let chunk = resp.chunk().await.map_err(|e| SageError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
            let Some(chunk) = chunk else { break };
            for data in events.push(&chunk) {
                emit(&endpoint, &data, deliver)?;
            }
        }
        if let Some(data) = events.finish() {
            emit(&endpoint, &data, deliver)?;
        }
        Ok(())
    }

    async fn post(
        &self,
        endpoint: &str,
        url: String,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, SageError> {
        if self.config.api_key.is_none() {
            return Err(SageError::MissingApiKey);
        }
        let resp = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| SageError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SageError::Api {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }
        Ok(resp)
    }
}

fn emit<F: FnMut(&str)>(endpoint: &str, data: &str, deliver: &mut F) -> Result<(), SageError> {
    let parsed: GenerateResponse =
        serde_json::from_str(data).map_err(|e| SageError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
    let text = parsed.text();
    if !text.is_empty() {
        deliver(&text);
    }
    Ok(())
}

fn absorb(operation: &str, error: &SageError) {
    match error {
        SageError::MissingApiKey => tracing::debug!(operation, "sage call skipped: no API key"),
        _ => tracing::error!(operation, error = %error, "sage call failed; using fallback reply"),
    }
}

/// Incremental splitter for `text/event-stream` bodies.
///
/// Yields the payload of each `data:` line. Bytes are buffered until a full
/// line arrives, so multi-byte characters split across chunks survive.
#[derive(Debug, Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                out.push(data);
            }
        }
        out
    }

    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?.trim();
    (!data.is_empty() && data != "[DONE]").then(|| data.to_string())
}
