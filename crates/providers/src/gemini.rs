//! Google Gemini adapter.
//!
//! Implements the one-shot `generateContent` API. Auth is via an API key
//! passed as a query parameter (`key={api_key}`). Media rides inline as
//! base64 `inlineData` parts, so voice notes and documents need no
//! separate upload round trip.

use base64::Engine as _;
use dak_domain::config::LlmConfig;
use dak_domain::error::{Error, Result};
use serde_json::Value;

use crate::traits::{LanguageModel, MediaAttachment};
use crate::util::{from_reqwest, redact_url_key};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`LanguageModel`] backed by the Google Gemini API.
pub struct GeminiModel {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiModel {
    /// Create a new adapter from config, resolving the API key from the
    /// environment variable the config names.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::Config(format!(
                "environment variable '{}' not set or not valid UTF-8",
                cfg.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    async fn generate(&self, parts: Vec<Value>) -> Result<String> {
        let url = self.generate_url();
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
        });

        tracing::debug!(url = %redact_url_key(&url), "gemini generate request");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Model(format!(
                "HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        extract_text(&resp_json)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn extract_text(body: &Value) -> Result<String> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| Error::Model("no candidates in response".into()))?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|v| v.as_str()) {
            text.push_str(t);
        }
    }
    if text.is_empty() {
        return Err(Error::Model("candidate contained no text parts".into()));
    }
    Ok(text)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LanguageModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.generate(vec![serde_json::json!({"text": prompt})]).await
    }

    async fn complete_with_media(
        &self,
        prompt: &str,
        media: &MediaAttachment,
    ) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(&media.bytes);
        let parts = vec![
            serde_json::json!({
                "inlineData": {
                    "mimeType": media.mime_type,
                    "data": data,
                }
            }),
            serde_json::json!({"text": prompt}),
        ];
        self.generate(parts).await
    }
}
