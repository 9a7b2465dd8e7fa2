// src/generator/gemini.rs

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde_json::{Value as JsonValue, json};

use super::{GenerationError, GenerativeModel, ModelRequest};
use crate::config::Config;

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Client::new(),
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )
        .with_timeout(Duration::from_secs(config.gemini_timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Builds the `generateContent` request body: the prompt first, then the image if any.
pub(crate) fn request_body(request: &ModelRequest) -> JsonValue {
    let mut parts = vec![json!({ "text": request.prompt })];

    if let Some(image) = &request.image {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": BASE64.encode(&image.bytes),
            }
        }));
    }

    json!({ "contents": [{ "parts": parts }] })
}

/// Joins the text parts of the first candidate.
pub(crate) fn extract_text(body: &JsonValue) -> Option<String> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            has_image = request.image.is_some(),
            "Sending generateContent request"
        );

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let body: JsonValue = res.json().await?;
        extract_text(&body).ok_or(GenerationError::EmptyResponse)
    }
}
