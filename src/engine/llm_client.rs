use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::error::GenerationError;
use crate::model::message::ChatMessage;
use crate::model::settings::FlingSettings;

/// Failure text that marks a safety block rather than a real error.
const CONTENT_FILTER_MARKERS: [&str; 4] = ["PROHIBITED_CONTENT", "SAFETY", "blocked", "content filter"];

/// Anything that can turn a message list into text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: usize,
    ) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: usize,
}

/// OpenAI-compatible `/v1/chat/completions` backend (LM Studio by default).
pub struct HttpGenerator {
    http: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl HttpGenerator {
    pub fn new(settings: &FlingSettings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: usize,
    ) -> Result<String, GenerationError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        Ok(normalize_model_output(&body))
    }
}

/// Pulls plain text out of whichever response shape the backend used.
pub fn normalize_model_output(raw: &Value) -> String {
    let text = match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        _ => [
            raw.get("content"),
            raw.get("text"),
            raw.pointer("/choices/0/message/content"),
            raw.pointer("/data/content"),
        ]
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string()),
    };
    text.trim().to_string()
}

pub fn is_content_filtered(error_text: &str) -> bool {
    CONTENT_FILTER_MARKERS
        .iter()
        .any(|marker| error_text.contains(marker))
}

/// Runs one generation; a safety block comes back as empty text.
pub async fn generate_with_recovery(
    generator: &dyn Generator,
    messages: &[ChatMessage],
    max_tokens: usize,
) -> Result<String, GenerationError> {
    let started = Instant::now();
    tracing::debug!(max_tokens, message_count = messages.len(), "generation start");

    match generator.generate(messages, max_tokens).await {
        Ok(text) => {
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                out_len = text.len(),
                "generation done"
            );
            Ok(text)
        }
        Err(e) if is_content_filtered(&e.to_string()) => {
            tracing::warn!(error = %e, "safety filter blocked generation");
            Ok(String::new())
        }
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            Err(e)
        }
    }
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<Value>,
}

/// Blocking probe of the configured server, for the settings screen.
pub fn test_connection(endpoint: &str) -> anyhow::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let resp: ModelList = client
        .get(format!("{}/v1/models", endpoint.trim_end_matches('/')))
        .send()?
        .error_for_status()?
        .json()?;

    Ok(format!("Connected ({} models available)", resp.data.len()))
}
