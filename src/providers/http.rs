//! HTTP adapter for the vendor text-generation APIs.
//!
//! # Responsibilities
//! - Build the vendor-specific request for a prompt
//! - Map non-success statuses and transport failures to `ProviderError`
//! - Extract content, token usage and latency from the response
//!
//! # Design Decisions
//! - One adapter, three wire shapes (OpenAI-compatible chat, Anthropic
//!   messages, Gemini generateContent); xAI speaks the OpenAI shape
//! - No client-side timeout: the executor owns the per-call deadline
//! - A missing credential is reported per call, not at construction
//! - Credentials travel in headers only, never in the URL

use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ProviderConfig;
use crate::providers::types::{ProviderError, ProviderKind, ProviderResponse};
use crate::providers::ProviderGateway;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;
const MAX_ERROR_BODY: usize = 500;

/// Gateway to one vendor over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    name: String,
    kind: ProviderKind,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    default_model: String,
}

impl HttpProvider {
    /// Create from configuration, reading the API key from the environment.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let env_var = api_key_env(config);
        let api_key = std::env::var(&env_var).ok().filter(|k| !k.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    /// Create with an explicit API key.
    pub fn with_api_key(
        config: &ProviderConfig,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to create HTTP client: {e}")))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| config.kind.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            client,
            base_url,
            api_key,
            api_key_env: api_key_env(config),
            default_model: config
                .default_model
                .clone()
                .unwrap_or_else(|| config.kind.default_model().to_string()),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_request(&self, api_key: &str, model: &str, prompt: &str) -> reqwest::RequestBuilder {
        match self.kind {
            ProviderKind::OpenAi | ProviderKind::Xai => self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(api_key)
                .json(&json!({
                    "model": model,
                    "messages": [{ "role": "user", "content": prompt }],
                })),
            ProviderKind::Anthropic => self
                .client
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&json!({
                    "model": model,
                    "max_tokens": ANTHROPIC_MAX_TOKENS,
                    "messages": [{ "role": "user", "content": prompt }],
                })),
            ProviderKind::Gemini => self
                .client
                .post(format!("{}/models/{}:generateContent", self.base_url, model))
                .header("x-goog-api-key", api_key)
                .json(&json!({
                    "contents": [{ "parts": [{ "text": prompt }] }],
                })),
        }
    }

    /// Request URLs never reach error text.
    fn transport_error(&self, error: reqwest::Error) -> ProviderError {
        ProviderError::Transport {
            provider: self.name.clone(),
            message: error.without_url().to_string(),
        }
    }

    fn parse_body(&self, body: &str) -> Result<(String, u32, u32), ProviderError> {
        let malformed = |message: String| ProviderError::InvalidResponse {
            provider: self.name.clone(),
            message,
        };

        match self.kind {
            ProviderKind::OpenAi | ProviderKind::Xai => {
                let parsed: ChatCompletion =
                    serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
                let choice = parsed
                    .choices
                    .into_iter()
                    .next()
                    .ok_or_else(|| malformed("no choices in response".into()))?;
                let content = choice.message.and_then(|m| m.content).unwrap_or_default();
                let usage = parsed.usage.unwrap_or_default();
                Ok((content, usage.prompt_tokens, usage.completion_tokens))
            }
            ProviderKind::Anthropic => {
                let parsed: AnthropicMessage =
                    serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
                let content: String = parsed
                    .content
                    .into_iter()
                    .filter(|block| block.kind == "text")
                    .filter_map(|block| block.text)
                    .collect();
                let usage = parsed.usage.unwrap_or_default();
                Ok((content, usage.input_tokens, usage.output_tokens))
            }
            ProviderKind::Gemini => {
                let parsed: GeminiResponse =
                    serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
                let candidate = parsed
                    .candidates
                    .into_iter()
                    .next()
                    .ok_or_else(|| malformed("no candidates in response".into()))?;
                let content: String = candidate
                    .content
                    .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default();
                let usage = parsed.usage_metadata.unwrap_or_default();
                Ok((content, usage.prompt_token_count, usage.candidates_token_count))
            }
        }
    }
}

#[async_trait]
impl ProviderGateway for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential {
                provider: self.name.clone(),
                env_var: self.api_key_env.clone(),
            })?;
        let model = model.unwrap_or(&self.default_model);

        let start = Instant::now();
        let response = self
            .build_request(api_key, model, prompt)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let (content, input_tokens, output_tokens) = self.parse_body(&body)?;

        tracing::debug!(
            provider = %self.name,
            model = %model,
            input_tokens,
            output_tokens,
            latency_ms,
            "Provider call completed"
        );

        Ok(ProviderResponse {
            content: content.trim().to_string(),
            input_tokens,
            output_tokens,
            latency_ms,
            provider_name: self.name.clone(),
            model_name: model.to_string(),
        })
    }
}

fn api_key_env(config: &ProviderConfig) -> String {
    config
        .api_key_env
        .clone()
        .unwrap_or_else(|| config.kind.default_api_key_env().to_string())
}

/// Pull a readable message out of a vendor error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicMessage {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}
