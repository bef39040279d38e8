//! Provider identities, responses and error definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire family of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    Xai,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
        ProviderKind::Xai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Xai => "xai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-5-mini",
            ProviderKind::Anthropic => "claude-haiku-4-5",
            ProviderKind::Gemini => "gemini-3-flash-preview",
            ProviderKind::Xai => "grok-4-1-fast-reasoning",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::Xai => "https://api.x.ai/v1",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Xai => "GROK_API_KEY",
        }
    }

    /// Look up a kind by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one successful provider call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: f64,
    pub provider_name: String,
    pub model_name: String,
}

/// Errors a provider call can fail with.
///
/// The display strings carry the markers the retry classifier looks for
/// (status codes, "timed out", "network", "api key").
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key available for the provider.
    #[error("{provider}: API key not configured (set {env_var})")]
    MissingCredential { provider: String, env_var: String },

    /// Non-success HTTP status from the vendor.
    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    /// Connection-level failure.
    #[error("{provider} network error: {message}")]
    Transport { provider: String, message: String },

    /// The call exceeded its deadline and was abandoned.
    #[error("{provider} request timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    /// The vendor answered with a body we could not interpret.
    #[error("{provider} returned a malformed response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// No gateway is registered under the requested name.
    #[error("no gateway registered for provider '{0}'")]
    Unregistered(String),

    /// Client construction failed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Free-form failure reported by a gateway.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// HTTP status code, when the vendor sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::from_name("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_name("mistral"), None);
    }

    #[test]
    fn test_error_display_carries_markers() {
        let err = ProviderError::Status {
            provider: "openai".into(),
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(err.to_string(), "openai returned HTTP 429: slow down");
        assert_eq!(err.status(), Some(429));

        let err = ProviderError::Timeout {
            provider: "gemini".into(),
            after: Duration::from_secs(120),
        };
        assert!(err.to_string().contains("timed out"));

        let err = ProviderError::MissingCredential {
            provider: "xai".into(),
            env_var: "GROK_API_KEY".into(),
        };
        assert!(err.to_string().contains("API key"));
    }
}
