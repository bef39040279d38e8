//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the orchestrator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Root configuration for the content orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Provider gateway definitions.
    pub providers: Vec<ProviderConfig>,

    /// Platform policies layered over the built-in table.
    pub platforms: BTreeMap<String, PlatformPolicy>,

    /// Policy used for platforms with no entry anywhere.
    pub default_policy: PlatformPolicy,

    /// Per-stage model selection.
    pub pipeline: PipelineConfig,

    /// Circuit breaker thresholds.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One provider gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider name used as the breaker and routing key.
    pub name: String,

    /// Wire family of the provider.
    pub kind: ProviderKind,

    /// Environment variable holding the API key (defaults per kind).
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Override of the vendor API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model used when a call carries no model override.
    #[serde(default)]
    pub default_model: Option<String>,
}

impl ProviderConfig {
    /// Provider config for `kind` with every optional field left to its default.
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
            kind,
            api_key_env: None,
            base_url: None,
            default_model: None,
        }
    }
}

/// Hard platform limits and default routing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformPolicy {
    /// Maximum characters accepted by the platform.
    pub char_limit: usize,

    /// Length the drafts should aim for.
    #[serde(default)]
    pub target_chars: Option<usize>,

    /// Model spec of the primary provider.
    pub default_model: String,

    /// Model spec of the explicit fallback provider.
    #[serde(default)]
    pub fallback_model: Option<String>,

    #[serde(default)]
    pub tone: Option<String>,

    #[serde(default)]
    pub features: Option<String>,

    #[serde(default)]
    pub format: Option<String>,
}

impl Default for PlatformPolicy {
    fn default() -> Self {
        Self {
            char_limit: 2000,
            target_chars: None,
            default_model: "gemini".to_string(),
            fallback_model: Some("openai".to_string()),
            tone: Some("engaging and authentic".to_string()),
            features: Some("Clear and valuable content".to_string()),
            format: Some("Hook, value, call-to-action".to_string()),
        }
    }
}

/// Per-stage model specs. Unset stages route by platform policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generator_model: Option<String>,
    pub critic_model: Option<String>,
    pub improver_model: Option<String>,

    /// Model spec used for blind judging.
    pub judge_model: String,

    /// Fixed seed for the judge shuffle. Leave unset in production.
    pub shuffle_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator_model: None,
            critic_model: None,
            improver_model: None,
            judge_model: "anthropic".to_string(),
            shuffle_seed: None,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures since the last success that open the circuit.
    pub failure_threshold: u32,

    /// Seconds an open circuit waits before closing on its own.
    pub recovery_timeout_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout_secs: 300,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single provider call in seconds.
    pub provider_call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_call_secs: 120,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts against the same provider before falling back.
    pub max_same_provider_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_same_provider_retries: 0,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Providers to register. An empty list means every built-in kind.
    pub fn effective_providers(&self) -> Vec<ProviderConfig> {
        if self.providers.is_empty() {
            ProviderKind::ALL
                .iter()
                .copied()
                .map(ProviderConfig::for_kind)
                .collect()
        } else {
            self.providers.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.circuit_breaker.recovery_timeout_secs, 300);
        assert_eq!(config.timeouts.provider_call_secs, 120);
        assert_eq!(config.retries.max_same_provider_retries, 0);
        assert_eq!(config.pipeline.judge_model, "anthropic");
        assert_eq!(config.effective_providers().len(), 4);
    }

    #[test]
    fn test_partial_sections() {
        let config: OrchestratorConfig = toml::from_str(
            r#"
            [[providers]]
            name = "openai"
            kind = "openai"
            default_model = "gpt-5-mini"

            [platforms.linkedin]
            char_limit = 1200
            default_model = "anthropic:claude-haiku-4-5"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind, ProviderKind::OpenAi);
        let linkedin = &config.platforms["linkedin"];
        assert_eq!(linkedin.char_limit, 1200);
        assert_eq!(linkedin.fallback_model, None);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
