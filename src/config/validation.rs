//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (model specs name configured providers)
//! - Validate value ranges (thresholds and timeouts > 0, limits coherent)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: OrchestratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{OrchestratorConfig, PlatformPolicy};
use crate::routing::ModelChoice;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &OrchestratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.failure_threshold",
            "must be greater than 0",
        ));
    }
    if config.circuit_breaker.recovery_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.recovery_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.timeouts.provider_call_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.provider_call_secs",
            "must be greater than 0",
        ));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    let providers = config.effective_providers();
    let mut names = HashSet::new();
    for (i, provider) in providers.iter().enumerate() {
        let field = format!("providers[{i}]");
        if provider.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.name"), "must not be empty"));
        } else if !names.insert(provider.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{field}.name"),
                format!("duplicate provider name '{}'", provider.name),
            ));
        }
        if let Some(base_url) = &provider.base_url {
            if let Err(e) = url::Url::parse(base_url) {
                errors.push(ValidationError::new(
                    format!("{field}.base_url"),
                    format!("invalid URL '{base_url}': {e}"),
                ));
            }
        }
    }

    let check_spec = |field: String, spec: &str, errors: &mut Vec<ValidationError>| {
        let choice = ModelChoice::parse(spec);
        if !names.contains(choice.provider.as_str()) {
            errors.push(ValidationError::new(
                field,
                format!("model spec '{spec}' names unknown provider '{}'", choice.provider),
            ));
        }
    };

    let mut policies: Vec<(String, &PlatformPolicy)> = config
        .platforms
        .iter()
        .map(|(name, policy)| (format!("platforms.{name}"), policy))
        .collect();
    policies.push(("default_policy".to_string(), &config.default_policy));

    for (field, policy) in policies {
        if policy.char_limit == 0 {
            errors.push(ValidationError::new(
                format!("{field}.char_limit"),
                "must be greater than 0",
            ));
        }
        if let Some(target) = policy.target_chars {
            if target > policy.char_limit {
                errors.push(ValidationError::new(
                    format!("{field}.target_chars"),
                    format!("{target} exceeds char_limit {}", policy.char_limit),
                ));
            }
        }
        check_spec(format!("{field}.default_model"), &policy.default_model, &mut errors);
        if let Some(fallback) = &policy.fallback_model {
            check_spec(format!("{field}.fallback_model"), fallback, &mut errors);
        }
    }

    let stages = [
        ("pipeline.generator_model", config.pipeline.generator_model.as_deref()),
        ("pipeline.critic_model", config.pipeline.critic_model.as_deref()),
        ("pipeline.improver_model", config.pipeline.improver_model.as_deref()),
        ("pipeline.judge_model", Some(config.pipeline.judge_model.as_str())),
    ];
    for (field, spec) in stages {
        if let Some(spec) = spec {
            check_spec(field.to_string(), spec, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
