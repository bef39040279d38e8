//! Model spec parsing.
//!
//! # Responsibilities
//! - Parse `provider`, `provider:model` and `provider/model` specs
//! - Resolve a bare model id to its provider by prefix
//!
//! # Design Decisions
//! - Provider names are normalized to lowercase
//! - A bare token resolves by prefix only when it looks like a model id
//!   (contains '-'), so `gemini` stays a provider name
//! - Unknown providers parse fine; the registry decides whether they exist

use std::fmt;

use serde::Serialize;

/// Bare model id prefixes and the provider serving them.
const MODEL_PREFIXES: &[(&str, &str)] = &[
    ("gpt-", "openai"),
    ("o1", "openai"),
    ("o3", "openai"),
    ("o4", "openai"),
    ("claude", "anthropic"),
    ("gemini", "gemini"),
    ("grok", "xai"),
];

/// A routing candidate: provider name plus optional model override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModelChoice {
    pub provider: String,
    pub model: Option<String>,
}

impl ModelChoice {
    /// Candidate using the provider's default model.
    pub fn provider(name: impl Into<String>) -> Self {
        Self {
            provider: name.into().to_lowercase(),
            model: None,
        }
    }

    pub fn with_model(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: name.into().to_lowercase(),
            model: Some(model.into()),
        }
    }

    /// Parse a model spec.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();

        if let Some((provider, model)) = spec.split_once(&[':', '/'][..]) {
            let model = model.trim();
            return Self {
                provider: provider.trim().to_lowercase(),
                model: (!model.is_empty()).then(|| model.to_string()),
            };
        }

        match provider_for_model(spec) {
            Some(provider) => Self::with_model(provider, spec),
            None => Self::provider(spec),
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "{}:{}", self.provider, model),
            None => f.write_str(&self.provider),
        }
    }
}

/// Provider serving a bare model id, if the id is recognized.
pub fn provider_for_model(model: &str) -> Option<&'static str> {
    if !model.contains('-') {
        return None;
    }
    let lowered = model.to_lowercase();
    MODEL_PREFIXES
        .iter()
        .find(|(prefix, _)| lowered.starts_with(prefix))
        .map(|(_, provider)| *provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_name() {
        assert_eq!(ModelChoice::parse("Gemini"), ModelChoice::provider("gemini"));
        assert_eq!(ModelChoice::parse(" xai "), ModelChoice::provider("xai"));
    }

    #[test]
    fn test_parse_explicit_model() {
        assert_eq!(
            ModelChoice::parse("anthropic:claude-haiku-4-5"),
            ModelChoice::with_model("anthropic", "claude-haiku-4-5")
        );
        assert_eq!(
            ModelChoice::parse("openai/gpt-5-mini"),
            ModelChoice::with_model("openai", "gpt-5-mini")
        );
        assert_eq!(ModelChoice::parse("openai:"), ModelChoice::provider("openai"));
    }

    #[test]
    fn test_parse_bare_model_id() {
        assert_eq!(ModelChoice::parse("gpt-5-mini").provider, "openai");
        assert_eq!(ModelChoice::parse("o3-mini").provider, "openai");
        assert_eq!(ModelChoice::parse("claude-haiku-4-5").provider, "anthropic");
        assert_eq!(ModelChoice::parse("grok-4-1-fast-reasoning").provider, "xai");
        assert_eq!(
            ModelChoice::parse("gemini-3-flash-preview").model.as_deref(),
            Some("gemini-3-flash-preview")
        );
        // no prefix match: treated as a provider name
        assert_eq!(ModelChoice::parse("mistral-large"), ModelChoice::provider("mistral-large"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ModelChoice::parse("gpt-5-mini").to_string(), "openai:gpt-5-mini");
        assert_eq!(ModelChoice::provider("gemini").to_string(), "gemini");
    }
}
