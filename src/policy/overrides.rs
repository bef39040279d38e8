//! Per-request caller overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PlatformPolicy;
use crate::pipeline::Stage;

/// Caller-supplied adjustments for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Overrides {
    /// Model spec preferred over the platform default for drafting stages.
    pub preferred_model: Option<String>,

    /// Model spec tried when the primary is unavailable or fails.
    pub fallback_model: Option<String>,

    /// Model spec per stage; wins over every other source.
    pub stage_models: BTreeMap<Stage, String>,

    pub char_limit: Option<usize>,
    pub target_chars: Option<usize>,

    /// Free text appended to the style instructions.
    pub style_notes: Option<String>,

    /// Trait weights in 0.0..=1.0, rendered as intensity words.
    pub style_weights: BTreeMap<String, f64>,
}

impl Overrides {
    pub fn with_preferred_model(mut self, spec: impl Into<String>) -> Self {
        self.preferred_model = Some(spec.into());
        self
    }

    pub fn with_fallback_model(mut self, spec: impl Into<String>) -> Self {
        self.fallback_model = Some(spec.into());
        self
    }

    pub fn with_stage_model(mut self, stage: Stage, spec: impl Into<String>) -> Self {
        self.stage_models.insert(stage, spec.into());
        self
    }

    /// Policy with the caller's limits applied.
    pub fn apply_to(&self, policy: &PlatformPolicy) -> PlatformPolicy {
        let mut effective = policy.clone();
        if let Some(limit) = self.char_limit {
            effective.char_limit = limit;
        }
        if let Some(target) = self.target_chars {
            effective.target_chars = Some(target);
        }
        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_replaces_limits_only() {
        let policy = PlatformPolicy::default();
        let overrides = Overrides {
            char_limit: Some(500),
            ..Default::default()
        };

        let effective = overrides.apply_to(&policy);
        assert_eq!(effective.char_limit, 500);
        assert_eq!(effective.target_chars, None);
        assert_eq!(effective.default_model, policy.default_model);
    }

    #[test]
    fn test_builders() {
        let overrides = Overrides::default()
            .with_preferred_model("anthropic")
            .with_stage_model(Stage::Judge, "openai:gpt-5-mini");
        assert_eq!(overrides.preferred_model.as_deref(), Some("anthropic"));
        assert_eq!(overrides.stage_models[&Stage::Judge], "openai:gpt-5-mini");
    }
}
