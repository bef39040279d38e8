//! Breaker-aware provider selection.
//!
//! # Responsibilities
//! - Choose the primary model for a platform and stage
//! - Choose a fallback from caller, policy or the toggle rule
//! - Put a healthy fallback ahead of a primary whose circuit is open
//!
//! # Design Decisions
//! - Precedence for the primary: caller stage override, caller preferred
//!   model (drafting stages only), configured stage model, platform default
//! - The fallback never names the primary's provider
//! - When both circuits are open the order is left alone so the executor
//!   reports the outage

use std::sync::Arc;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::pipeline::Stage;
use crate::policy::{Overrides, PlatformPolicyProvider};
use crate::resilience::CircuitBreaker;
use crate::routing::ModelChoice;

/// Ordered candidates for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub primary: ModelChoice,
    pub fallback: ModelChoice,
    /// True when the breaker forced the fallback to the front.
    pub swapped: bool,
}

impl RoutePlan {
    /// Candidates in execution order.
    pub fn candidates(&self) -> Vec<ModelChoice> {
        if self.primary == self.fallback {
            vec![self.primary.clone()]
        } else {
            vec![self.primary.clone(), self.fallback.clone()]
        }
    }
}

/// Toggle rule: openai backs up gemini, gemini backs up everything else.
pub fn toggle_fallback(primary: &str) -> &'static str {
    if primary == "gemini" {
        "openai"
    } else {
        "gemini"
    }
}

/// Selects providers per platform and stage.
#[derive(Clone)]
pub struct ModelRouter {
    policies: Arc<dyn PlatformPolicyProvider>,
    pipeline: PipelineConfig,
    breaker: Arc<CircuitBreaker>,
}

impl ModelRouter {
    pub fn new(
        policies: Arc<dyn PlatformPolicyProvider>,
        pipeline: PipelineConfig,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            policies,
            pipeline,
            breaker,
        }
    }

    /// Plan for the generate stage.
    pub fn select_providers(&self, platform: &str, overrides: &Overrides) -> RoutePlan {
        self.select(platform, Stage::Generate, overrides)
    }

    /// Plan for `stage` on `platform`.
    pub fn select(&self, platform: &str, stage: Stage, overrides: &Overrides) -> RoutePlan {
        let policy = self.policies.get_policy(platform);

        let caller_preferred = match stage {
            Stage::Judge => None,
            _ => overrides.preferred_model.as_deref(),
        };
        let primary_spec = overrides
            .stage_models
            .get(&stage)
            .map(String::as_str)
            .or(caller_preferred)
            .or(self.stage_model(stage))
            .unwrap_or(policy.default_model.as_str());
        let primary = ModelChoice::parse(primary_spec);

        let fallback = overrides
            .fallback_model
            .as_deref()
            .or(policy.fallback_model.as_deref())
            .map(ModelChoice::parse)
            .filter(|choice| choice.provider != primary.provider)
            .unwrap_or_else(|| ModelChoice::provider(toggle_fallback(&primary.provider)));

        let mut plan = RoutePlan {
            primary,
            fallback,
            swapped: false,
        };

        let primary_up = self.breaker.is_available(&plan.primary.provider);
        if !primary_up && self.breaker.is_available(&plan.fallback.provider) {
            tracing::info!(
                platform = %platform,
                stage = %stage,
                primary = %plan.primary,
                fallback = %plan.fallback,
                "Primary circuit open, routing to fallback first"
            );
            std::mem::swap(&mut plan.primary, &mut plan.fallback);
            plan.swapped = true;
        }

        plan
    }

    fn stage_model(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Generate => self.pipeline.generator_model.as_deref(),
            Stage::Critique => self.pipeline.critic_model.as_deref(),
            Stage::Improve => self.pipeline.improver_model.as_deref(),
            Stage::Judge => Some(self.pipeline.judge_model.as_str()),
        }
    }
}

impl std::fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRouter")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
