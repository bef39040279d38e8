//! Four-stage content pipeline.
//!
//! # Data Flow
//! ```text
//! (idea, platform, overrides)
//!     → Generate (validated, one retry) → v1
//!     → Critique(v1)                    → v2
//!     → Improve(v1, v2)                 → v3
//!     → shuffle → BlindJudge → reveal   → winner
//! ```
//!
//! # Design Decisions
//! - Stages are strictly sequential; each routes and executes on its own
//! - Only the generate stage validates content
//! - The shuffle is drawn once per run and used for both anonymize and reveal
//! - A judge that returns no usable verdict makes v1 the winner

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{OrchestratorConfig, PlatformPolicy};
use crate::observability::metrics;
use crate::pipeline::judge::BlindJudge;
use crate::pipeline::prompts;
use crate::pipeline::shuffle::{anonymize, reveal, shuffle};
use crate::pipeline::types::{
    Draft, PipelineError, PipelineOutcome, PipelineResult, ShuffleMap, Stage, Version,
};
use crate::policy::{
    ConfigPolicies, OutputValidator, Overrides, PlatformPolicyProvider, PolicyStyleInstructions,
    StyleInstructionProvider, Validator,
};
use crate::providers::ProviderRegistry;
use crate::resilience::{CircuitBreaker, CircuitStatus, ResilientExecutor};
use crate::routing::ModelRouter;

/// Attempts the generate stage gets before validation failure is fatal.
const GENERATE_ATTEMPTS: u32 = 2;

/// Which circuits an operator reset applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResetTarget {
    All,
    Provider(String),
}

impl ResetTarget {
    /// `"all"` (any case) means every circuit; anything else names a provider.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            ResetTarget::All
        } else {
            ResetTarget::Provider(value.trim().to_lowercase())
        }
    }
}

/// Runs pipelines against shared routing and breaker state.
pub struct Orchestrator {
    executor: ResilientExecutor,
    router: ModelRouter,
    judge: BlindJudge,
    policies: Arc<dyn PlatformPolicyProvider>,
    style: Arc<dyn StyleInstructionProvider>,
    validator: Arc<dyn Validator>,
    rng: Mutex<StdRng>,
}

impl Orchestrator {
    /// Build from configuration around an already populated registry.
    pub fn from_config(config: &OrchestratorConfig, registry: ProviderRegistry) -> Self {
        let breaker = Arc::new(CircuitBreaker::from_config(&config.circuit_breaker));
        let executor = ResilientExecutor::from_config(config, Arc::new(registry), breaker.clone());
        let policies: Arc<dyn PlatformPolicyProvider> = Arc::new(ConfigPolicies::from_config(config));
        let router = ModelRouter::new(policies.clone(), config.pipeline.clone(), breaker);

        let orchestrator = Self::new(executor, router, policies);
        match config.pipeline.shuffle_seed {
            Some(seed) => orchestrator.with_seed(seed),
            None => orchestrator,
        }
    }

    pub fn new(
        executor: ResilientExecutor,
        router: ModelRouter,
        policies: Arc<dyn PlatformPolicyProvider>,
    ) -> Self {
        Self {
            judge: BlindJudge::new(executor.clone()),
            executor,
            router,
            policies,
            style: Arc::new(PolicyStyleInstructions),
            validator: Arc::new(OutputValidator),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_style(mut self, style: Arc<dyn StyleInstructionProvider>) -> Self {
        self.style = style;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    /// Make the judge shuffle deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn policies(&self) -> &Arc<dyn PlatformPolicyProvider> {
        &self.policies
    }

    /// Run the full pipeline for one platform.
    pub async fn run_pipeline(
        &self,
        idea: &str,
        platform: &str,
        overrides: &Overrides,
    ) -> PipelineOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %request_id, platform = %platform);

        async {
            tracing::info!("Pipeline started");
            let outcome = self.run_stages(idea, platform, overrides).await;

            match &outcome {
                Ok(result) => {
                    tracing::info!(
                        winner = %result.winner,
                        model = %result.winning_draft().model,
                        chars = result.final_content().chars().count(),
                        "Pipeline completed"
                    );
                    metrics::record_pipeline(platform, "success");
                }
                Err(e) => {
                    tracing::error!(code = e.code(), error = %e, "Pipeline failed");
                    metrics::record_pipeline(platform, e.code());
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, idea: &str, platform: &str, overrides: &Overrides) -> PipelineOutcome {
        let policy = overrides.apply_to(&self.policies.get_policy(platform));
        let style = self.style.build_instructions(platform, &policy, overrides);

        let v1 = self.generate(idea, platform, &policy, &style, overrides).await?;

        let prompt = prompts::critique(&v1.content, platform, &style);
        let v2 = self.run_stage(Stage::Critique, platform, &prompt, overrides).await?;

        let prompt = prompts::improve(&v1.content, &v2.content, platform, &style);
        let v3 = self.run_stage(Stage::Improve, platform, &prompt, overrides).await?;

        let shuffle_map = self.draw_shuffle();
        let texts = anonymize(&shuffle_map, &v1.content, &v2.content, &v3.content);
        let plan = self.router.select(platform, Stage::Judge, overrides);
        let judge = self
            .judge
            .judge(platform, &texts, &style, &plan.candidates())
            .await
            .map_err(|source| PipelineError::Stage {
                stage: Stage::Judge,
                source,
            })?;

        let winner = match judge.winner() {
            Some(label) => reveal(&shuffle_map, label),
            None => {
                tracing::warn!("Judge gave no verdict, defaulting to v1");
                Version::V1
            }
        };

        Ok(PipelineResult {
            platform: platform.to_string(),
            v1,
            v2,
            v3,
            shuffle_map,
            judge,
            winner,
        })
    }

    /// Generate v1, retrying the whole call once if validation rejects it.
    async fn generate(
        &self,
        idea: &str,
        platform: &str,
        policy: &PlatformPolicy,
        style: &str,
        overrides: &Overrides,
    ) -> Result<Draft, PipelineError> {
        let prompt = prompts::generation(idea, platform, style);
        let mut attempt = 1;

        loop {
            let draft = self
                .run_stage(Stage::Generate, platform, &prompt, overrides)
                .await?;
            let outcome = self.validator.validate(&draft.content, platform, policy);
            if outcome.passed {
                return Ok(draft);
            }

            let reason = outcome
                .reason
                .unwrap_or_else(|| "validation failed".to_string());
            tracing::warn!(
                attempt,
                provider = %draft.provider,
                chars = outcome.char_count,
                reason = %reason,
                "Generated draft rejected"
            );

            if attempt >= GENERATE_ATTEMPTS {
                return Err(PipelineError::ValidationFailed { reason });
            }
            attempt += 1;
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        platform: &str,
        prompt: &str,
        overrides: &Overrides,
    ) -> Result<Draft, PipelineError> {
        let plan = self.router.select(platform, stage, overrides);
        let response = self
            .executor
            .execute(&plan.candidates(), prompt)
            .await
            .map_err(|source| PipelineError::Stage { stage, source })?;

        tracing::debug!(
            stage = %stage,
            provider = %response.provider_name,
            model = %response.model_name,
            latency_ms = response.latency_ms,
            "Stage completed"
        );
        Ok(Draft::from_response(stage, response))
    }

    fn draw_shuffle(&self) -> ShuffleMap {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        shuffle(&mut *rng)
    }

    /// Breaker snapshot for every registered or previously failing provider.
    pub fn circuit_status(&self) -> BTreeMap<String, CircuitStatus> {
        let breaker = self.executor.breaker();
        let mut names = self.executor.registry().names();
        names.extend(breaker.known_providers());
        names
            .into_iter()
            .map(|name| {
                let status = breaker.status(&name);
                (name, status)
            })
            .collect()
    }

    /// Operator override closing one or every circuit.
    pub fn reset_circuit(&self, target: &ResetTarget) {
        let breaker = self.executor.breaker();
        match target {
            ResetTarget::All => breaker.reset_all(),
            ResetTarget::Provider(name) => breaker.reset(name),
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("executor", &self.executor)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
