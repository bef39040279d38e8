//! Breaker-aware execution over an ordered list of providers.
//!
//! # Responsibilities
//! - Try candidates in order, skipping those whose circuit is open
//! - Bound every call with the per-call deadline
//! - Report each outcome to the circuit breaker
//! - Aggregate total failure into one error carrying the last cause
//!
//! # Data Flow
//! ```text
//! candidates[]
//!     → breaker.is_available? (no: skip)
//!     → with_deadline(gateway.generate)
//!     → Ok: record_success, return
//!     → Err: record_failure, classify, maybe retry same provider, next
//! ```
//!
//! # Design Decisions
//! - First success wins; later candidates are never called
//! - Falling back to the next provider happens regardless of the
//!   classification, which only governs same-provider retries

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::{OrchestratorConfig, RetryConfig};
use crate::observability::metrics;
use crate::providers::{ProviderError, ProviderRegistry, ProviderResponse};
use crate::resilience::backoff::retry_delay;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::retries::{classify_error, Classification, ErrorKind};
use crate::resilience::timeouts::with_deadline;
use crate::routing::ModelChoice;

/// Aggregated failure of one execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Every candidate was skipped because its circuit is open.
    #[error("all providers unavailable (circuits open: {})", providers.join(", "))]
    AllProvidersUnavailable { providers: Vec<String> },

    /// Every callable candidate failed.
    #[error("all providers failed (tried: {}); last error: {last_error}", attempted.join(", "))]
    AllProvidersFailed {
        attempted: Vec<String>,
        #[source]
        last_error: ProviderError,
        classification: Classification,
    },

    #[error("no provider candidates given")]
    NoCandidates,
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::AllProvidersUnavailable { .. } => ErrorKind::AllProvidersUnavailable,
            ExecutionError::AllProvidersFailed { classification, .. } => classification.kind,
            ExecutionError::NoCandidates => ErrorKind::Unknown,
        }
    }
}

pub type ExecutionResult = Result<ProviderResponse, ExecutionError>;

/// Runs prompts against providers with fallback, deadlines and breaker bookkeeping.
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    registry: Arc<ProviderRegistry>,
    breaker: Arc<CircuitBreaker>,
    call_timeout: Duration,
    retry: RetryConfig,
}

impl ResilientExecutor {
    pub fn new(registry: Arc<ProviderRegistry>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            registry,
            breaker,
            call_timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
        }
    }

    pub fn from_config(
        config: &OrchestratorConfig,
        registry: Arc<ProviderRegistry>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self::new(registry, breaker)
            .with_call_timeout(Duration::from_secs(config.timeouts.provider_call_secs))
            .with_retry_config(config.retries.clone())
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Run `prompt` against `candidates` in order until one succeeds.
    pub async fn execute(&self, candidates: &[ModelChoice], prompt: &str) -> ExecutionResult {
        if candidates.is_empty() {
            return Err(ExecutionError::NoCandidates);
        }

        let mut skipped = Vec::new();
        let mut attempted = Vec::new();
        let mut last_failure: Option<(ProviderError, Classification)> = None;

        for candidate in candidates {
            let name = candidate.provider.as_str();

            if !self.breaker.is_available(name) {
                tracing::info!(provider = %name, "Skipping provider, circuit open");
                metrics::record_provider_skipped(name);
                skipped.push(name.to_string());
                continue;
            }

            attempted.push(name.to_string());
            match self.call_with_retries(candidate, prompt).await {
                Ok(response) => return Ok(response),
                Err(failure) => last_failure = Some(failure),
            }
        }

        match last_failure {
            Some((last_error, classification)) => {
                tracing::error!(
                    attempted = ?attempted,
                    skipped = ?skipped,
                    kind = %classification.kind,
                    error = %last_error,
                    "All providers failed"
                );
                Err(ExecutionError::AllProvidersFailed {
                    attempted,
                    last_error,
                    classification,
                })
            }
            None => {
                tracing::error!(providers = ?skipped, "All provider circuits open");
                Err(ExecutionError::AllProvidersUnavailable { providers: skipped })
            }
        }
    }

    /// Call one provider, retrying it while the budget and classifier allow.
    async fn call_with_retries(
        &self,
        candidate: &ModelChoice,
        prompt: &str,
    ) -> Result<ProviderResponse, (ProviderError, Classification)> {
        let name = candidate.provider.as_str();
        let mut attempt = 0u32;

        loop {
            match self.call_once(candidate, prompt).await {
                Ok(response) => {
                    self.breaker.record_success(name);
                    return Ok(response);
                }
                Err(error) => {
                    self.breaker.record_failure(name);
                    let classification = classify_error(&error);

                    tracing::warn!(
                        provider = %name,
                        kind = %classification.kind,
                        retryable = classification.should_retry,
                        attempt,
                        status = ?error.status(),
                        error = %error,
                        "Provider call failed"
                    );

                    let may_retry = attempt < self.retry.max_same_provider_retries
                        && classification.should_retry
                        && self.breaker.is_available(name);
                    if !may_retry {
                        return Err((error, classification));
                    }

                    attempt += 1;
                    let delay = retry_delay(attempt, classification.wait_hint, &self.retry);
                    tracing::debug!(
                        provider = %name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying same provider"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn call_once(
        &self,
        candidate: &ModelChoice,
        prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let name = candidate.provider.as_str();
        let gateway = self
            .registry
            .get(name)
            .ok_or_else(|| ProviderError::Unregistered(name.to_string()))?;

        let start = Instant::now();
        let result = with_deadline(
            name,
            self.call_timeout,
            gateway.generate(prompt, candidate.model.as_deref()),
        )
        .await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::record_provider_call(name, outcome, start.elapsed());
        result
    }
}
