//! Concurrent fan-out of one idea to many platforms.
//!
//! # Design Decisions
//! - One task per platform on a `JoinSet`; siblings never affect each other
//! - Results keep request order regardless of completion order
//! - Shutdown aborts every in-flight task; those platforms report CANCELLED
//! - A task that panics reports INTERNAL_ERROR

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::lifecycle::Shutdown;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::types::{PipelineError, PipelineOutcome, Stage, Version};
use crate::policy::Overrides;
use crate::resilience::ErrorKind;

/// Provenance of one stage output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftProvenance {
    pub stage: Stage,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: f64,
}

/// Per-platform entry of a batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformOutcome {
    pub platform: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_model: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drafts: Vec<DraftProvenance>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<Version, u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl PlatformOutcome {
    pub fn from_outcome(platform: &str, outcome: PipelineOutcome) -> Self {
        match outcome {
            Ok(result) => {
                let winning = result.winning_draft();
                let drafts = [&result.v1, &result.v2, &result.v3]
                    .into_iter()
                    .map(|d| DraftProvenance {
                        stage: d.stage,
                        provider: d.provider.clone(),
                        model: d.model.clone(),
                        input_tokens: d.input_tokens,
                        output_tokens: d.output_tokens,
                        latency_ms: d.latency_ms,
                    })
                    .collect();

                Self {
                    platform: platform.to_string(),
                    success: true,
                    content: Some(winning.content.clone()),
                    char_count: Some(winning.content.chars().count()),
                    winner: Some(result.winner),
                    winner_model: Some(winning.model.clone()),
                    drafts,
                    scores: result.version_scores(),
                    error: None,
                    error_code: None,
                }
            }
            Err(e) => Self::failure(platform, e.kind(), e.to_string()),
        }
    }

    pub fn failure(platform: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            success: false,
            content: None,
            char_count: None,
            winner: None,
            winner_model: None,
            drafts: Vec::new(),
            scores: BTreeMap::new(),
            error: Some(message.into()),
            error_code: Some(kind.code()),
        }
    }
}

/// Aggregate of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub request_id: Uuid,
    pub results: Vec<PlatformOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_platforms: usize,
}

impl BatchReport {
    fn new(request_id: Uuid, results: Vec<PlatformOutcome>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            request_id,
            total_platforms: results.len(),
            failure_count: results.len() - success_count,
            success_count,
            results,
        }
    }

    pub fn get(&self, platform: &str) -> Option<&PlatformOutcome> {
        self.results.iter().find(|r| r.platform == platform)
    }
}

/// Run `idea` for every platform concurrently.
pub async fn run_batch(
    orchestrator: Arc<Orchestrator>,
    idea: &str,
    platforms: &[String],
    overrides: &Overrides,
    shutdown: &Shutdown,
) -> BatchReport {
    let request_id = Uuid::new_v4();
    let mut shutdown_rx = shutdown.subscribe();
    let mut cancelled = shutdown.is_triggered();

    tracing::info!(%request_id, platforms = ?platforms, "Batch started");

    let mut slots: Vec<Option<PlatformOutcome>> = vec![None; platforms.len()];
    let mut tasks = JoinSet::new();

    if !cancelled {
        for (index, platform) in platforms.iter().enumerate() {
            let orchestrator = Arc::clone(&orchestrator);
            let idea = idea.to_string();
            let platform = platform.clone();
            let overrides = overrides.clone();
            tasks.spawn(async move {
                let outcome = orchestrator.run_pipeline(&idea, &platform, &overrides).await;
                (index, PlatformOutcome::from_outcome(&platform, outcome))
            });
        }
    }

    let mut listening = true;
    while !tasks.is_empty() {
        tokio::select! {
            joined = tasks.join_next() => match joined {
                Some(Ok((index, outcome))) => slots[index] = Some(outcome),
                Some(Err(e)) if e.is_panic() => {
                    tracing::error!(error = %e, "Platform task panicked");
                }
                Some(Err(_)) | None => {}
            },
            signal = shutdown_rx.recv(), if listening => match signal {
                Err(RecvError::Closed) => listening = false,
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    tracing::warn!(%request_id, in_flight = tasks.len(), "Batch cancelled");
                    cancelled = true;
                    tasks.abort_all();
                    while let Some(joined) = tasks.join_next().await {
                        if let Ok((index, outcome)) = joined {
                            slots[index] = Some(outcome);
                        }
                    }
                }
            },
        }
    }

    let results: Vec<PlatformOutcome> = slots
        .into_iter()
        .zip(platforms)
        .map(|(slot, platform)| {
            slot.unwrap_or_else(|| {
                if cancelled {
                    PlatformOutcome::from_outcome(platform, Err(PipelineError::Cancelled))
                } else {
                    PlatformOutcome::failure(
                        platform,
                        ErrorKind::Internal,
                        "pipeline task ended unexpectedly",
                    )
                }
            })
        })
        .collect();

    let report = BatchReport::new(request_id, results);
    tracing::info!(
        %request_id,
        success = report.success_count,
        failure = report.failure_count,
        "Batch completed"
    );
    report
}
