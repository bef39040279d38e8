//! Shared scripted gateways for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use content_orchestrator::config::OrchestratorConfig;
use content_orchestrator::pipeline::Orchestrator;
use content_orchestrator::providers::{
    ProviderError, ProviderGateway, ProviderRegistry, ProviderResponse,
};

/// Reply function: (prompt, zero-based call index) → content or error.
pub type Script = Box<dyn Fn(&str, usize) -> Result<String, ProviderError> + Send + Sync>;

/// In-memory gateway that answers from a script and records every prompt.
pub struct ScriptedGateway {
    name: String,
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(name: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Answers every stage sensibly; the judge ranks B first.
    pub fn healthy(name: &str) -> Arc<Self> {
        let owner = name.to_string();
        Self::new(name, Box::new(move |prompt, n| Ok(stage_reply(&owner, prompt, n))))
    }

    /// Fails every call with `message`.
    pub fn failing(name: &str, message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(name, Box::new(move |_, _| Err(ProviderError::other(message.clone()))))
    }

    /// Healthy, but every call first sleeps for `delay`.
    pub fn slow(name: &str, delay: Duration) -> Arc<Self> {
        let owner = name.to_string();
        Arc::new(Self {
            name: name.to_string(),
            script: Box::new(move |prompt, n| Ok(stage_reply(&owner, prompt, n))),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of received prompts containing `marker`.
    pub fn prompts_containing(&self, marker: &str) -> usize {
        self.prompts().iter().filter(|p| p.contains(marker)).count()
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let content = (self.script)(prompt, n)?;
        Ok(ProviderResponse {
            content,
            input_tokens: 12,
            output_tokens: 34,
            latency_ms: 5.0,
            provider_name: self.name.clone(),
            model_name: model.unwrap_or("scripted-model").to_string(),
        })
    }
}

pub const JUDGE_VERDICT: &str = r#"{"A": 70, "B": 90, "C": 80, "ranking": ["B", "C", "A"]}"#;

/// Deterministic reply for whichever stage the prompt belongs to.
pub fn stage_reply(owner: &str, prompt: &str, n: usize) -> String {
    if prompt.contains("Blind Judge") {
        JUDGE_VERDICT.to_string()
    } else if prompt.contains("Critical Reviewer") {
        format!("Critiqued post from {owner} (call {n}) #one #two #three")
    } else if prompt.contains("Content Synthesizer") {
        format!("Synthesized post from {owner} (call {n}) #one #two #three")
    } else {
        format!("First draft from {owner} (call {n}) #one #two #three")
    }
}

/// Registry holding the given gateways.
pub fn registry(gateways: &[Arc<ScriptedGateway>]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for gateway in gateways {
        registry.register(gateway.clone());
    }
    registry
}

/// Healthy gateways for the four built-in provider names.
pub fn healthy_fleet() -> Vec<Arc<ScriptedGateway>> {
    ["openai", "anthropic", "gemini", "xai"]
        .into_iter()
        .map(ScriptedGateway::healthy)
        .collect()
}

/// Orchestrator over `gateways` with a fixed shuffle seed.
pub fn orchestrator(gateways: &[Arc<ScriptedGateway>]) -> Orchestrator {
    let mut config = OrchestratorConfig::default();
    config.pipeline.shuffle_seed = Some(7);
    Orchestrator::from_config(&config, registry(gateways))
}
