//! Content orchestrator CLI.
//!
//! Fans one idea out to several platforms, runs the generate, critique,
//! improve and blind-judge pipeline for each, and prints a JSON report.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use content_orchestrator::config::{load_config, OrchestratorConfig};
use content_orchestrator::lifecycle::{signals, Shutdown};
use content_orchestrator::observability::{logging, metrics};
use content_orchestrator::pipeline::{run_batch, Orchestrator};
use content_orchestrator::policy::{ConfigPolicies, Overrides, PlatformPolicyProvider};
use content_orchestrator::providers::ProviderRegistry;

#[derive(Debug, Parser)]
#[command(name = "content-orchestrator", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the pipeline for one idea on one or more platforms
    Generate {
        #[arg(long)]
        idea: String,

        /// Target platform; repeat for several
        #[arg(long = "platform", required = true)]
        platforms: Vec<String>,

        /// Preferred model spec (provider, provider:model or a model id)
        #[arg(long)]
        model: Option<String>,

        /// Fallback model spec
        #[arg(long)]
        fallback: Option<String>,

        /// Override the platform character limit
        #[arg(long)]
        char_limit: Option<usize>,

        /// Extra style notes passed to every stage
        #[arg(long)]
        notes: Option<String>,

        /// Fixed seed for the judge shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List platform policies
    Platforms,
    /// List configured providers and whether a key is present
    Providers,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => OrchestratorConfig::default(),
    };

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Command::Generate {
            idea,
            platforms,
            model,
            fallback,
            char_limit,
            notes,
            seed,
        } => {
            if seed.is_some() {
                config.pipeline.shuffle_seed = seed;
            }

            let registry = ProviderRegistry::from_config(&config)?;
            let orchestrator = Arc::new(Orchestrator::from_config(&config, registry));
            let overrides = Overrides {
                preferred_model: model,
                fallback_model: fallback,
                char_limit,
                style_notes: notes,
                ..Overrides::default()
            };

            let shutdown = Arc::new(Shutdown::new());
            let signal_task = tokio::spawn(signals::cancel_on_ctrl_c(shutdown.clone()));

            let report = run_batch(
                orchestrator.clone(),
                &idea,
                &platforms,
                &overrides,
                &shutdown,
            )
            .await;
            signal_task.abort();
            let all_failed = report.total_platforms > 0 && report.success_count == 0;

            let output = json!({
                "report": report,
                "circuits": orchestrator.circuit_status(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);

            if all_failed {
                return Err("every platform failed".into());
            }
        }
        Command::Platforms => {
            let policies = ConfigPolicies::from_config(&config);
            let table: BTreeMap<String, _> = policies
                .platforms()
                .into_iter()
                .map(|name| {
                    let policy = policies.get_policy(&name);
                    (name, policy)
                })
                .collect();
            let output = json!({
                "platforms": table,
                "default": config.default_policy,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Providers => {
            let providers: Vec<_> = config
                .effective_providers()
                .into_iter()
                .map(|p| {
                    let env_var = p
                        .api_key_env
                        .clone()
                        .unwrap_or_else(|| p.kind.default_api_key_env().to_string());
                    let has_key = std::env::var(&env_var).is_ok_and(|k| !k.trim().is_empty());
                    json!({
                        "name": p.name,
                        "kind": p.kind,
                        "default_model": p
                            .default_model
                            .clone()
                            .unwrap_or_else(|| p.kind.default_model().to_string()),
                        "api_key_env": env_var,
                        "api_key_present": has_key,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }
    }

    Ok(())
}
