//! Multi-provider content generation with resilience.
//!
//! # Architecture Overview
//!
//! ```text
//!   idea + platforms
//!         │
//!         ▼
//!   ┌──────────────┐   one task per platform
//!   │ pipeline     │──────────────────────────────┐
//!   │ run_batch    │                              │
//!   └──────────────┘                              ▼
//!                            ┌───────────────────────────────────────┐
//!                            │ Orchestrator::run_pipeline            │
//!                            │ generate → critique → improve → judge │
//!                            └───────────────┬───────────────────────┘
//!                                            │ per stage
//!                  ┌─────────────────────────┼─────────────────────────┐
//!                  ▼                         ▼                         ▼
//!           ┌────────────┐          ┌──────────────────┐       ┌──────────────┐
//!           │ routing    │          │ resilience       │       │ policy       │
//!           │ ModelRouter│─────────▶│ ResilientExecutor│       │ style, limits│
//!           └────────────┘          │ + CircuitBreaker │       │ validation   │
//!                                   └────────┬─────────┘       └──────────────┘
//!                                            ▼
//!                                   ┌──────────────────┐
//!                                   │ providers        │
//!                                   │ HTTP gateways    │
//!                                   └──────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod pipeline;
pub mod providers;
pub mod routing;

// Platform rules
pub mod policy;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::OrchestratorConfig;
pub use lifecycle::Shutdown;
pub use pipeline::{run_batch, BatchReport, Orchestrator, PipelineError, PipelineResult};
pub use policy::Overrides;
pub use providers::{ProviderGateway, ProviderRegistry};
pub use resilience::{CircuitBreaker, ResilientExecutor};
