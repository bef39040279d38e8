//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! (platform, stage, overrides)
//!     → router.rs (precedence rules over policy and pipeline config)
//!     → matcher.rs (model spec → provider + model)
//!     → breaker check (swap primary and fallback if needed)
//!     → RoutePlan { primary, fallback }
//! ```
//!
//! # Design Decisions
//! - Deterministic: same inputs and breaker state give the same plan
//! - Breaker logic stays in the breaker; routing only asks for availability

pub mod matcher;
pub mod router;

pub use matcher::{provider_for_model, ModelChoice};
pub use router::{toggle_fallback, ModelRouter, RoutePlan};
