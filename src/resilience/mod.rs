//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Prompt for a stage:
//!     → executor.rs (ordered candidates, skip open circuits)
//!     → timeouts.rs (per-call deadline)
//!     → On failure: retries.rs (classify), backoff.rs (same-provider delay)
//!     → circuit_breaker.rs (count failures, open at threshold)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every provider call has a deadline
//! - Circuit breaker is one shared instance, injected, never global
//! - Classification is pure so it can be tested without providers

pub mod backoff;
pub mod circuit_breaker;
pub mod executor;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitStatus};
pub use executor::{ExecutionError, ExecutionResult, ResilientExecutor};
pub use retries::{classify, classify_error, Classification, ErrorKind};
