//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast → run_batch aborts its tasks → CANCELLED outcomes
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
