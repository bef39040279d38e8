//! Signal handling.
//!
//! # Design Decisions
//! - SIGINT (Ctrl-C) cancels the running batch through `Shutdown`
//! - A second Ctrl-C is left to the default handler once we stop listening

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Wait for Ctrl-C and trigger `shutdown`.
pub async fn cancel_on_ctrl_c(shutdown: Arc<Shutdown>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::warn!("Interrupt received, cancelling in-flight pipelines");
            shutdown.trigger();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for interrupt signal");
        }
    }
}
