//! Provider gateways.
//!
//! # Responsibilities
//! - Define the gateway contract every text-generation provider satisfies
//! - Hold the named registry the executor resolves providers from
//! - Ship the HTTP adapter for the built-in vendors
//!
//! # Design Decisions
//! - Gateways are trait objects so tests can script behavior per provider
//! - A gateway knows nothing about breakers, retries or deadlines

pub mod http;
pub mod registry;
pub mod types;

use async_trait::async_trait;

pub use http::HttpProvider;
pub use registry::{create_provider, ProviderRegistry};
pub use types::{ProviderError, ProviderKind, ProviderResponse};

/// A text-generation backend.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Registry key and breaker key of this provider.
    fn name(&self) -> &str;

    /// Produce text for `prompt`, using `model` when given and the
    /// provider's default model otherwise.
    async fn generate(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError>;
}
