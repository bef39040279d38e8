//! Named provider registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{OrchestratorConfig, ProviderConfig};
use crate::providers::http::HttpProvider;
use crate::providers::types::ProviderError;
use crate::providers::ProviderGateway;

/// Build a gateway from one provider entry.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ProviderGateway>, ProviderError> {
    let provider = HttpProvider::new(config)?;
    if !provider.has_credential() {
        tracing::warn!(
            provider = %config.name,
            kind = %config.kind,
            "Provider has no API key; calls will fail until one is set"
        );
    }
    Ok(Arc::new(provider))
}

/// Gateways keyed by provider name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn ProviderGateway>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an HTTP gateway for every configured provider.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        for provider in config.effective_providers() {
            registry.register(create_provider(&provider)?);
        }
        tracing::info!(providers = ?registry.names(), "Provider registry built");
        Ok(registry)
    }

    /// Add a gateway, replacing any previous one with the same name.
    pub fn register(&mut self, provider: Arc<dyn ProviderGateway>) {
        let name = provider.name().to_string();
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::debug!(provider = %name, "Replaced registered provider");
        }
    }

    /// Builder-style `register`.
    pub fn with(mut self, provider: Arc<dyn ProviderGateway>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderGateway>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;

    #[test]
    fn test_from_config_registers_every_kind() {
        let registry = ProviderRegistry::from_config(&OrchestratorConfig::default()).unwrap();
        assert_eq!(registry.names(), vec!["anthropic", "gemini", "openai", "xai"]);
        assert!(registry.get("openai").is_some());
        assert!(registry.get("mistral").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let config = ProviderConfig::for_kind(ProviderKind::Xai);
        let first = create_provider(&config).unwrap();
        let second = create_provider(&config).unwrap();

        let registry = ProviderRegistry::new().with(first).with(second);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("xai"));
    }
}
