//! Provider registry for runtime provider lookup.
//!
//! A name-indexed registry of boxed chat providers. Only providers whose API
//! key was configured at startup are ever registered.

use std::collections::BTreeMap;

use mgdi_types::chat::{ModelInfo, ProviderInfo};

use super::box_provider::BoxLlmProvider;

pub struct ProviderRegistry {
    providers: BTreeMap<String, BoxLlmProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Register a provider under its own (lowercased) name.
    ///
    /// If a provider with this name already exists, it is replaced.
    pub fn register(&mut self, provider: BoxLlmProvider) {
        self.providers
            .insert(provider.name().to_lowercase(), provider);
    }

    /// Look up a provider by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&BoxLlmProvider> {
        self.providers.get(&name.trim().to_lowercase())
    }

    /// Registered provider names, sorted.
    pub fn list_names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Availability and model list per registered provider.
    pub fn provider_info(&self) -> BTreeMap<String, ProviderInfo> {
        self.providers
            .iter()
            .map(|(name, provider)| {
                (
                    name.clone(),
                    ProviderInfo {
                        available: true,
                        models: provider.available_models(),
                    },
                )
            })
            .collect()
    }

    /// Every model of every registered provider, grouped by provider name.
    pub fn models(&self) -> Vec<ModelInfo> {
        self.providers
            .iter()
            .flat_map(|(name, provider)| {
                provider.available_models().into_iter().map(|model| ModelInfo {
                    id: model.clone(),
                    provider: name.clone(),
                    name: model,
                })
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
