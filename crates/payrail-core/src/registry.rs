//! # Provider Registry
//!
//! Name → provider map, built once by the application's composition root and
//! passed by reference to whatever serves requests.

use crate::error::{PaymentError, PaymentResult};
use crate::provider::SharedProvider;
use std::collections::HashMap;

/// Registered providers, keyed by [`Provider::name`](crate::Provider::name)
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, SharedProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its own name, replacing any previous one
    pub fn register(&mut self, provider: SharedProvider) {
        let name = provider.name().to_string();
        self.providers.insert(name, provider);
    }

    /// Register with builder pattern
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.register(provider);
        self
    }

    /// Look up a provider. An unknown name is a configuration error.
    pub fn get(&self, name: &str) -> PaymentResult<&SharedProvider> {
        self.providers
            .get(name)
            .ok_or_else(|| PaymentError::UnknownProvider(name.to_string()))
    }

    /// List all registered provider names, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
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
            .field("providers", &self.providers())
            .finish()
    }
}
