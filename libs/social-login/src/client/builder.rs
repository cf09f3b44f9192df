//! Social login client builder

use super::SocialLogin;
use crate::config::SocialConfig;
use crate::memoizer::{LoadMemoizer, LoadPolicy};
use crate::registry::{Adapter, ProviderRegistry};

/// Builder for creating a [`SocialLogin`] client
#[derive(Default)]
pub struct SocialLoginBuilder {
    registry: Option<ProviderRegistry>,
    policy: LoadPolicy,
}

impl SocialLoginBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a prepared provider registry
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register an adapter
    pub fn register_provider(mut self, adapter: impl Into<Adapter>) -> Self {
        let registry = self.registry.take().unwrap_or_default();
        self.registry = Some(registry.register(adapter));
        self
    }

    /// Set what happens after a failed load
    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply client-level settings from a configuration file
    pub fn with_config(mut self, config: &SocialConfig) -> Self {
        self.policy = config.load_policy;
        self
    }

    /// Build the client
    pub fn build(self) -> SocialLogin {
        SocialLogin {
            registry: self.registry.unwrap_or_default(),
            memoizer: LoadMemoizer::new(self.policy),
        }
    }
}
