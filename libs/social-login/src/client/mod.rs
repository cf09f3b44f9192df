//! High-level client API

mod builder;

pub use builder::SocialLoginBuilder;

use crate::error::Result;
use crate::memoizer::{LoadMemoizer, LoadPolicy, LoadState};
use crate::options::LoadOptions;
use crate::provider::ProviderId;
use crate::registry::{Adapter, ProviderRegistry};
use crate::user::SocialUser;
use std::sync::Arc;

/// Uniform login/logout over the registered providers
///
/// Every operation loads the provider first, exactly once per provider for the
/// lifetime of this client.
pub struct SocialLogin {
    registry: ProviderRegistry,
    memoizer: LoadMemoizer,
}

impl SocialLogin {
    /// Create a client over `registry` with the default load policy
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::builder().with_registry(registry).build()
    }

    /// Create a client builder
    pub fn builder() -> SocialLoginBuilder {
        SocialLoginBuilder::default()
    }

    /// Log in with `provider` and return the canonical user record
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use social_login::{LoadOptions, ProviderId, RecordingNavigator, SocialLogin};
    /// use social_login::providers::GithubProvider;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> social_login::Result<()> {
    /// let client = SocialLogin::builder()
    ///     .register_provider(GithubProvider::new(Arc::new(RecordingNavigator::new())))
    ///     .build();
    ///
    /// let user = client
    ///     .social_login(ProviderId::Github, &LoadOptions::new("ghp_personal_token"))
    ///     .await?;
    /// println!("Logged in as {}", user.profile.name);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Redirect-flow providers without a session navigate away and the returned
    /// future never completes in this process.
    pub async fn social_login(
        &self,
        provider: ProviderId,
        options: &LoadOptions,
    ) -> Result<SocialUser> {
        let adapter = self.load_provider_once(provider, options).await?;
        Ok(adapter.login(options).await?)
    }

    /// Log out of `provider`
    pub async fn social_logout(&self, provider: ProviderId, options: &LoadOptions) -> Result<()> {
        let adapter = self.load_provider_once(provider, options).await?;
        Ok(adapter.logout().await?)
    }

    /// Ensure `provider` is loaded and return its adapter
    ///
    /// Concurrent callers share one load. Options of callers after the first
    /// are ignored.
    pub async fn load_provider_once(
        &self,
        provider: ProviderId,
        options: &LoadOptions,
    ) -> Result<Arc<Adapter>> {
        let adapter = self.registry.get(provider)?;
        self.memoizer.ensure_loaded(&adapter, options).await?;
        Ok(adapter)
    }

    /// Current load state of `provider`
    pub fn load_state(&self, provider: ProviderId) -> LoadState {
        self.memoizer.state(provider)
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.memoizer.policy()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}
