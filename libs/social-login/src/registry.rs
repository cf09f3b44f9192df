//! Provider registry
//!
//! The set of providers is closed, so adapters are held as the [`Adapter`] enum
//! rather than trait objects. Each variant keeps its typed session; the enum only
//! exposes operations that run `login`/`check_login` and `generate_user` in the
//! same arm, so a [`SocialUser`] can only come from its own adapter's session.

use crate::error::{Error, Result, SocialResult};
use crate::options::LoadOptions;
use crate::provider::{ProviderId, SocialProvider};
use crate::providers::{
    AmazonProvider, FacebookProvider, GithubProvider, GoogleProvider, InstagramProvider,
};
use crate::user::SocialUser;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered vendor adapter
pub enum Adapter {
    Amazon(AmazonProvider),
    Facebook(FacebookProvider),
    Github(GithubProvider),
    Google(GoogleProvider),
    Instagram(InstagramProvider),
}

macro_rules! with_provider {
    ($adapter:expr, $provider:ident => $body:expr) => {
        match $adapter {
            Adapter::Amazon($provider) => $body,
            Adapter::Facebook($provider) => $body,
            Adapter::Github($provider) => $body,
            Adapter::Google($provider) => $body,
            Adapter::Instagram($provider) => $body,
        }
    };
}

impl Adapter {
    pub fn id(&self) -> ProviderId {
        with_provider!(self, provider => provider.id())
    }

    pub async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        with_provider!(self, provider => provider.load(options).await)
    }

    /// Existing session, normalized
    pub async fn check_login(&self, options: &LoadOptions) -> SocialResult<SocialUser> {
        with_provider!(self, provider => {
            let session = provider.check_login(options).await?;
            Ok(provider.generate_user(&session))
        })
    }

    /// Interactive login, normalized
    pub async fn login(&self, options: &LoadOptions) -> SocialResult<SocialUser> {
        with_provider!(self, provider => {
            let session = provider.login(options).await?;
            Ok(provider.generate_user(&session))
        })
    }

    pub async fn logout(&self) -> SocialResult<()> {
        with_provider!(self, provider => provider.logout().await)
    }
}

impl From<AmazonProvider> for Adapter {
    fn from(provider: AmazonProvider) -> Self {
        Self::Amazon(provider)
    }
}

impl From<FacebookProvider> for Adapter {
    fn from(provider: FacebookProvider) -> Self {
        Self::Facebook(provider)
    }
}

impl From<GithubProvider> for Adapter {
    fn from(provider: GithubProvider) -> Self {
        Self::Github(provider)
    }
}

impl From<GoogleProvider> for Adapter {
    fn from(provider: GoogleProvider) -> Self {
        Self::Google(provider)
    }
}

impl From<InstagramProvider> for Adapter {
    fn from(provider: InstagramProvider) -> Self {
        Self::Instagram(provider)
    }
}

/// Registry of vendor adapters, one per provider
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, Arc<Adapter>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own provider id
    ///
    /// Registering the same provider twice keeps the last adapter.
    pub fn register(mut self, adapter: impl Into<Adapter>) -> Self {
        let adapter = adapter.into();
        self.adapters.insert(adapter.id(), Arc::new(adapter));
        self
    }

    /// Get the adapter for a provider
    pub fn get(&self, id: ProviderId) -> Result<Arc<Adapter>> {
        self.adapters
            .get(&id)
            .cloned()
            .ok_or(Error::ProviderNotRegistered(id))
    }

    /// Registered provider ids, in [`ProviderId`] order
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.adapters.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.adapters.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
