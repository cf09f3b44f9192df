//! Provider identifiers and the adapter contract

use crate::error::{Error, SocialResult};
use crate::options::LoadOptions;
use crate::user::SocialUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::OnceCell;

/// Supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Amazon,
    Facebook,
    Github,
    Google,
    Instagram,
}

impl ProviderId {
    /// Every supported provider, in a stable order
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Amazon,
        ProviderId::Facebook,
        ProviderId::Github,
        ProviderId::Google,
        ProviderId::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::Facebook => "facebook",
            Self::Github => "github",
            Self::Google => "google",
            Self::Instagram => "instagram",
        }
    }

    /// Human-readable provider name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Amazon => "Login with Amazon",
            Self::Facebook => "Facebook",
            Self::Github => "GitHub",
            Self::Google => "Google",
            Self::Instagram => "Instagram",
        }
    }

    /// Whether the provider authenticates through a full-page redirect
    pub fn is_redirect_flow(&self) -> bool {
        matches!(self, Self::Github | Self::Instagram)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownProvider(s.to_string()))
    }
}

/// The five-operation contract every vendor adapter implements
///
/// `Session` is the vendor-specific payload produced by a successful
/// `login`/`check_login`; `generate_user` turns it into the canonical record.
/// Every failure is a [`crate::SocialError`] tagged with [`SocialProvider::id`].
#[async_trait]
pub trait SocialProvider: Send + Sync {
    /// Vendor payload of an authenticated session
    type Session: Send + Sync;

    /// Provider identifier
    fn id(&self) -> ProviderId;

    /// Load and initialize the vendor SDK
    ///
    /// Safe to call repeatedly: vendor initialization happens at most once per
    /// adapter. Redirect-flow adapters also complete an inbound OAuth callback
    /// here.
    async fn load(&self, options: &LoadOptions) -> SocialResult<()>;

    /// Return the existing session without starting a new handshake
    ///
    /// Delegates to [`SocialProvider::login`] when `options.auto_login` is set.
    /// Requires `load` to have resolved.
    async fn check_login(&self, options: &LoadOptions) -> SocialResult<Self::Session>;

    /// Start (or reuse) the vendor's interactive authentication
    ///
    /// Redirect-flow adapters navigate away when no session exists; the returned
    /// future then never completes in this process.
    async fn login(&self, options: &LoadOptions) -> SocialResult<Self::Session>;

    /// Normalize a session into the canonical user record
    ///
    /// Pure: no I/O, no adapter state.
    fn generate_user(&self, session: &Self::Session) -> SocialUser;

    /// End the vendor session
    async fn logout(&self) -> SocialResult<()>;
}

/// Runs a vendor initialization at most once
///
/// A successful run is sticky. A failed run is not stored, so the next call
/// tries again; callers that need the failure replayed rely on the dispatcher's
/// memoizer.
#[derive(Debug, Default)]
pub struct LoadOnce {
    cell: OnceCell<()>,
}

impl LoadOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, Fut>(&self, init: F) -> SocialResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = SocialResult<()>>,
    {
        self.cell.get_or_try_init(init).await.map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
