//! # Social Login
//!
//! One login/logout interface over several identity providers, each with its
//! own SDK loading, authentication flow and response shape.
//!
//! ## Features
//!
//! - **Uniform contract**: every vendor adapter implements the same five
//!   operations (`load`, `check_login`, `login`, `generate_user`, `logout`)
//! - **Load once**: a vendor SDK is initialized at most once, however many
//!   callers race for it
//! - **Normalized output**: a single [`SocialUser`] shape and a single
//!   provider-tagged [`SocialError`]
//! - **Host-agnostic**: scripts, vendor globals and navigation are reached
//!   through traits in [`host`] and the per-vendor SDK traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use social_login::{LoadOptions, ProviderId, RecordingNavigator, SocialLogin};
//! use social_login::providers::GithubProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SocialLogin::builder()
//!         .register_provider(GithubProvider::new(Arc::new(RecordingNavigator::new())))
//!         .build();
//!
//!     let user = client
//!         .social_login(ProviderId::Github, &LoadOptions::new("ghp_personal_token"))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&user)?);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod memoizer;
pub mod options;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod user;

// Re-export commonly used types
pub use client::{SocialLogin, SocialLoginBuilder};
pub use config::SocialConfig;
pub use error::{Error, ErrorKind, Result, SocialError, SocialResult};
pub use host::{CallbackParams, Navigator, RecordingNavigator, ScriptLoader, ScriptTag};
pub use memoizer::{LoadMemoizer, LoadPolicy, LoadState};
pub use options::{LoadOptions, merge_scopes};
pub use provider::{ProviderId, SocialProvider};
pub use registry::{Adapter, ProviderRegistry};
pub use user::{Expiry, Profile, SocialUser, Token};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::SocialLogin;
    pub use crate::error::{Error, Result, SocialError};
    pub use crate::options::LoadOptions;
    pub use crate::provider::{ProviderId, SocialProvider};
    pub use crate::user::SocialUser;
}
