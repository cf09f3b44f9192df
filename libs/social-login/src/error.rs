//! Error types
//!
//! Two layers:
//! - [`SocialError`]: the normalized, provider-tagged error every adapter
//!   operation fails with. It carries the raw vendor payload untouched.
//! - [`Error`]: the crate-level error returned by the dispatcher and the
//!   configuration loader. Adapter failures pass through it unchanged as
//!   [`Error::Provider`].

use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure category of a [`SocialError`], stable per failure site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// SDK failed to initialize, or a required option is missing
    Load,
    /// Interactive authentication was rejected or cancelled
    Auth,
    /// Session-presence query failed
    CheckLogin,
    /// Token exchange or retrieval failed, including "no token available"
    AccessToken,
    /// Profile fetch after a successful authentication failed
    GetProfile,
    /// Vendor does not support logout, or logout failed
    Logout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Auth => "auth",
            Self::CheckLogin => "check_login",
            Self::AccessToken => "access_token",
            Self::GetProfile => "get_profile",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized adapter error
///
/// `provider` is always the adapter that raised it. `error` is the original
/// vendor payload (`Null` when the vendor gave nothing) and is kept for
/// diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{provider} {kind} error: {description}")]
pub struct SocialError {
    pub provider: ProviderId,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub description: String,
    pub error: serde_json::Value,
}

impl SocialError {
    /// Create an error without a vendor payload
    pub fn new(provider: ProviderId, kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            description: description.into(),
            error: serde_json::Value::Null,
        }
    }

    /// Attach the raw vendor payload
    pub fn with_error(mut self, error: impl Into<serde_json::Value>) -> Self {
        self.error = error.into();
        self
    }

    pub fn load(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Load, description)
    }

    pub fn auth(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Auth, description)
    }

    pub fn check_login(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::CheckLogin, description)
    }

    pub fn access_token(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::AccessToken, description)
    }

    pub fn get_profile(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::GetProfile, description)
    }

    pub fn logout(provider: ProviderId, description: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Logout, description)
    }
}

/// Result type alias for adapter operations
pub type SocialResult<T> = std::result::Result<T, SocialError>;

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    /// An adapter operation failed
    #[error(transparent)]
    Provider(#[from] SocialError),

    /// The provider exists but no adapter was registered for it
    #[error("Provider not registered: {0}")]
    ProviderNotRegistered(ProviderId),

    /// The provider identifier is not one of the supported providers
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the normalized adapter error, if this is one
    pub fn as_social(&self) -> Option<&SocialError> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for dispatcher and configuration operations
pub type Result<T> = std::result::Result<T, Error>;
