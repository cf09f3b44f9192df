//! Configuration file for provider options
//!
//! Stored as `config.toml` in `~/.social-login/`. Provider sections are keyed by
//! provider id and hold that provider's [`LoadOptions`].
//!
//! # File Structure
//!
//! ```toml
//! load_policy = "poison"
//!
//! [providers.github]
//! app_id = "Iv1.0123456789abcdef"
//! gatekeeper = "https://gatekeeper.example.com"
//! redirect = "http://localhost:3000/"
//! scope = ["user", "repo"]
//!
//! [providers.facebook]
//! app_id = "1234567890"
//! version = "v18.0"
//! ```
//!
//! `SOCIAL_LOGIN_<PROVIDER>_APP_ID` environment variables override `app_id`.

use crate::error::{Error, Result};
use crate::memoizer::LoadPolicy;
use crate::options::LoadOptions;
use crate::provider::ProviderId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// The name of the configuration file
const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the configuration directory under the home directory
const CONFIG_DIR_NAME: &str = ".social-login";

/// Parsed configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct SocialConfig {
    /// What happens to a provider whose load failed
    pub load_policy: LoadPolicy,
    /// Per-provider load options
    pub providers: BTreeMap<ProviderId, LoadOptions>,
}

/// On-disk shape, with provider keys still unchecked
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    load_policy: LoadPolicy,
    providers: HashMap<String, LoadOptions>,
}

impl TryFrom<RawConfig> for SocialConfig {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let providers = raw
            .providers
            .into_iter()
            .map(|(key, options)| Ok((key.parse::<ProviderId>()?, options)))
            .collect::<Result<_>>()?;

        Ok(Self {
            load_policy: raw.load_policy,
            providers,
        })
    }
}

impl SocialConfig {
    /// Parse a TOML document
    ///
    /// Unknown provider sections are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, or an empty configuration if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Load from the default path and apply environment overrides
    pub fn from_default_path() -> Result<Self> {
        let mut config = Self::load(&default_config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// Apply `SOCIAL_LOGIN_<PROVIDER>_APP_ID` overrides from the environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::ALL {
            if let Some(app_id) = lookup(&app_id_env_var(id)).filter(|v| !v.is_empty()) {
                self.providers.entry(id).or_default().app_id = app_id;
            }
        }
    }

    /// Options for `provider`, empty when not configured
    pub fn options(&self, provider: ProviderId) -> LoadOptions {
        self.providers.get(&provider).cloned().unwrap_or_default()
    }

    /// Providers with a configuration section
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }
}

/// Environment variable overriding the app id of `provider`
pub fn app_id_env_var(provider: ProviderId) -> String {
    format!("SOCIAL_LOGIN_{}_APP_ID", provider.as_str().to_uppercase())
}

/// Get the default configuration directory (`~/.social-login`)
pub fn default_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the default configuration file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
}
