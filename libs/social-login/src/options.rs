//! Per-provider load options

use serde::{Deserialize, Serialize};

/// Options passed to an adapter's `load`/`login`/`check_login`
///
/// Each adapter reads the subset it needs and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Vendor application / client ID
    pub app_id: String,
    /// Extra scopes requested on top of the vendor defaults
    pub scope: Vec<String>,
    /// Redirect URL for OAuth-redirect providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Base URL of a token-exchange gatekeeper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper: Option<String>,
    /// Let `check_login` start a login when no session exists
    pub auto_login: bool,
    /// Vendor SDK version (Facebook only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl LoadOptions {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn with_gatekeeper(mut self, gatekeeper: impl Into<String>) -> Self {
        self.gatekeeper = Some(gatekeeper.into());
        self
    }

    pub fn with_auto_login(mut self, auto_login: bool) -> Self {
        self.auto_login = auto_login;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Vendor defaults followed by the requested scopes, deduplicated
    pub fn scopes_with_defaults(&self, defaults: &[&str]) -> Vec<String> {
        merge_scopes(defaults, &self.scope)
    }
}

/// Merge default and requested scopes
///
/// Entries are trimmed, empty entries dropped, and duplicates removed keeping
/// the first occurrence.
pub fn merge_scopes(defaults: &[&str], requested: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(defaults.len() + requested.len());
    let candidates = defaults
        .iter()
        .copied()
        .chain(requested.iter().map(String::as_str));

    for scope in candidates {
        let scope = scope.trim();
        if !scope.is_empty() && !merged.iter().any(|s| s == scope) {
            merged.push(scope.to_string());
        }
    }

    merged
}
