//! Host collaborators used by the adapters
//!
//! The adapters never touch a browser, a script tag or a vendor global directly.
//! Everything environment-specific is reached through these traits, so a host
//! (a webview bridge, a wasm binding, a CLI, a test) supplies its own.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use reqwest::Url;

/// Raw vendor failure payload, passed through untouched into `SocialError::error`
pub type VendorError = serde_json::Value;

/// A vendor script to inject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    /// Element id, used to make injection idempotent
    pub id: &'static str,
    /// Script source URL
    pub src: &'static str,
}

impl ScriptTag {
    pub const fn new(id: &'static str, src: &'static str) -> Self {
        Self { id, src }
    }
}

/// Injects vendor SDK scripts
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Inject `script` and resolve once the vendor reports it ready
    ///
    /// Must be idempotent by `script.id`: a second call for an already injected
    /// id resolves without injecting again.
    async fn inject(&self, script: &ScriptTag) -> Result<(), VendorError>;

    /// Whether a script with this id has already been injected
    fn is_injected(&self, id: &str) -> bool;
}

/// Full-page navigation and current-location access
pub trait Navigator: Send + Sync {
    /// Navigate the whole page to `url`
    fn navigate(&self, url: &str);

    /// The location the current page was opened with, if known
    fn current_url(&self) -> Option<Url>;
}

/// Query and fragment parameters of the page location
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    query: Vec<(String, String)>,
    fragment: Vec<(String, String)>,
}

impl CallbackParams {
    /// Read the parameters of the navigator's current location
    pub fn from_navigator(navigator: &dyn Navigator) -> Self {
        navigator
            .current_url()
            .map(|url| Self::from_url(&url))
            .unwrap_or_default()
    }

    pub fn from_url(url: &Url) -> Self {
        let query = url.query_pairs().into_owned().collect();
        let fragment = url.fragment().map(parse_pairs).unwrap_or_default();

        Self { query, fragment }
    }

    /// First query value for `key`, ignoring blank values
    pub fn query(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }

    /// First fragment value for `key`, ignoring blank values
    pub fn fragment(&self, key: &str) -> Option<&str> {
        lookup(&self.fragment, key)
    }

    /// Whether the location is an OAuth callback addressed to `provider`
    pub fn is_callback_for(&self, provider: &str) -> bool {
        self.query("rslCallback") == Some(provider)
    }
}

fn parse_pairs(encoded: &str) -> Vec<(String, String)> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

// Fragments are not form-encoded; a literal `+` stays a `+`
fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

/// Append `rslCallback=<provider>` to a redirect URL
///
/// Uses `&` when the URL already has a query and `?` otherwise.
pub fn callback_redirect(redirect: &str, provider: &str) -> Result<Url, String> {
    let mut url = Url::parse(redirect).map_err(|e| format!("Invalid redirect URL: {}", e))?;
    let marker = format!("rslCallback={}", provider);
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, marker),
        _ => marker,
    };
    url.set_query(Some(&query));
    Ok(url)
}

/// A [`Navigator`] that records navigations and serves a fixed location
///
/// Used by hosts that cannot navigate in-process (the CLI hands the URL to a
/// system browser) and by tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: Mutex<Option<Url>>,
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `url` as the current location
    pub fn at(url: Url) -> Self {
        Self {
            current: Mutex::new(Some(url)),
            visited: Mutex::new(Vec::new()),
        }
    }

    pub fn set_current_url(&self, url: Option<Url>) {
        *lock(&self.current) = url;
    }

    /// URLs passed to `navigate`, oldest first
    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        lock(&self.visited).push(url.to_string());
    }

    fn current_url(&self) -> Option<Url> {
        lock(&self.current).clone()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
