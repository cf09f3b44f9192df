//! Vendor adapters
//!
//! Popup flows (Amazon, Facebook, Google) drive a vendor JavaScript SDK through
//! an injected binding trait. Redirect flows (GitHub, Instagram) build an
//! authorization URL, navigate away, and finish the handshake on the callback
//! page during `load`.

pub mod amazon;
pub mod facebook;
pub mod github;
pub mod google;
pub mod instagram;

pub use amazon::{AmazonProvider, AmazonSdk};
pub use facebook::{FacebookProvider, FacebookSdk};
pub use github::GithubProvider;
pub use google::{GoogleProvider, GoogleSdk};
pub use instagram::InstagramProvider;

use crate::host::{Navigator, VendorError};

/// Navigate to an authorization URL and park the caller
///
/// The page is replaced by the vendor's consent screen, so nothing in this
/// process observes completion. The handshake resumes in the next page's
/// `load`.
pub(crate) async fn redirect_and_wait<T>(navigator: &dyn Navigator, url: &str) -> T {
    tracing::info!("Redirecting to {}", url);
    navigator.navigate(url);
    std::future::pending().await
}

/// Wrap a transport error as a raw vendor payload
pub(crate) fn transport_error(error: &reqwest::Error) -> VendorError {
    serde_json::json!({ "message": error.to_string() })
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::host::{ScriptLoader, ScriptTag, VendorError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Script loader that counts injections per id
    #[derive(Default)]
    pub struct StubScripts {
        injected: Mutex<HashMap<String, usize>>,
        fail: bool,
    }

    impl StubScripts {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn injections(&self, id: &str) -> usize {
            self.injected.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl ScriptLoader for StubScripts {
        async fn inject(&self, script: &ScriptTag) -> Result<(), VendorError> {
            if self.fail {
                return Err(json!({ "reason": "network", "src": script.src }));
            }
            *self
                .injected
                .lock()
                .unwrap()
                .entry(script.id.to_string())
                .or_default() += 1;
            Ok(())
        }

        fn is_injected(&self, id: &str) -> bool {
            self.injections(id) > 0
        }
    }
}
