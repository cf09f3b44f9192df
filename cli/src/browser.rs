//! Navigator backed by the system browser

use social_login::host::{Navigator, Url};
use tokio::sync::Notify;

/// Opens authorization pages in the system browser
///
/// The CLI cannot be navigated itself, so the "current page" is whatever was
/// passed as `--callback-url`.
pub struct BrowserNavigator {
    current: Option<Url>,
    navigated: Notify,
}

impl BrowserNavigator {
    pub fn new(current: Option<Url>) -> Self {
        Self {
            current,
            navigated: Notify::new(),
        }
    }

    /// Resolves once a provider has navigated away
    pub async fn navigated(&self) {
        self.navigated.notified().await;
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        println!();
        println!("Opening browser for authorization...");
        println!();
        println!("If browser doesn't open, visit:");
        println!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, url);
        println!();

        if let Err(e) = open::that(url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
        self.navigated.notify_one();
    }

    fn current_url(&self) -> Option<Url> {
        self.current.clone()
    }
}
