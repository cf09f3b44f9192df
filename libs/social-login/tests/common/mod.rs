//! Fakes for the host collaborators and vendor SDKs
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use social_login::host::{ScriptLoader, ScriptTag, VendorError};
use social_login::providers::amazon::{AmazonAuthorization, AmazonProfile, AmazonSdk};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Script loader that counts injection attempts and takes a while to finish
pub struct CountingScripts {
    attempts: AtomicUsize,
    injected: Mutex<HashSet<String>>,
    fail: bool,
    delay: Duration,
}

impl CountingScripts {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
            injected: Mutex::new(HashSet::new()),
            fail: false,
            delay: Duration::from_millis(20),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptLoader for CountingScripts {
    async fn inject(&self, script: &ScriptTag) -> Result<(), VendorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(json!({ "reason": "blocked", "src": script.src }));
        }
        self.injected.lock().unwrap().insert(script.id.to_string());
        Ok(())
    }

    fn is_injected(&self, id: &str) -> bool {
        self.injected.lock().unwrap().contains(id)
    }
}

/// Amazon SDK returning a fixed customer
pub struct FakeAmazon {
    pub expires_in: i64,
    client_id: Mutex<Option<String>>,
    logouts: AtomicUsize,
}

impl FakeAmazon {
    pub fn new(expires_in: i64) -> Self {
        Self {
            expires_in,
            client_id: Mutex::new(None),
            logouts: AtomicUsize::new(0),
        }
    }

    pub fn client_id(&self) -> Option<String> {
        self.client_id.lock().unwrap().clone()
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AmazonSdk for FakeAmazon {
    fn set_client_id(&self, client_id: &str) {
        *self.client_id.lock().unwrap() = Some(client_id.to_string());
    }

    async fn authorize(&self, _scopes: &[String]) -> Result<AmazonAuthorization, VendorError> {
        Ok(AmazonAuthorization {
            access_token: "Atza|IwEB".to_string(),
            expires_in: self.expires_in,
            token_type: Some("bearer".to_string()),
            scope: Some("profile".to_string()),
        })
    }

    async fn retrieve_profile(&self, _access_token: &str) -> Result<AmazonProfile, VendorError> {
        Ok(AmazonProfile {
            customer_id: "amzn1.account.TEST".to_string(),
            name: "Test Customer".to_string(),
            primary_email: Some("customer@example.com".to_string()),
            postal_code: None,
        })
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

pub const REDIRECT: &str = "http://localhost:3000/";

pub fn viewer_body(login: &str) -> String {
    json!({
        "data": {
            "viewer": {
                "login": login,
                "name": "Test User",
                "email": "test@example.com",
                "avatarUrl": "https://avatars.example.com/u/1",
                "id": "MDQ6VXNlcjE="
            }
        }
    })
    .to_string()
}
