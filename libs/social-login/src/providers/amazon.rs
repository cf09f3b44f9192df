//! Login with Amazon adapter
//!
//! Popup flow: the vendor SDK opens its own authorization window and hands
//! back an access token, which is then used to retrieve the profile.
//!
//! ```text
//! load ──► inject login1.js ──► setClientId(appId)
//! login / check_login ──► authorize(scopes) ──► retrieveProfile(token) ──► session
//! ```

use crate::error::{SocialError, SocialResult};
use crate::host::{ScriptLoader, ScriptTag, VendorError};
use crate::options::LoadOptions;
use crate::provider::{LoadOnce, ProviderId, SocialProvider};
use crate::user::{Expiry, ProfileBuilder, SocialUser, Token};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binding to the `amazon.Login` vendor object
#[async_trait]
pub trait AmazonSdk: Send + Sync {
    /// `amazon.Login.setClientId`
    fn set_client_id(&self, client_id: &str);

    /// `amazon.Login.authorize` with the given scopes
    async fn authorize(&self, scopes: &[String]) -> Result<AmazonAuthorization, VendorError>;

    /// `amazon.Login.retrieveProfile`
    async fn retrieve_profile(&self, access_token: &str) -> Result<AmazonProfile, VendorError>;

    /// `amazon.Login.logout`
    fn logout(&self);
}

/// Successful `authorize` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmazonAuthorization {
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `retrieveProfile` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmazonProfile {
    #[serde(rename = "CustomerId")]
    pub customer_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PrimaryEmail", default)]
    pub primary_email: Option<String>,
    #[serde(rename = "PostalCode", default)]
    pub postal_code: Option<String>,
}

/// Authenticated Amazon session
#[derive(Debug, Clone, PartialEq)]
pub struct AmazonSession {
    pub authorization: AmazonAuthorization,
    pub profile: AmazonProfile,
    /// When the access token was handed to us
    pub issued_at: DateTime<Utc>,
}

/// Amazon provider
pub struct AmazonProvider {
    sdk: Arc<dyn AmazonSdk>,
    scripts: Arc<dyn ScriptLoader>,
    loaded: LoadOnce,
}

impl AmazonProvider {
    /// Vendor SDK script
    pub const SCRIPT: ScriptTag =
        ScriptTag::new("amazon-sdk", "https://api-cdn.amazon.com/sdk/login1.js");

    /// Scopes always requested
    pub const DEFAULT_SCOPES: &'static [&'static str] = &["profile"];

    pub fn new(sdk: Arc<dyn AmazonSdk>, scripts: Arc<dyn ScriptLoader>) -> Self {
        Self {
            sdk,
            scripts,
            loaded: LoadOnce::new(),
        }
    }

    async fn authorize(&self, options: &LoadOptions) -> SocialResult<AmazonSession> {
        let scopes = options.scopes_with_defaults(Self::DEFAULT_SCOPES);

        let authorization = self.sdk.authorize(&scopes).await.map_err(|e| {
            SocialError::auth(ProviderId::Amazon, "Authentication failed").with_error(e)
        })?;
        let issued_at = Utc::now();

        let profile = self
            .sdk
            .retrieve_profile(&authorization.access_token)
            .await
            .map_err(|e| {
                tracing::warn!("Amazon profile retrieval failed: {}", e);
                SocialError::get_profile(ProviderId::Amazon, "Failed to get user profile")
                    .with_error(e)
            })?;

        Ok(AmazonSession {
            authorization,
            profile,
            issued_at,
        })
    }
}

#[async_trait]
impl SocialProvider for AmazonProvider {
    type Session = AmazonSession;

    fn id(&self) -> ProviderId {
        ProviderId::Amazon
    }

    async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        if options.app_id.is_empty() {
            return Err(SocialError::load(
                ProviderId::Amazon,
                "Cannot load SDK without appId",
            ));
        }

        self.loaded
            .run(|| async {
                // Someone else already brought the SDK in; keep their client id
                if self.scripts.is_injected(Self::SCRIPT.id) {
                    return Ok(());
                }

                self.scripts.inject(&Self::SCRIPT).await.map_err(|e| {
                    SocialError::load(ProviderId::Amazon, "Failed to load SDK").with_error(e)
                })?;
                self.sdk.set_client_id(&options.app_id);
                Ok(())
            })
            .await
    }

    async fn check_login(&self, options: &LoadOptions) -> SocialResult<AmazonSession> {
        if options.auto_login {
            return self.login(options).await;
        }
        self.authorize(options).await
    }

    async fn login(&self, options: &LoadOptions) -> SocialResult<AmazonSession> {
        self.authorize(options).await
    }

    fn generate_user(&self, session: &AmazonSession) -> SocialUser {
        let profile = &session.profile;

        SocialUser {
            // Amazon exposes a single name field and no picture
            profile: ProfileBuilder::new(&profile.customer_id)
                .name([Some(profile.name.as_str())])
                .email(profile.primary_email.as_deref())
                .build(),
            token: Token {
                access_token: session.authorization.access_token.clone(),
                expires_at: Expiry::after(session.issued_at, session.authorization.expires_in),
            },
        }
    }

    async fn logout(&self) -> SocialResult<()> {
        self.sdk.logout();
        Ok(())
    }
}
