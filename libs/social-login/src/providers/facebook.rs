//! Facebook adapter
//!
//! Popup flow over the Facebook JavaScript SDK (`FB`). Both `check_login` and
//! `login` funnel the vendor's login-status response through the same handler:
//! a connected status is completed with a `/me` profile fetch, anything else is
//! an `auth` error carrying the raw status.

use crate::error::{SocialError, SocialResult};
use crate::host::{ScriptLoader, ScriptTag, VendorError};
use crate::options::LoadOptions;
use crate::provider::{LoadOnce, ProviderId, SocialProvider};
use crate::user::{Expiry, ProfileBuilder, SocialUser, Token};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binding to the `FB` vendor object
#[async_trait]
pub trait FacebookSdk: Send + Sync {
    /// `FB.init({ appId, xfbml: true, version })`
    fn init(&self, app_id: &str, version: &str);

    /// `FB.getLoginStatus`
    async fn get_login_status(&self) -> FacebookLoginStatus;

    /// `FB.login` with a comma-joined scope string
    async fn login(&self, scope: &str) -> FacebookLoginStatus;

    /// `FB.api('/me', 'GET', { fields })`
    async fn me(&self, fields: &str) -> Result<FacebookProfile, VendorError>;

    /// `FB.logout`
    async fn logout(&self) -> Result<(), VendorError>;
}

/// Login status reported by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacebookStatus {
    Connected,
    NotAuthorized,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookLoginStatus {
    pub status: FacebookStatus,
    #[serde(rename = "authResponse", default)]
    pub auth_response: Option<FacebookAuthResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookAuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Token lifetime in seconds
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "signedRequest", default)]
    pub signed_request: Option<String>,
}

/// `/me` payload for [`FacebookProvider::PROFILE_FIELDS`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<FacebookPicture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookPicture {
    pub data: FacebookPictureData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookPictureData {
    pub url: String,
}

/// Authenticated Facebook session
#[derive(Debug, Clone, PartialEq)]
pub struct FacebookSession {
    pub profile: FacebookProfile,
    pub auth: FacebookAuthResponse,
    pub issued_at: DateTime<Utc>,
}

/// Facebook provider
pub struct FacebookProvider {
    sdk: Arc<dyn FacebookSdk>,
    scripts: Arc<dyn ScriptLoader>,
    loaded: LoadOnce,
}

impl FacebookProvider {
    pub const SCRIPT: ScriptTag =
        ScriptTag::new("facebook-jssdk", "https://connect.facebook.net/en_US/sdk.js");

    pub const DEFAULT_SCOPES: &'static [&'static str] = &["public_profile", "email"];

    /// Graph API version used when none is configured
    pub const DEFAULT_VERSION: &'static str = "v5.0";

    pub const PROFILE_FIELDS: &'static str = "email,name,id,first_name,last_name,picture";

    pub fn new(sdk: Arc<dyn FacebookSdk>, scripts: Arc<dyn ScriptLoader>) -> Self {
        Self {
            sdk,
            scripts,
            loaded: LoadOnce::new(),
        }
    }

    async fn handle_login_status(
        &self,
        response: FacebookLoginStatus,
    ) -> SocialResult<FacebookSession> {
        let raw = serde_json::to_value(&response).unwrap_or_default();

        let Some(auth) = response.auth_response else {
            return Err(
                SocialError::auth(ProviderId::Facebook, "Authentication failed").with_error(raw),
            );
        };

        match response.status {
            FacebookStatus::Connected => {
                let issued_at = Utc::now();
                let profile = self.sdk.me(Self::PROFILE_FIELDS).await.map_err(|e| {
                    SocialError::get_profile(ProviderId::Facebook, "Failed to get user profile")
                        .with_error(e)
                })?;

                Ok(FacebookSession {
                    profile,
                    auth,
                    issued_at,
                })
            }
            FacebookStatus::NotAuthorized | FacebookStatus::Unknown => Err(SocialError::auth(
                ProviderId::Facebook,
                "Authentication has been cancelled or an unknown error occurred",
            )
            .with_error(raw)),
        }
    }
}

#[async_trait]
impl SocialProvider for FacebookProvider {
    type Session = FacebookSession;

    fn id(&self) -> ProviderId {
        ProviderId::Facebook
    }

    async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        if options.app_id.is_empty() {
            return Err(SocialError::load(
                ProviderId::Facebook,
                "Cannot load SDK without appId",
            ));
        }

        self.loaded
            .run(|| async {
                if self.scripts.is_injected(Self::SCRIPT.id) {
                    return Ok(());
                }

                self.scripts.inject(&Self::SCRIPT).await.map_err(|e| {
                    SocialError::load(ProviderId::Facebook, "Failed to load SDK").with_error(e)
                })?;

                let version = options.version.as_deref().unwrap_or(Self::DEFAULT_VERSION);
                tracing::debug!("Initializing Facebook SDK {}", version);
                self.sdk.init(&options.app_id, version);
                Ok(())
            })
            .await
    }

    async fn check_login(&self, options: &LoadOptions) -> SocialResult<FacebookSession> {
        if options.auto_login {
            return self.login(options).await;
        }

        let status = self.sdk.get_login_status().await;
        self.handle_login_status(status).await
    }

    async fn login(&self, options: &LoadOptions) -> SocialResult<FacebookSession> {
        let scope = options
            .scopes_with_defaults(Self::DEFAULT_SCOPES)
            .join(",");

        let status = self.sdk.login(&scope).await;
        self.handle_login_status(status).await
    }

    fn generate_user(&self, session: &FacebookSession) -> SocialUser {
        let profile = &session.profile;

        SocialUser {
            profile: ProfileBuilder::new(&profile.id)
                .name([profile.name.as_deref()])
                .first_name(profile.first_name.as_deref())
                .last_name(profile.last_name.as_deref())
                .email(profile.email.as_deref())
                .profile_pic_url(profile.picture.as_ref().map(|p| p.data.url.as_str()))
                .build(),
            token: Token {
                access_token: session.auth.access_token.clone(),
                expires_at: Expiry::after(session.issued_at, session.auth.expires_in),
            },
        }
    }

    async fn logout(&self) -> SocialResult<()> {
        self.sdk
            .logout()
            .await
            .map_err(|e| SocialError::logout(ProviderId::Facebook, "Failed to logout").with_error(e))
    }
}
