//! Google adapter over `gapi.auth2`

use crate::error::{SocialError, SocialResult};
use crate::host::{ScriptLoader, ScriptTag, VendorError};
use crate::options::LoadOptions;
use crate::provider::{LoadOnce, ProviderId, SocialProvider};
use crate::user::{Expiry, ProfileBuilder, SocialUser, Token};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binding to `gapi.auth2`
#[async_trait]
pub trait GoogleSdk: Send + Sync {
    /// Whether `gapi.auth2.getAuthInstance()` already returns an instance
    fn has_auth_instance(&self) -> bool;

    /// `gapi.load('auth2')` followed by `gapi.auth2.init(params)`
    async fn init(&self, params: &GoogleInitParams) -> Result<(), VendorError>;

    /// `GoogleAuth.isSignedIn.get()`
    fn is_signed_in(&self) -> bool;

    /// `GoogleAuth.currentUser.get()`
    fn current_user(&self) -> Option<GoogleUser>;

    /// `GoogleAuth.signIn()`
    async fn sign_in(&self) -> Result<(), VendorError>;

    /// `GoogleAuth.signOut()`
    async fn sign_out(&self) -> Result<(), VendorError>;
}

/// Parameters of `gapi.auth2.init`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleInitParams {
    pub client_id: String,
    #[serde(rename = "fetchBasicProfile")]
    pub fetch_basic_profile: bool,
    /// Space-joined scopes
    pub scope: String,
}

/// Signed-in user as exposed by `currentUser`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleUser {
    pub basic_profile: GoogleBasicProfile,
    pub auth_response: GoogleAuthResponse,
}

/// `getBasicProfile()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleBasicProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// `getAuthResponse(true)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleAuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    pub first_issued_at: i64,
    /// Absolute expiry, ms since epoch
    pub expires_at: i64,
}

/// Google provider
pub struct GoogleProvider {
    sdk: Arc<dyn GoogleSdk>,
    scripts: Arc<dyn ScriptLoader>,
    loaded: LoadOnce,
}

impl GoogleProvider {
    pub const SCRIPT: ScriptTag = ScriptTag::new("gapi-client", "https://apis.google.com/js/api.js");

    pub fn new(sdk: Arc<dyn GoogleSdk>, scripts: Arc<dyn ScriptLoader>) -> Self {
        Self {
            sdk,
            scripts,
            loaded: LoadOnce::new(),
        }
    }

    fn current_session(&self) -> SocialResult<GoogleUser> {
        if !self.sdk.is_signed_in() {
            return Err(SocialError::check_login(
                ProviderId::Google,
                "Not authenticated",
            ));
        }

        self.sdk
            .current_user()
            .ok_or_else(|| SocialError::check_login(ProviderId::Google, "Not authenticated"))
    }
}

#[async_trait]
impl SocialProvider for GoogleProvider {
    type Session = GoogleUser;

    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        if options.app_id.is_empty() {
            return Err(SocialError::load(
                ProviderId::Google,
                "Cannot load SDK without appId",
            ));
        }

        self.loaded
            .run(|| async {
                self.scripts.inject(&Self::SCRIPT).await.map_err(|e| {
                    SocialError::load(ProviderId::Google, "Failed to load SDK").with_error(e)
                })?;

                if self.sdk.has_auth_instance() {
                    return Ok(());
                }

                let params = GoogleInitParams {
                    client_id: options.app_id.clone(),
                    fetch_basic_profile: true,
                    scope: options.scopes_with_defaults(&[]).join(" "),
                };
                self.sdk.init(&params).await.map_err(|e| {
                    SocialError::load(ProviderId::Google, "Failed to load SDK").with_error(e)
                })
            })
            .await
    }

    async fn check_login(&self, options: &LoadOptions) -> SocialResult<GoogleUser> {
        if options.auto_login {
            return self.login(options).await;
        }
        self.current_session()
    }

    async fn login(&self, _options: &LoadOptions) -> SocialResult<GoogleUser> {
        self.sdk.sign_in().await.map_err(|e| {
            SocialError::auth(ProviderId::Google, "Authentication failed").with_error(e)
        })?;
        self.current_session()
    }

    fn generate_user(&self, session: &GoogleUser) -> SocialUser {
        let profile = &session.basic_profile;

        SocialUser {
            profile: ProfileBuilder::new(&profile.id)
                .name([profile.name.as_deref()])
                .first_name(profile.given_name.as_deref())
                .last_name(profile.family_name.as_deref())
                .email(profile.email.as_deref())
                .profile_pic_url(profile.image_url.as_deref())
                .build(),
            token: Token {
                access_token: session.auth_response.access_token.clone(),
                expires_at: Expiry::At(session.auth_response.expires_at),
            },
        }
    }

    async fn logout(&self) -> SocialResult<()> {
        self.sdk
            .sign_out()
            .await
            .map_err(|e| SocialError::logout(ProviderId::Google, "Failed to logout").with_error(e))
    }
}
