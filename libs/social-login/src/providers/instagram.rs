//! Instagram adapter
//!
//! Implicit-grant redirect flow. Instagram sends the browser back to
//! `redirect?rslCallback=instagram#access_token=...`, or with `error`,
//! `error_reason` and `error_description` query parameters when the user
//! declines. `load` reads that callback; `login` navigates away when there is
//! no usable token.

use super::{redirect_and_wait, transport_error};
use crate::error::{SocialError, SocialResult};
use crate::host::{CallbackParams, Navigator, callback_redirect, read, write};
use crate::options::{LoadOptions, merge_scopes};
use crate::provider::{LoadOnce, ProviderId, SocialProvider};
use crate::user::{Expiry, ProfileBuilder, SocialUser, Token};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, RwLock};

/// `data` object of `/users/self`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Authenticated Instagram session
#[derive(Debug, Clone, PartialEq)]
pub struct InstagramSession {
    pub user: InstagramUser,
    pub access_token: String,
}

#[derive(Debug, Default)]
struct InstagramState {
    authorize_url: Option<String>,
    access_token: Option<String>,
}

/// Why no session could be produced
enum LookupFailure {
    /// No token, or Instagram rejected it; a fresh authorization can fix this
    NoSession(SocialError),
    /// The request itself failed; redirecting would not help
    Transport(SocialError),
}

impl LookupFailure {
    fn into_error(self) -> SocialError {
        match self {
            Self::NoSession(e) | Self::Transport(e) => e,
        }
    }
}

/// Instagram provider
pub struct InstagramProvider {
    client: reqwest::Client,
    api_url: String,
    navigator: Arc<dyn Navigator>,
    state: RwLock<InstagramState>,
    loaded: LoadOnce,
}

impl InstagramProvider {
    pub const API_URL: &'static str = "https://api.instagram.com/v1";
    pub const AUTHORIZE_URL: &'static str = "https://api.instagram.com/oauth/authorize/";
    pub const DEFAULT_SCOPES: &'static [&'static str] = &["user_profile"];

    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: Self::API_URL.to_string(),
            navigator,
            state: RwLock::new(InstagramState::default()),
            loaded: LoadOnce::new(),
        }
    }

    /// Override the REST API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn authorize_url(&self) -> Option<String> {
        read(&self.state).authorize_url.clone()
    }

    /// Build the Instagram authorization URL for `redirect`
    pub fn build_authorize_url(
        app_id: &str,
        redirect: &str,
        scope: &[String],
    ) -> SocialResult<String> {
        let callback = callback_redirect(redirect, ProviderId::Instagram.as_str()).map_err(|e| {
            SocialError::load(ProviderId::Instagram, "Invalid redirect URL").with_error(e)
        })?;

        let scope = merge_scopes(Self::DEFAULT_SCOPES, scope)
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("+");

        // Implicit grant: the token comes back in the fragment read by `configure`,
        // not as a `code` query parameter.
        Ok(format!(
            "{}?client_id={}&scope={}&redirect_uri={}&response_type=token",
            Self::AUTHORIZE_URL,
            urlencoding::encode(app_id),
            scope,
            urlencoding::encode(callback.as_str()),
        ))
    }

    fn configure(&self, options: &LoadOptions) -> SocialResult<()> {
        let redirect = options.redirect.as_deref().ok_or_else(|| {
            SocialError::load(ProviderId::Instagram, "Cannot load SDK without redirect")
        })?;
        let authorize_url = Self::build_authorize_url(&options.app_id, redirect, &options.scope)?;
        write(&self.state).authorize_url = Some(authorize_url);

        let params = CallbackParams::from_navigator(self.navigator.as_ref());
        if !params.is_callback_for(ProviderId::Instagram.as_str()) {
            return Ok(());
        }

        if params.query("error").is_some() {
            tracing::warn!("Instagram authorization was declined");
            return Err(
                SocialError::auth(ProviderId::Instagram, "Authentication failed").with_error(json!({
                    "error_reason": params.query("error_reason"),
                    "error_description": params.query("error_description"),
                })),
            );
        }

        let token = params.fragment("access_token").ok_or_else(|| {
            SocialError::access_token(ProviderId::Instagram, "Access token missing from callback")
        })?;
        write(&self.state).access_token = Some(token.to_string());
        tracing::info!("Instagram authorization callback completed");
        Ok(())
    }

    async fn fetch_session(&self) -> Result<InstagramSession, LookupFailure> {
        let token = read(&self.state).access_token.clone().ok_or_else(|| {
            LookupFailure::NoSession(SocialError::access_token(
                ProviderId::Instagram,
                "No access token available",
            ))
        })?;

        let transport = |e: reqwest::Error| {
            LookupFailure::Transport(
                SocialError::check_login(
                    ProviderId::Instagram,
                    "Failed to fetch user data due to fetch error",
                )
                .with_error(transport_error(&e)),
            )
        };

        let url = format!(
            "{}/users/self/?access_token={}",
            self.api_url.trim_end_matches('/'),
            urlencoding::encode(&token)
        );
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        let meta = body.get("meta").cloned().unwrap_or(Value::Null);
        if meta.get("code").and_then(Value::as_i64) != Some(200) {
            return Err(LookupFailure::NoSession(
                SocialError::check_login(ProviderId::Instagram, "Failed to fetch user data")
                    .with_error(meta),
            ));
        }

        let user = body
            .get("data")
            .cloned()
            .and_then(|data| serde_json::from_value::<InstagramUser>(data).ok())
            .ok_or_else(|| {
                LookupFailure::Transport(
                    SocialError::check_login(ProviderId::Instagram, "Unexpected user data")
                        .with_error(body.clone()),
                )
            })?;

        Ok(InstagramSession {
            user,
            access_token: token,
        })
    }
}

#[async_trait]
impl SocialProvider for InstagramProvider {
    type Session = InstagramSession;

    fn id(&self) -> ProviderId {
        ProviderId::Instagram
    }

    async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        self.loaded
            .run(|| async { self.configure(options) })
            .await
    }

    async fn check_login(&self, options: &LoadOptions) -> SocialResult<InstagramSession> {
        if options.auto_login {
            return self.login(options).await;
        }
        self.fetch_session().await.map_err(LookupFailure::into_error)
    }

    async fn login(&self, _options: &LoadOptions) -> SocialResult<InstagramSession> {
        let error = match self.fetch_session().await {
            Ok(session) => return Ok(session),
            Err(LookupFailure::Transport(error)) => return Err(error),
            Err(LookupFailure::NoSession(error)) => error,
        };

        let Some(url) = self.authorize_url() else {
            return Err(SocialError::load(
                ProviderId::Instagram,
                "Call load before calling login",
            ));
        };

        tracing::debug!("No Instagram session: {}", error);
        redirect_and_wait(self.navigator.as_ref(), &url).await
    }

    fn generate_user(&self, session: &InstagramSession) -> SocialUser {
        let user = &session.user;

        // No email on the Instagram API
        SocialUser {
            profile: ProfileBuilder::new(&user.id)
                .name([user.full_name.as_deref(), Some(user.username.as_str())])
                .profile_pic_url(user.profile_picture.as_deref())
                .build(),
            token: Token {
                access_token: session.access_token.clone(),
                expires_at: Expiry::Never,
            },
        }
    }

    async fn logout(&self) -> SocialResult<()> {
        write(&self.state).access_token = None;
        Ok(())
    }
}
