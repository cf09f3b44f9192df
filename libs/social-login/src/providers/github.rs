//! GitHub adapter
//!
//! Two modes, chosen by the `gatekeeper` option:
//!
//! - **Token mode** (no gatekeeper): `app_id` is used directly as a bearer token
//!   against the GraphQL API. Nothing redirects.
//! - **OAuth mode** (gatekeeper set): `login` navigates to GitHub's authorization
//!   page. GitHub sends the browser back to `redirect?rslCallback=github&code=...`,
//!   and the next `load` exchanges the code for a token at
//!   `{gatekeeper}/authenticate/{code}`.
//!
//! ```text
//! page 1: load ─► login ─► viewer query fails ─► navigate(authorize)   (never settles)
//! page 2: load ─► rslCallback=github ─► exchange code ─► token stored
//!         login ─► viewer query succeeds ─► session
//! ```

use super::{redirect_and_wait, transport_error};
use crate::error::{SocialError, SocialResult};
use crate::host::{CallbackParams, Navigator, callback_redirect, read, write};
use crate::options::{LoadOptions, merge_scopes};
use crate::provider::{LoadOnce, ProviderId, SocialProvider};
use crate::user::{Expiry, ProfileBuilder, SocialUser, Token};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const VIEWER_QUERY: &str = "query { viewer { login, name, email, avatarUrl, id } }";

/// `viewer` object of the GraphQL response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubViewer {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// Authenticated GitHub session
#[derive(Debug, Clone, PartialEq)]
pub struct GithubSession {
    pub viewer: GithubViewer,
    /// Bearer token the viewer was fetched with
    pub access_token: String,
}

#[derive(Debug, Default)]
struct GithubState {
    app_id: Option<String>,
    gatekeeper: Option<String>,
    access_token: Option<String>,
    authorize_url: Option<String>,
}

impl GithubState {
    fn uses_oauth(&self) -> bool {
        self.gatekeeper.is_some()
    }
}

/// GitHub provider
pub struct GithubProvider {
    client: reqwest::Client,
    api_url: String,
    navigator: Arc<dyn Navigator>,
    state: RwLock<GithubState>,
    loaded: LoadOnce,
}

impl GithubProvider {
    pub const API_URL: &'static str = "https://api.github.com/graphql";
    pub const AUTHORIZE_URL: &'static str = "https://github.com/login/oauth/authorize";
    pub const DEFAULT_SCOPES: &'static [&'static str] = &["user"];

    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: Self::API_URL.to_string(),
            navigator,
            state: RwLock::new(GithubState::default()),
            loaded: LoadOnce::new(),
        }
    }

    /// Override the GraphQL endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Authorization URL built during `load`, in OAuth mode
    pub fn authorize_url(&self) -> Option<String> {
        read(&self.state).authorize_url.clone()
    }

    /// Build the GitHub authorization URL for `redirect`
    ///
    /// The `state` parameter is a UUIDv5 of the redirect URL in the URL namespace.
    pub fn build_authorize_url(
        app_id: &str,
        redirect: &str,
        scope: &[String],
    ) -> SocialResult<String> {
        let callback = callback_redirect(redirect, ProviderId::Github.as_str()).map_err(|e| {
            SocialError::load(ProviderId::Github, "Invalid redirect URL").with_error(e)
        })?;

        let scope = merge_scopes(Self::DEFAULT_SCOPES, scope)
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("%20");
        let state = Uuid::new_v5(&Uuid::NAMESPACE_URL, redirect.as_bytes());

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            Self::AUTHORIZE_URL,
            urlencoding::encode(app_id),
            urlencoding::encode(callback.as_str()),
            scope,
            state,
        ))
    }

    async fn configure(&self, options: &LoadOptions) -> SocialResult<()> {
        let Some(gatekeeper) = options.gatekeeper.as_deref().filter(|g| !g.is_empty()) else {
            write(&self.state).app_id = Some(options.app_id.clone());
            return Ok(());
        };

        let redirect = options.redirect.as_deref().ok_or_else(|| {
            SocialError::load(ProviderId::Github, "Cannot use gatekeeper without redirect")
        })?;
        let authorize_url = Self::build_authorize_url(&options.app_id, redirect, &options.scope)?;
        let gatekeeper = gatekeeper.trim_end_matches('/').to_string();

        {
            let mut state = write(&self.state);
            state.app_id = Some(options.app_id.clone());
            state.gatekeeper = Some(gatekeeper.clone());
            state.authorize_url = Some(authorize_url);
        }

        let params = CallbackParams::from_navigator(self.navigator.as_ref());
        if params.is_callback_for(ProviderId::Github.as_str()) {
            let token = self.exchange_code(&gatekeeper, &params).await?;
            write(&self.state).access_token = Some(token);
            tracing::info!("GitHub authorization callback completed");
        }

        Ok(())
    }

    async fn exchange_code(&self, gatekeeper: &str, params: &CallbackParams) -> SocialResult<String> {
        let code = params.query("code").ok_or_else(|| {
            SocialError::access_token(ProviderId::Github, "Authorization code not found")
        })?;

        let url = format!("{}/authenticate/{}", gatekeeper, urlencoding::encode(code));
        let response = self.client.get(&url).send().await.map_err(|e| {
            SocialError::access_token(
                ProviderId::Github,
                "Failed to fetch access token due to a network error",
            )
            .with_error(transport_error(&e))
        })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            SocialError::access_token(
                ProviderId::Github,
                "Gatekeeper returned an invalid access token response",
            )
            .with_error(json!({
                "status": status.as_u16(),
                "message": e.to_string(),
            }))
        })?;

        match body.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() && body.get("error").is_none() => {
                Ok(token.to_string())
            }
            _ => {
                tracing::warn!("Gatekeeper rejected the authorization code");
                Err(
                    SocialError::access_token(ProviderId::Github, "Got error from fetch access token")
                        .with_error(body),
                )
            }
        }
    }

    async fn fetch_session(&self) -> SocialResult<GithubSession> {
        let bearer = {
            let state = read(&self.state);
            match (&state.access_token, state.uses_oauth()) {
                (Some(token), _) => Some(token.clone()),
                (None, true) => None,
                (None, false) => state.app_id.clone(),
            }
        }
        .ok_or_else(|| SocialError::access_token(ProviderId::Github, "No access token available"))?;

        let network_error = |e: reqwest::Error| {
            SocialError::check_login(
                ProviderId::Github,
                "Failed to fetch user data due to a network error",
            )
            .with_error(transport_error(&e))
        };

        let body: Value = self
            .client
            .post(&self.api_url)
            .bearer_auth(&bearer)
            .header(USER_AGENT, "social-login")
            .json(&json!({ "query": VIEWER_QUERY }))
            .send()
            .await
            .map_err(network_error)?
            .json()
            .await
            .map_err(network_error)?;

        if body.get("message").is_some() || body.get("errors").is_some() {
            return Err(
                SocialError::check_login(ProviderId::Github, "Failed to fetch user data")
                    .with_error(body),
            );
        }

        let viewer = body
            .pointer("/data/viewer")
            .cloned()
            .and_then(|viewer| serde_json::from_value::<GithubViewer>(viewer).ok())
            .ok_or_else(|| {
                SocialError::check_login(ProviderId::Github, "Unexpected user data")
                    .with_error(body.clone())
            })?;

        Ok(GithubSession {
            viewer,
            access_token: bearer,
        })
    }
}

#[async_trait]
impl SocialProvider for GithubProvider {
    type Session = GithubSession;

    fn id(&self) -> ProviderId {
        ProviderId::Github
    }

    async fn load(&self, options: &LoadOptions) -> SocialResult<()> {
        if options.app_id.is_empty() {
            return Err(SocialError::load(
                ProviderId::Github,
                "Cannot load SDK without appId",
            ));
        }

        self.loaded.run(|| self.configure(options)).await
    }

    async fn check_login(&self, options: &LoadOptions) -> SocialResult<GithubSession> {
        if options.auto_login {
            return self.login(options).await;
        }
        self.fetch_session().await
    }

    async fn login(&self, _options: &LoadOptions) -> SocialResult<GithubSession> {
        let error = match self.fetch_session().await {
            Ok(session) => return Ok(session),
            Err(error) => error,
        };

        let authorize_url = {
            let state = read(&self.state);
            if !state.uses_oauth() {
                return Err(error);
            }
            state.authorize_url.clone()
        };

        match authorize_url {
            Some(url) => {
                tracing::debug!("No GitHub session: {}", error);
                redirect_and_wait(self.navigator.as_ref(), &url).await
            }
            None => Err(error),
        }
    }

    fn generate_user(&self, session: &GithubSession) -> SocialUser {
        let viewer = &session.viewer;

        SocialUser {
            profile: ProfileBuilder::new(&viewer.id)
                .name([Some(viewer.login.as_str())])
                .first_name(viewer.name.as_deref())
                .last_name(viewer.name.as_deref())
                .email(viewer.email.as_deref())
                .profile_pic_url(viewer.avatar_url.as_deref())
                .build(),
            token: Token {
                access_token: session.access_token.clone(),
                expires_at: Expiry::Never,
            },
        }
    }

    async fn logout(&self) -> SocialResult<()> {
        Err(SocialError::logout(
            ProviderId::Github,
            "Cannot logout from github provider",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::host::RecordingNavigator;
    use reqwest::Url;
    use std::time::Duration;

    fn viewer_body() -> String {
        json!({
            "data": {
                "viewer": {
                    "login": "octocat",
                    "name": "Mona Lisa",
                    "email": "",
                    "avatarUrl": "https://avatars.example.com/u/583231",
                    "id": "MDQ6VXNlcjU4MzIzMQ=="
                }
            }
        })
        .to_string()
    }

    fn provider(server: &mockito::Server, navigator: Arc<RecordingNavigator>) -> GithubProvider {
        GithubProvider::new(navigator).with_api_url(format!("{}/graphql", server.url()))
    }

    #[tokio::test]
    async fn test_token_mode_uses_app_id_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer X")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(viewer_body())
            .create_async()
            .await;

        let navigator = Arc::new(RecordingNavigator::new());
        let provider = provider(&server, navigator.clone());
        let options = LoadOptions::new("X");

        provider.load(&options).await.unwrap();
        let session = provider.login(&options).await.unwrap();
        let user = provider.generate_user(&session);

        mock.assert_async().await;
        assert!(navigator.visited().is_empty());
        assert_eq!(user.profile.id, "MDQ6VXNlcjU4MzIzMQ==");
        assert_eq!(user.profile.name, "octocat");
        assert_eq!(user.profile.first_name, "Mona Lisa");
        assert_eq!(user.profile.email, None);
        assert_eq!(user.token.access_token, "X");
        assert_eq!(user.token.expires_at, Expiry::Never);
    }

    #[tokio::test]
    async fn test_graphql_errors_are_check_login_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let provider = provider(&server, Arc::new(RecordingNavigator::new()));
        let options = LoadOptions::new("bad-token");
        provider.load(&options).await.unwrap();

        let err = provider.check_login(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CheckLogin);
        assert_eq!(err.error["message"], "Bad credentials");
    }

    #[tokio::test]
    async fn test_token_mode_login_failure_does_not_redirect() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":[{"message":"nope"}]}"#)
            .create_async()
            .await;

        let navigator = Arc::new(RecordingNavigator::new());
        let provider = provider(&server, navigator.clone());
        let options = LoadOptions::new("X");
        provider.load(&options).await.unwrap();

        let err = provider.login(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CheckLogin);
        assert!(navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn test_oauth_login_without_session_redirects_and_never_settles() {
        let server = mockito::Server::new_async().await;
        let navigator = Arc::new(RecordingNavigator::new());
        let provider = provider(&server, navigator.clone());
        let options = LoadOptions::new("client123")
            .with_gatekeeper("https://gatekeeper.example.com")
            .with_redirect("http://localhost:3000/");

        provider.load(&options).await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_millis(50), provider.login(&options)).await;

        assert!(outcome.is_err());
        let visited = navigator.visited();
        assert_eq!(visited.len(), 1);
        assert!(visited[0].starts_with("https://github.com/login/oauth/authorize?client_id=client123"));
        assert!(visited[0].contains("rslCallback%3Dgithub"));
        assert_eq!(Some(visited[0].clone()), provider.authorize_url());
    }

    #[tokio::test]
    async fn test_oauth_check_login_without_token() {
        let server = mockito::Server::new_async().await;
        let provider = provider(&server, Arc::new(RecordingNavigator::new()));
        let options = LoadOptions::new("client123")
            .with_gatekeeper("https://gatekeeper.example.com")
            .with_redirect("http://localhost:3000/");

        provider.load(&options).await.unwrap();
        let err = provider.check_login(&options).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::AccessToken);
        assert_eq!(err.description, "No access token available");
    }

    #[tokio::test]
    async fn test_callback_exchanges_code_during_load() {
        let mut server = mockito::Server::new_async().await;
        let exchange = server
            .mock("GET", "/authenticate/ABC")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"gho_exchanged"}"#)
            .create_async()
            .await;
        let viewer = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer gho_exchanged")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(viewer_body())
            .create_async()
            .await;

        let callback = Url::parse("http://localhost:3000/?rslCallback=github&code=ABC").unwrap();
        let navigator = Arc::new(RecordingNavigator::at(callback));
        let provider = provider(&server, navigator.clone());
        let options = LoadOptions::new("client123")
            .with_gatekeeper(format!("{}/", server.url()))
            .with_redirect("http://localhost:3000/");

        provider.load(&options).await.unwrap();
        let session = provider.login(&options).await.unwrap();

        exchange.assert_async().await;
        viewer.assert_async().await;
        assert!(navigator.visited().is_empty());
        assert_eq!(provider.generate_user(&session).token.access_token, "gho_exchanged");
    }

    #[tokio::test]
    async fn test_callback_without_code_fails_load() {
        let server = mockito::Server::new_async().await;
        let callback = Url::parse("http://localhost:3000/?rslCallback=github").unwrap();
        let provider = provider(&server, Arc::new(RecordingNavigator::at(callback)));
        let options = LoadOptions::new("client123")
            .with_gatekeeper(server.url())
            .with_redirect("http://localhost:3000/");

        let err = provider.load(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessToken);
        assert_eq!(err.description, "Authorization code not found");
    }

    #[tokio::test]
    async fn test_gatekeeper_error_fails_load() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/authenticate/EXPIRED")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"bad_code"}"#)
            .create_async()
            .await;

        let callback = Url::parse("http://localhost:3000/?rslCallback=github&code=EXPIRED").unwrap();
        let provider = provider(&server, Arc::new(RecordingNavigator::at(callback)));
        let options = LoadOptions::new("client123")
            .with_gatekeeper(server.url())
            .with_redirect("http://localhost:3000/");

        let err = provider.load(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessToken);
        assert_eq!(err.error["error"], "bad_code");
    }

    #[tokio::test]
    async fn test_gatekeeper_non_json_reply_is_not_a_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/authenticate/ABC")
            .with_status(404)
            .with_header("content-type", "text/html")
            .with_body("<html>Not Found</html>")
            .create_async()
            .await;

        let callback = Url::parse("http://localhost:3000/?rslCallback=github&code=ABC").unwrap();
        let provider = provider(&server, Arc::new(RecordingNavigator::at(callback)));
        let options = LoadOptions::new("client123")
            .with_gatekeeper(server.url())
            .with_redirect("http://localhost:3000/");

        let err = provider.load(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessToken);
        assert_eq!(
            err.description,
            "Gatekeeper returned an invalid access token response"
        );
        assert_eq!(err.error["status"], 404);
    }

    #[tokio::test]
    async fn test_gatekeeper_requires_redirect() {
        let server = mockito::Server::new_async().await;
        let provider = provider(&server, Arc::new(RecordingNavigator::new()));
        let options = LoadOptions::new("client123").with_gatekeeper("https://gk.example.com");

        let err = provider.load(&options).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Load);
    }

    #[tokio::test]
    async fn test_load_requires_app_id() {
        let server = mockito::Server::new_async().await;
        let provider = provider(&server, Arc::new(RecordingNavigator::new()));

        let err = provider.load(&LoadOptions::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Load);
        assert_eq!(err.description, "Cannot load SDK without appId");
    }

    #[tokio::test]
    async fn test_logout_always_fails() {
        let server = mockito::Server::new_async().await;
        let provider = provider(&server, Arc::new(RecordingNavigator::new()));

        let err = provider.logout().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Logout);
        assert_eq!(err.provider, ProviderId::Github);
    }

    #[test]
    fn test_build_authorize_url() {
        let url = GithubProvider::build_authorize_url(
            "client123",
            "http://localhost:3000/?next=home",
            &["repo".to_string(), "user".to_string()],
        )
        .unwrap();

        let state = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"http://localhost:3000/?next=home");
        assert_eq!(
            url,
            format!(
                "https://github.com/login/oauth/authorize?client_id=client123&redirect_uri={}&scope=user%20repo&state={}",
                urlencoding::encode("http://localhost:3000/?next=home&rslCallback=github"),
                state
            )
        );
    }

    #[test]
    fn test_generate_user_falls_back_to_login() {
        let provider = GithubProvider::new(Arc::new(RecordingNavigator::new()));
        let session = GithubSession {
            viewer: GithubViewer {
                id: "1".to_string(),
                login: "ghost".to_string(),
                name: None,
                email: None,
                avatar_url: None,
            },
            access_token: "X".to_string(),
        };

        let user = provider.generate_user(&session);
        assert_eq!(user.profile.first_name, "ghost");
        assert_eq!(user.profile.last_name, "ghost");
        assert_eq!(user, provider.generate_user(&session));
    }
}
