use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use super::models::{
    CommunityId, GetCommunityResponse, LoginRequest, LoginResponse, NewPost, PostId, PostResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest error body kept in [`ForumError::HttpStatus`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Request timed out after 30s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Login did not return a token (account pending verification or approval?)")]
    NoToken,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Insecure instance URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// Minimal client for a Lemmy instance's v3 API.
pub struct LemmyClient {
    http: reqwest::Client,
    base_url: String,
    jwt: Option<SecretString>,
}

impl LemmyClient {
    /// Create a client for the instance at `base_url`.
    ///
    /// Credentials travel in request bodies and headers, so plain HTTP is
    /// only accepted for localhost.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, ForumError> {
        let base_url = base_url.trim_end_matches('/');
        if !base_url.starts_with("https://") {
            let is_localhost = base_url.starts_with("http://127.0.0.1")
                || base_url.starts_with("http://localhost");
            if !is_localhost {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS instance URL");
                return Err(ForumError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base_url, "Using non-HTTPS instance URL (localhost only)");
        }

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            jwt: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    pub fn is_logged_in(&self) -> bool {
        self.jwt.is_some()
    }

    /// POST /api/v3/user/login
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), ForumError> {
        let request = self.http.post(self.url("/user/login")).json(&LoginRequest {
            username_or_email: username,
            password: password.expose_secret(),
        });

        let response: LoginResponse = send_json(request, "user/login").await?;
        let jwt = response.jwt.ok_or(ForumError::NoToken)?;
        self.jwt = Some(SecretString::from(jwt));
        tracing::info!(instance = %self.base_url, user = %username, "Logged in");
        Ok(())
    }

    /// GET /api/v3/community?name=
    pub async fn discover_community(&self, name: &str) -> Result<CommunityId, ForumError> {
        let request = self.authorized(self.http.get(self.url("/community")).query(&[("name", name)]));

        let response: GetCommunityResponse = send_json(request, "community").await?;
        let id = response.community_view.community.id;
        tracing::debug!(community = %name, community_id = id, "Resolved community");
        Ok(id)
    }

    /// POST /api/v3/post
    pub async fn create_post(&self, post: &NewPost) -> Result<PostId, ForumError> {
        let token = self.jwt.as_ref().ok_or(ForumError::NotLoggedIn)?;
        let request = self
            .http
            .post(self.url("/post"))
            .bearer_auth(token.expose_secret())
            .json(post);

        let response: PostResponse = send_json(request, "post").await?;
        Ok(response.post_view.post.id)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.jwt {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    endpoint: &'static str,
) -> Result<T, ForumError> {
    let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| ForumError::Timeout)?
        .map_err(ForumError::Network)?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(ForumError::Network)?;

    if !status.is_success() {
        let mut body = String::from_utf8_lossy(&bytes).into_owned();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(ForumError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_slice(&bytes).map_err(|source| ForumError::Decode { endpoint, source })
}
