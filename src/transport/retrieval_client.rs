use crate::application::models::comment::RawComment;
use crate::application::models::platform::Platform;
use crate::application::services::content_fetcher::CommentSource;
use crate::config::RetrievalConfig;
use crate::error::{AuthError, FetchError};
use crate::session::auth::{CapturedLogin, Credential};
use crate::session::interface::{LoginAutomation, Session};
use crate::transport::http_client::RetrievalHttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Slack added to the HTTP timeout of an interactive login so the service
/// can report its own timeout before the connection is dropped.
const LOGIN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ProbeRequest<'a> {
    url: &'a str,
    platform: Platform,
}

#[derive(Debug, Deserialize)]
struct ProbeResponse {
    accessible: bool,
}

#[derive(Serialize)]
struct SessionCheckRequest<'a> {
    platform: Platform,
    cookies: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SessionCheckResponse {
    authenticated: bool,
}

#[derive(Serialize)]
struct CommentsRequest<'a> {
    url: &'a str,
    platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    cookies: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    platform: Platform,
    login_url: &'a str,
    timeout_secs: u64,
}

/// Client of the browser-automation service that renders posts and drives logins.
#[derive(Debug, Clone)]
pub struct HttpRetrievalService {
    client: RetrievalHttpClient,
}

impl HttpRetrievalService {
    pub fn new(client: RetrievalHttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &RetrievalConfig) -> Result<Self, FetchError> {
        Ok(Self::new(RetrievalHttpClient::new(
            &config.base_url,
            config.request_timeout(),
        )?))
    }
}

#[async_trait]
impl CommentSource for HttpRetrievalService {
    #[instrument(skip(self))]
    async fn probe_public(&self, url: &str, platform: Platform) -> Result<bool, FetchError> {
        let response: ProbeResponse = self
            .client
            .post("/probe", &ProbeRequest { url, platform })
            .await?;
        debug!("Public probe for {}: {}", url, response.accessible);
        Ok(response.accessible)
    }

    #[instrument(skip(self, credential), fields(platform = %credential.platform))]
    async fn check_session(&self, credential: &Credential) -> Result<bool, FetchError> {
        let request = SessionCheckRequest {
            platform: credential.platform,
            cookies: &credential.cookies,
            user_agent: credential.user_agent.as_deref(),
        };
        let response: SessionCheckResponse = match self
            .client
            .post("/session/check", &request)
            .await
        {
            Ok(response) => response,
            // a rejected cookie set is an answer, not a failure
            Err(FetchError::AuthRequired) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(response.authenticated)
    }

    #[instrument(skip(self, session), fields(authenticated = session.is_authenticated()))]
    async fn comments(
        &self,
        url: &str,
        platform: Platform,
        session: &Session,
    ) -> Result<Vec<RawComment>, FetchError> {
        let request = CommentsRequest {
            url,
            platform,
            cookies: session.cookies(),
            user_agent: session.user_agent(),
        };
        let response: CommentsResponse = self.client.post("/comments", &request).await?;
        Ok(response.comments)
    }
}

#[async_trait]
impl LoginAutomation for HttpRetrievalService {
    #[instrument(skip(self))]
    async fn interactive_login(
        &self,
        platform: Platform,
        login_url: &str,
        timeout: Duration,
    ) -> Result<CapturedLogin, AuthError> {
        let request = LoginRequest {
            platform,
            login_url,
            timeout_secs: timeout.as_secs(),
        };
        info!("Waiting for interactive {} login", platform);

        let result = self
            .client
            .post_with_timeout::<CapturedLogin, _>(
                "/login/interactive",
                &request,
                timeout + LOGIN_GRACE,
            )
            .await;

        match result {
            Ok(login) if login.cookies.trim().is_empty() => Err(AuthError::AuthFailed(
                "login finished without session cookies".to_string(),
            )),
            Ok(login) => Ok(login),
            Err(FetchError::Unexpected(StatusCode::REQUEST_TIMEOUT)) => {
                warn!("Interactive {} login timed out", platform);
                Err(AuthError::AuthFailed(format!(
                    "login not completed within {} seconds",
                    timeout.as_secs()
                )))
            }
            Err(FetchError::Unexpected(StatusCode::CONFLICT)) => {
                warn!("Interactive {} login aborted", platform);
                Err(AuthError::AuthFailed("login aborted by user".to_string()))
            }
            Err(e) => Err(AuthError::AuthFailed(e.to_string())),
        }
    }
}
