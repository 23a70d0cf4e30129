use crate::application::models::platform::Platform;
use crate::error::{AuthError, FetchError};
use crate::session::auth::{AuthState, CapturedLogin, Credential};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runtime authentication handle for one retrieval attempt.
///
/// Owned by a single in-flight request; not `Clone`.
#[derive(Debug)]
pub struct Session {
    platform: Platform,
    credential: Option<Credential>,
    authenticated: bool,
    history: Vec<AuthState>,
}

impl Session {
    /// Content is readable without logging in.
    pub fn public(platform: Platform) -> Self {
        Self {
            platform,
            credential: None,
            authenticated: false,
            history: Vec::new(),
        }
    }

    pub fn authenticated(credential: Credential) -> Self {
        Self {
            platform: credential.platform,
            credential: Some(credential),
            authenticated: true,
            history: Vec::new(),
        }
    }

    pub(crate) fn with_history(mut self, history: &[AuthState]) -> Self {
        self.history = history.to_vec();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn cookies(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.cookies.as_str())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.credential.as_ref().and_then(|c| c.user_agent.as_deref())
    }

    /// States the attempt went through before this session was issued.
    pub fn history(&self) -> &[AuthState] {
        &self.history
    }
}

/// External automation capability that runs a user-driven login.
///
/// Implementations hold an exclusive resource (typically a browser) while the
/// returned future is pending; dropping the future must release it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LoginAutomation: Send + Sync {
    async fn interactive_login(
        &self,
        platform: Platform,
        login_url: &str,
        timeout: Duration,
    ) -> Result<CapturedLogin, AuthError>;
}

/// Lightweight platform checks the session manager consults.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccessProbe: Send + Sync {
    /// Whether the post can be read without credentials.
    async fn is_publicly_accessible(
        &self,
        url: &str,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<bool, FetchError>;

    /// Whether a stored credential is still accepted by the platform.
    async fn is_session_alive(
        &self,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<bool, FetchError>;
}
