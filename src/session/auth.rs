use crate::application::models::platform::Platform;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How a deployment obtains credentials when a post is not publicly readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Stored credentials only, never an interactive login
    Auto,
    /// Always a fresh interactive login
    Manual,
    /// Stored credentials first, interactive login as fallback
    Prompt,
    /// No authentication at all
    Disabled,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Auto => "auto",
            AuthMode::Manual => "manual",
            AuthMode::Prompt => "prompt",
            AuthMode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(AuthMode::Auto),
            "manual" => Ok(AuthMode::Manual),
            "prompt" => Ok(AuthMode::Prompt),
            "disabled" => Ok(AuthMode::Disabled),
            other => Err(format!("unknown auth mode: {other}")),
        }
    }
}

/// What a request does when another interactive login holds the automation resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginBusyPolicy {
    Queue,
    FailFast,
}

impl fmt::Display for LoginBusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginBusyPolicy::Queue => write!(f, "queue"),
            LoginBusyPolicy::FailFast => write!(f, "fail_fast"),
        }
    }
}

impl FromStr for LoginBusyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(LoginBusyPolicy::Queue),
            "fail_fast" | "fail-fast" | "failfast" => Ok(LoginBusyPolicy::FailFast),
            other => Err(format!("unknown login busy policy: {other}")),
        }
    }
}

/// Steps of a single retrieval attempt's authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unchecked,
    NeedsAuthCheck,
    Authenticated,
    Unauthenticated,
    AuthInProgress,
    AuthFailed,
}

impl AuthState {
    pub fn can_transition_to(self, next: AuthState) -> bool {
        use AuthState::*;
        matches!(
            (self, next),
            (Unchecked, NeedsAuthCheck)
                | (NeedsAuthCheck, Authenticated)
                | (NeedsAuthCheck, Unauthenticated)
                | (Unauthenticated, Authenticated)
                | (Unauthenticated, AuthInProgress)
                | (Unauthenticated, AuthFailed)
                | (AuthInProgress, Authenticated)
                | (AuthInProgress, AuthFailed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::AuthFailed)
    }
}

/// Transition log of one attempt; owned by the request driving it.
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    platform: Platform,
    history: Vec<AuthState>,
}

impl AuthAttempt {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            history: vec![AuthState::Unchecked],
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn state(&self) -> AuthState {
        *self.history.last().unwrap_or(&AuthState::Unchecked)
    }

    pub fn history(&self) -> &[AuthState] {
        &self.history
    }

    pub(crate) fn advance(&mut self, next: AuthState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            debug!(platform = %self.platform, ?current, ?next, "Skipping invalid auth transition");
            return;
        }
        debug!(platform = %self.platform, ?current, ?next, "Auth state transition");
        self.history.push(next);
    }
}

/// Cookies and browser identity captured by a successful login.
#[derive(Clone, Deserialize, Serialize)]
pub struct CapturedLogin {
    pub cookies: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl fmt::Debug for CapturedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedLogin")
            .field("cookies", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Persisted proof of a prior login for one platform.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credential {
    pub platform: Platform,
    pub cookies: String,
    pub user_agent: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Stamps a fresh login; `None` when `validity` pushes the expiry past
    /// the representable range.
    pub fn new(platform: Platform, login: CapturedLogin, validity: Duration) -> Option<Self> {
        let captured_at = Utc::now();
        let expires_at = captured_at.checked_add_signed(validity)?;
        Some(Self {
            platform,
            cookies: login.cookies,
            user_agent: login.user_agent,
            captured_at,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("platform", &self.platform)
            .field("cookies", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("captured_at", &self.captured_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"platform\":\"{}\",\"cookies\":\"[REDACTED]\",\
             \"captured_at\":\"{}\",\"expires_at\":\"{}\"}}",
            self.platform,
            self.captured_at.to_rfc3339(),
            self.expires_at.to_rfc3339()
        )
    }
}

/// Snapshot reported by the auth-status surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub platform: Platform,
    pub mode: AuthMode,
    pub has_credential: bool,
    pub captured_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
}
