/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/10/26
 ******************************************************************************/
use crate::application::models::platform::Platform;
use reqwest::StatusCode;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures of the encrypted credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The stored blob exists but cannot be decrypted or decoded.
    #[error("corrupt credential for {platform}: {reason}")]
    Corrupt { platform: Platform, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("encryption error: {0}")]
    Encryption(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("authentication required")]
    AuthRequired,
    #[error("post unavailable: {0}")]
    PostUnavailable(String),
    #[error("rate limited by platform")]
    RateLimited,
    #[error("server error: {0}")]
    Server(StatusCode),
    #[error("network error: {0}")]
    Network(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected http status: {0}")]
    Unexpected(StatusCode),
    #[error("parser error: {0}")]
    Parse(String),
    #[error("retrieval timed out after {0:?}")]
    Timeout(Duration),
    #[error("retrieval failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
    #[error("retrieval cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether another attempt may succeed: network failures, 5xx and rate limits.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Server(_) | FetchError::RateLimited
        )
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::AuthRequired,
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                FetchError::PostUnavailable(body.to_string())
            }
            StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
            s if s.is_server_error() => FetchError::Server(s),
            s => FetchError::Unexpected(s),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
            FetchError::Network(e.to_string())
        } else if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required for {0}")]
    AuthRequired(Platform),
    #[error("interactive login failed: {0}")]
    AuthFailed(String),
    #[error("another interactive login is in progress")]
    AuthBusy,
    #[error("authentication cancelled")]
    Cancelled,
    #[error("credential store error: {0}")]
    Store(#[from] CredentialError),
    #[error("session probe failed: {0}")]
    Probe(#[from] FetchError),
}

/// Caller-facing failure of a lottery request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported platform: {0}. Please use Threads or Instagram post URLs")]
    UnsupportedPlatform(String),
    #[error("{0}")]
    AuthRequired(String),
    #[error("{0}")]
    AuthFailed(String),
    #[error("another interactive login is in progress, try again later")]
    AuthBusy,
    #[error("request cancelled")]
    Cancelled,
    #[error("lottery result not found: {0}")]
    NotFound(String),
    #[error("failed to retrieve comments: {0}")]
    Retrieval(String),
    #[error("post unavailable: {0}")]
    PostUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP-equivalent status for the excluded web layer.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidRequest(_)
            | AppError::InvalidUrl(_)
            | AppError::UnsupportedPlatform(_) => 400,
            AppError::AuthRequired(_) | AppError::AuthFailed(_) => 401,
            AppError::NotFound(_) | AppError::PostUnavailable(_) => 404,
            AppError::AuthBusy => 409,
            AppError::Cancelled => 499,
            AppError::Retrieval(_) => 502,
            AppError::Internal(_) => 500,
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidUrl(s) => AppError::InvalidUrl(s),
            FetchError::UnsupportedPlatform(s) => AppError::UnsupportedPlatform(s),
            FetchError::AuthRequired => {
                AppError::AuthRequired("authentication required to read this post".to_string())
            }
            FetchError::PostUnavailable(s) => AppError::PostUnavailable(s),
            FetchError::Cancelled => AppError::Cancelled,
            other => AppError::Retrieval(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            e @ AuthError::AuthRequired(_) => AppError::AuthRequired(e.to_string()),
            e @ AuthError::AuthFailed(_) => AppError::AuthFailed(e.to_string()),
            AuthError::AuthBusy => AppError::AuthBusy,
            AuthError::Cancelled => AppError::Cancelled,
            AuthError::Store(e) => AppError::Internal(e.to_string()),
            AuthError::Probe(e) => AppError::from(e),
        }
    }
}
