use crate::constants::{
    DEFAULT_BACKOFF_MS, DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRIEVAL_TIMEOUT_SECS, DEFAULT_SESSION_VALIDITY_HOURS,
    MAX_BACKOFF_MS, MAX_SESSION_VALIDITY_HOURS,
};
use crate::session::auth::{AuthMode, LoginBusyPolicy};
use crate::utils::retry::RetryPolicy;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub session_validity_hours: i64,
    pub login_timeout_secs: u64,
    pub busy_policy: LoginBusyPolicy,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub base_url: String,
    /// Ceiling for the whole retrieval phase, retries included.
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// Timeout of a single HTTP exchange with the retrieval service.
    pub request_timeout_secs: u64,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub credential_dir: PathBuf,
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub retrieval: RetrievalConfig,
    pub storage: StorageConfig,
}

impl AuthConfig {
    /// `None` when the configured hours do not fit a [`chrono::TimeDelta`].
    pub fn session_validity(&self) -> Option<chrono::TimeDelta> {
        chrono::TimeDelta::try_hours(self.session_validity_hours)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Prompt,
            session_validity_hours: DEFAULT_SESSION_VALIDITY_HOURS,
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            busy_policy: LoginBusyPolicy::Queue,
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.backoff_ms),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS.max(self.backoff_ms)),
            jitter: true,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:3000"),
            timeout_secs: DEFAULT_RETRIEVAL_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: DEFAULT_BACKOFF_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"mode\":\"{}\",\"session_validity_hours\":{},\
             \"login_timeout_secs\":{},\"busy_policy\":\"{}\"}}",
            self.mode,
            self.session_validity_hours,
            self.login_timeout_secs,
            self.busy_policy
        )
    }
}

impl fmt::Display for RetrievalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout_secs\":{},\"max_retries\":{},\
             \"backoff_ms\":{},\"request_timeout_secs\":{}}}",
            self.base_url,
            self.timeout_secs,
            self.max_retries,
            self.backoff_ms,
            self.request_timeout_secs
        )
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credential_dir\":{:?},\"encryption_key\":{}}}",
            self.credential_dir.display().to_string(),
            self.encryption_key
                .as_ref()
                .map_or("null".to_string(), |_| "\"[REDACTED]\"".to_string())
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"auth\":{},\"retrieval\":{},\"storage\":{}}}",
            self.auth, self.retrieval, self.storage
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

/// Session validity from the environment, bounded to `1..=MAX_SESSION_VALIDITY_HOURS`.
fn session_validity_hours_from_env(default: i64) -> i64 {
    let hours = get_env_or_default("LOTTERY_SESSION_VALIDITY_HOURS", default);
    if (1..=MAX_SESSION_VALIDITY_HOURS).contains(&hours) {
        hours
    } else {
        error!(
            "LOTTERY_SESSION_VALIDITY_HOURS must be between 1 and {}, got {}, using default",
            MAX_SESSION_VALIDITY_HOURS, hours
        );
        default
    }
}

fn default_credential_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join(".comment_lottery")
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let auth_defaults = AuthConfig::default();
        let retrieval_defaults = RetrievalConfig::default();
        Config {
            auth: AuthConfig {
                mode: get_env_or_default("LOTTERY_AUTH_MODE", auth_defaults.mode),
                session_validity_hours: session_validity_hours_from_env(
                    auth_defaults.session_validity_hours,
                ),
                login_timeout_secs: get_env_or_default(
                    "LOTTERY_LOGIN_TIMEOUT_SECS",
                    auth_defaults.login_timeout_secs,
                ),
                busy_policy: get_env_or_default(
                    "LOTTERY_LOGIN_BUSY_POLICY",
                    auth_defaults.busy_policy,
                ),
            },
            retrieval: RetrievalConfig {
                base_url: get_env_or_default(
                    "LOTTERY_RETRIEVAL_BASE_URL",
                    retrieval_defaults.base_url,
                ),
                timeout_secs: get_env_or_default(
                    "LOTTERY_RETRIEVAL_TIMEOUT_SECS",
                    retrieval_defaults.timeout_secs,
                ),
                max_retries: get_env_or_default(
                    "LOTTERY_RETRIEVAL_MAX_RETRIES",
                    retrieval_defaults.max_retries,
                ),
                backoff_ms: get_env_or_default(
                    "LOTTERY_RETRIEVAL_BACKOFF_MS",
                    retrieval_defaults.backoff_ms,
                ),
                request_timeout_secs: get_env_or_default(
                    "LOTTERY_REQUEST_TIMEOUT_SECS",
                    retrieval_defaults.request_timeout_secs,
                ),
            },
            storage: StorageConfig {
                credential_dir: env::var_os("LOTTERY_CREDENTIAL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_credential_dir),
                encryption_key: env::var("LOTTERY_CREDENTIAL_KEY")
                    .ok()
                    .filter(|k| !k.is_empty()),
            },
        }
    }
}
