/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::application::models::platform::Platform;
use crate::config::AuthConfig;
use crate::error::{AuthError, CredentialError, FetchError};
use crate::session::auth::{
    AuthAttempt, AuthMode, AuthState, AuthStatus, Credential, LoginBusyPolicy,
};
use crate::session::interface::{AccessProbe, LoginAutomation, Session};
use crate::storage::credential_store::CredentialStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Decides per request whether a post needs credentials and obtains them
/// according to the deployment's [`AuthMode`].
///
/// Interactive logins are serialized process-wide through `login_lock`.
pub struct SessionManager {
    config: AuthConfig,
    store: Arc<dyn CredentialStore>,
    login: Arc<dyn LoginAutomation>,
    probe: Arc<dyn AccessProbe>,
    login_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn CredentialStore>,
        login: Arc<dyn LoginAutomation>,
        probe: Arc<dyn AccessProbe>,
    ) -> Self {
        Self {
            config,
            store,
            login,
            probe,
            login_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.config.mode
    }

    /// Produces a session able to read `url`, authenticating if the post is not public.
    #[instrument(skip(self, cancel), fields(mode = %self.config.mode))]
    pub async fn ensure_session(
        &self,
        url: &str,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<Session, AuthError> {
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }
        let mut attempt = AuthAttempt::new(platform);
        attempt.advance(AuthState::NeedsAuthCheck);

        match self.probe.is_publicly_accessible(url, platform, cancel).await {
            Ok(true) => {
                debug!("Post is public, no credentials needed");
                attempt.advance(AuthState::Authenticated);
                return Ok(Session::public(platform).with_history(attempt.history()));
            }
            Ok(false) => {}
            Err(FetchError::Cancelled) => return Err(AuthError::Cancelled),
            Err(e) => {
                warn!("Public access probe for {} failed: {}", platform, e);
                return Err(AuthError::Probe(e));
            }
        }
        attempt.advance(AuthState::Unauthenticated);

        match self.config.mode {
            AuthMode::Disabled => {
                attempt.advance(AuthState::AuthFailed);
                Err(AuthError::AuthRequired(platform))
            }
            AuthMode::Auto => match self.stored_credential(platform, cancel).await? {
                Some(credential) => Ok(Self::authenticated(&mut attempt, credential)),
                None => {
                    info!("No usable stored credential for {}", platform);
                    attempt.advance(AuthState::AuthFailed);
                    Err(AuthError::AuthRequired(platform))
                }
            },
            AuthMode::Manual => self.login_flow(&mut attempt, false, cancel).await,
            AuthMode::Prompt => match self.stored_credential(platform, cancel).await? {
                Some(credential) => Ok(Self::authenticated(&mut attempt, credential)),
                None => self.login_flow(&mut attempt, true, cancel).await,
            },
        }
    }

    fn authenticated(attempt: &mut AuthAttempt, credential: Credential) -> Session {
        attempt.advance(AuthState::Authenticated);
        Session::authenticated(credential).with_history(attempt.history())
    }

    /// Loads the stored credential and keeps it only if unexpired and still
    /// accepted by the platform; anything else is cleared and reads as absent.
    async fn stored_credential(
        &self,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<Option<Credential>, AuthError> {
        let credential = match self.store.load(platform).await {
            Ok(Some(credential)) => credential,
            Ok(None) => return Ok(None),
            Err(CredentialError::Corrupt { reason, .. }) => {
                warn!("Discarding unreadable {} credential: {}", platform, reason);
                self.store.clear(platform).await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if credential.is_expired() {
            info!("Stored {} credential expired at {}", platform, credential.expires_at);
            self.store.clear(platform).await?;
            return Ok(None);
        }

        match self.probe.is_session_alive(&credential, cancel).await {
            Ok(true) => Ok(Some(credential)),
            Ok(false) => {
                info!("Stored {} credential was rejected by the platform", platform);
                self.store.clear(platform).await?;
                Ok(None)
            }
            Err(FetchError::Cancelled) => Err(AuthError::Cancelled),
            Err(e) => Err(AuthError::Probe(e)),
        }
    }

    async fn login_flow(
        &self,
        attempt: &mut AuthAttempt,
        reuse_stored: bool,
        cancel: &CancellationToken,
    ) -> Result<Session, AuthError> {
        let platform = attempt.platform();
        let _guard = match self.config.busy_policy {
            LoginBusyPolicy::Queue => tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                guard = self.login_lock.lock() => guard,
            },
            LoginBusyPolicy::FailFast => self.login_lock.try_lock().map_err(|_| {
                warn!("Interactive login already running, rejecting {} request", platform);
                AuthError::AuthBusy
            })?,
        };

        // a queued request may find the credential the previous login just saved
        if reuse_stored {
            if let Some(credential) = self.stored_credential(platform, cancel).await? {
                return Ok(Self::authenticated(attempt, credential));
            }
        }

        attempt.advance(AuthState::AuthInProgress);
        let timeout = self.config.login_timeout();
        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
            result = tokio::time::timeout(
                timeout,
                self.login.interactive_login(platform, platform.login_url(), timeout),
            ) => result.unwrap_or_else(|_| Err(AuthError::AuthFailed(format!(
                "login not completed within {} seconds",
                timeout.as_secs()
            )))),
        };

        let outcome = outcome.and_then(|login| {
            self.config
                .session_validity()
                .and_then(|validity| Credential::new(platform, login, validity))
                .ok_or_else(|| {
                    AuthError::AuthFailed(format!(
                        "session validity of {} hours is out of range",
                        self.config.session_validity_hours
                    ))
                })
        });

        match outcome {
            Ok(credential) => {
                self.store.save(&credential).await?;
                info!("Interactive {} login succeeded", platform);
                Ok(Self::authenticated(attempt, credential))
            }
            Err(e) => {
                warn!("Interactive {} login failed: {}", platform, e);
                attempt.advance(AuthState::AuthFailed);
                Err(e)
            }
        }
    }

    /// Reports what is stored for `platform`; unreadable credentials report as absent.
    pub async fn status(&self, platform: Platform) -> Result<AuthStatus, AuthError> {
        let credential = match self.store.load(platform).await {
            Ok(credential) => credential,
            Err(CredentialError::Corrupt { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(AuthStatus {
            platform,
            mode: self.config.mode,
            has_credential: credential.is_some(),
            captured_at: credential.as_ref().map(|c| c.captured_at),
            expires_at: credential.as_ref().map(|c| c.expires_at),
            expired: credential.as_ref().is_some_and(Credential::is_expired),
        })
    }

    pub async fn logout(&self, platform: Platform) -> Result<(), AuthError> {
        self.store.clear(platform).await?;
        info!("Logged out of {}", platform);
        Ok(())
    }
}
