use crate::application::models::comment::{normalize, NormalizedComments, RawComment};
use crate::application::models::platform::Platform;
use crate::config::RetrievalConfig;
use crate::error::FetchError;
use crate::session::auth::Credential;
use crate::session::interface::{AccessProbe, Session};
use crate::utils::retry::retry_with_backoff;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// External content-retrieval capability (headless browser or scraper gateway).
///
/// Each call is a single attempt; retries, deadlines and cancellation are
/// applied by [`ContentFetcher`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Whether the post renders its comments without a logged-in session.
    async fn probe_public(&self, url: &str, platform: Platform) -> Result<bool, FetchError>;

    /// Whether the platform still honours the credential's cookies.
    async fn check_session(&self, credential: &Credential) -> Result<bool, FetchError>;

    async fn comments(
        &self,
        url: &str,
        platform: Platform,
        session: &Session,
    ) -> Result<Vec<RawComment>, FetchError>;
}

/// Platform-aware comment retrieval with retry, backoff and a hard deadline.
pub struct ContentFetcher {
    source: Arc<dyn CommentSource>,
    config: RetrievalConfig,
}

impl ContentFetcher {
    pub fn new(source: Arc<dyn CommentSource>, config: RetrievalConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieves the raw comment thread of `url`.
    ///
    /// The platform is resolved before any network call. The whole retrieval,
    /// retries and backoff included, is bounded by the configured ceiling;
    /// cancellation reports [`FetchError::Cancelled`] and never partial data.
    #[instrument(skip(self, session, cancel), fields(platform = tracing::field::Empty))]
    pub async fn fetch(
        &self,
        url: &str,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawComment>, FetchError> {
        let platform = Platform::detect(url)?;
        tracing::Span::current().record("platform", platform.as_str());
        if session.platform() != platform {
            warn!(
                "Session issued for {} cannot read a {} post",
                session.platform(),
                platform
            );
            return Err(FetchError::AuthRequired);
        }

        let policy = self.config.retry_policy();
        let ceiling = self.config.timeout();
        let source = &self.source;
        let retrieval = retry_with_backoff(&policy, cancel, |attempt| async move {
            debug!(attempt, authenticated = session.is_authenticated(), "Requesting comments");
            source.comments(url, platform, session).await
        });

        let comments = match tokio::time::timeout(ceiling, retrieval).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Comment retrieval exceeded {:?}", ceiling);
                return Err(FetchError::Timeout(ceiling));
            }
        };

        info!("Retrieved {} comments from {}", comments.len(), platform);
        Ok(comments)
    }

    /// [`fetch`](Self::fetch) followed by normalization into participants.
    pub async fn fetch_participants(
        &self,
        url: &str,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<(usize, NormalizedComments), FetchError> {
        let raw = self.fetch(url, session, cancel).await?;
        let normalized = normalize(&raw);
        if normalized.dropped > 0 {
            debug!("Dropped {} comments without a usable username", normalized.dropped);
        }
        Ok((raw.len(), normalized))
    }

    async fn single_probe<F>(
        &self,
        cancel: &CancellationToken,
        probe: F,
    ) -> Result<bool, FetchError>
    where
        F: std::future::Future<Output = Result<bool, FetchError>> + Send,
    {
        let timeout = self.config.request_timeout();
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            outcome = tokio::time::timeout(timeout, probe) => {
                outcome.unwrap_or(Err(FetchError::Timeout(timeout)))
            }
        }
    }
}

#[async_trait]
impl AccessProbe for ContentFetcher {
    async fn is_publicly_accessible(
        &self,
        url: &str,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<bool, FetchError> {
        let policy = self.config.retry_policy();
        retry_with_backoff(&policy, cancel, |attempt| async move {
            debug!(attempt, %platform, "Probing public access");
            self.single_probe(cancel, self.source.probe_public(url, platform))
                .await
        })
        .await
    }

    async fn is_session_alive(
        &self,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<bool, FetchError> {
        self.single_probe(cancel, self.source.check_session(credential))
            .await
    }
}
