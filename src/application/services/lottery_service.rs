/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::application::models::comment::NormalizedComments;
use crate::application::models::lottery::{LotteryResult, PostSource};
use crate::application::models::platform::PostUrl;
use crate::application::models::request::{LotteryRequest, LotteryResponse, Preview, PreviewEntry};
use crate::application::services::content_fetcher::{CommentSource, ContentFetcher};
use crate::application::services::selection_engine::SelectionEngine;
use crate::config::Config;
use crate::constants::{PREVIEW_SAMPLE_SIZE, PREVIEW_TEXT_LIMIT};
use crate::error::AppError;
use crate::presentation::encryption::Encryptor;
use crate::session::interface::LoginAutomation;
use crate::session::session::SessionManager;
use crate::storage::credential_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::storage::result_store::ResultStore;
use crate::transport::retrieval_client::HttpRetrievalService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Runs a lottery request end to end: session, retrieval, selection, storage.
pub struct LotteryService {
    sessions: SessionManager,
    fetcher: Arc<ContentFetcher>,
    engine: SelectionEngine,
    results: ResultStore,
}

impl LotteryService {
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        source: Arc<dyn CommentSource>,
        login: Arc<dyn LoginAutomation>,
    ) -> Self {
        let fetcher = Arc::new(ContentFetcher::new(source, config.retrieval.clone()));
        let sessions = SessionManager::new(config.auth.clone(), store, login, fetcher.clone());
        Self {
            sessions,
            fetcher,
            engine: SelectionEngine::new(),
            results: ResultStore::new(),
        }
    }

    /// Wires the HTTP retrieval service and the credential store the config describes.
    ///
    /// Without an encryption key credentials are kept in memory only.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let service = Arc::new(
            HttpRetrievalService::from_config(&config.retrieval)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );
        let store: Arc<dyn CredentialStore> = match &config.storage.encryption_key {
            Some(key) => {
                let cipher = Encryptor::from_secret(key)
                    .map_err(|e| AppError::Internal(format!("invalid credential key: {e}")))?;
                Arc::new(FileCredentialStore::new(&config.storage.credential_dir, cipher))
            }
            None => {
                warn!("No credential key configured, credentials will not survive a restart");
                Arc::new(MemoryCredentialStore::new())
            }
        };
        info!("Lottery service configured: {}", config);
        Ok(Self::new(config, store, service.clone(), service))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Validates, draws and stores; nothing is stored unless every step succeeds.
    #[instrument(skip(self, request, cancel), fields(url = %request.url, mode = %request.mode))]
    pub async fn run(
        &self,
        request: &LotteryRequest,
        cancel: &CancellationToken,
    ) -> Result<Arc<LotteryResult>, AppError> {
        let params = request.validate()?;
        let post = PostUrl::parse(&params.url)?;
        let (_, normalized) = self.collect(&post, cancel).await?;
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let draw = self
            .engine
            .select(&normalized.participants, params.mode, &params.selection)
            .with_source(PostSource::from(&post));
        let result_id = self.results.put(draw);
        info!("Lottery {} completed", result_id);
        self.results
            .get(&result_id)
            .ok_or_else(|| AppError::Internal(format!("result {result_id} vanished after store")))
    }

    /// [`run`](Self::run) rendered as the reply the web layer sends back.
    pub async fn handle(
        &self,
        request: &LotteryRequest,
        cancel: &CancellationToken,
    ) -> LotteryResponse {
        match self.run(request, cancel).await {
            Ok(result) => LotteryResponse::success(&result),
            Err(e) => {
                error!("Lottery request failed: {}", e);
                LotteryResponse::failure(&e)
            }
        }
    }

    /// Eligibility overview of a post without drawing or storing anything.
    #[instrument(skip(self, request, cancel), fields(url = %request.url))]
    pub async fn preview(
        &self,
        request: &LotteryRequest,
        cancel: &CancellationToken,
    ) -> Result<Preview, AppError> {
        let params = request.validate()?;
        let post = PostUrl::parse(&params.url)?;
        let (total_comments, normalized) = self.collect(&post, cancel).await?;
        let eligible = self
            .engine
            .eligible(&normalized.participants, params.mode, &params.selection);

        Ok(Preview {
            total_comments,
            total_participants: normalized.participants.len(),
            eligible_count: eligible.len(),
            eligible_participants: eligible
                .iter()
                .take(PREVIEW_SAMPLE_SIZE)
                .map(|p| PreviewEntry {
                    username: p.username.clone(),
                    content: truncate(&p.comment_text, PREVIEW_TEXT_LIMIT),
                    mention_count: p.mention_count(),
                })
                .collect(),
        })
    }

    /// Lookup for the download collaborator.
    pub fn result(&self, result_id: &str) -> Result<Arc<LotteryResult>, AppError> {
        self.results
            .get_str(result_id)
            .ok_or_else(|| AppError::NotFound(result_id.to_string()))
    }

    async fn collect(
        &self,
        post: &PostUrl,
        cancel: &CancellationToken,
    ) -> Result<(usize, NormalizedComments), AppError> {
        let session = self
            .sessions
            .ensure_session(&post.url, post.platform, cancel)
            .await?;
        Ok(self
            .fetcher
            .fetch_participants(&post.url, &session, cancel)
            .await?)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    format!("{head}...")
}
