use async_trait::async_trait;
use comment_lottery::application::models::comment::RawComment;
use comment_lottery::application::models::platform::Platform;
use comment_lottery::application::models::request::LotteryRequest;
use comment_lottery::application::services::content_fetcher::CommentSource;
use comment_lottery::application::services::lottery_service::LotteryService;
use comment_lottery::config::{AuthConfig, Config, RetrievalConfig, StorageConfig};
use comment_lottery::error::{AppError, AuthError, FetchError};
use comment_lottery::presentation::encryption::Encryptor;
use comment_lottery::session::auth::{AuthMode, CapturedLogin, Credential, LoginBusyPolicy};
use comment_lottery::session::interface::{LoginAutomation, Session};
use comment_lottery::storage::credential_store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
use comment_lottery::utils::logger::setup_logger;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const POST: &str = "https://www.threads.net/@shop/post/C9xyz";

/// Retrieval service double: requires `required_cookie` when the post is private.
struct FakeSource {
    public: bool,
    required_cookie: &'static str,
    comments: Vec<RawComment>,
    hang: bool,
    comment_calls: AtomicUsize,
}

impl FakeSource {
    fn new(public: bool, comments: Vec<RawComment>) -> Self {
        Self {
            public,
            required_cookie: "sessionid=good",
            comments,
            hang: false,
            comment_calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentSource for FakeSource {
    async fn probe_public(&self, _url: &str, _platform: Platform) -> Result<bool, FetchError> {
        Ok(self.public)
    }

    async fn check_session(&self, credential: &Credential) -> Result<bool, FetchError> {
        Ok(credential.cookies == self.required_cookie)
    }

    async fn comments(
        &self,
        _url: &str,
        _platform: Platform,
        session: &Session,
    ) -> Result<Vec<RawComment>, FetchError> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if !self.public && session.cookies() != Some(self.required_cookie) {
            return Err(FetchError::AuthRequired);
        }
        Ok(self.comments.clone())
    }
}

struct FakeLogin {
    cookies: &'static str,
    calls: AtomicUsize,
}

impl FakeLogin {
    fn new(cookies: &'static str) -> Self {
        Self {
            cookies,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LoginAutomation for FakeLogin {
    async fn interactive_login(
        &self,
        _platform: Platform,
        _login_url: &str,
        _timeout: Duration,
    ) -> Result<CapturedLogin, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CapturedLogin {
            cookies: self.cookies.to_string(),
            user_agent: None,
        })
    }
}

fn config(mode: AuthMode) -> Config {
    Config {
        auth: AuthConfig {
            mode,
            session_validity_hours: 24,
            login_timeout_secs: 300,
            busy_policy: LoginBusyPolicy::Queue,
        },
        retrieval: RetrievalConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 60,
            max_retries: 3,
            backoff_ms: 200,
            request_timeout_secs: 10,
        },
        storage: StorageConfig {
            credential_dir: std::env::temp_dir(),
            encryption_key: None,
        },
    }
}

fn raw(user: &str, text: &str) -> RawComment {
    RawComment {
        username: Some(user.into()),
        text: text.into(),
        ..Default::default()
    }
}

fn request(mode: &str, winner_count: i64) -> LotteryRequest {
    LotteryRequest {
        url: POST.into(),
        mode: mode.into(),
        winner_count,
        ..Default::default()
    }
}

fn service(
    mode: AuthMode,
    store: Arc<dyn CredentialStore>,
    source: Arc<FakeSource>,
    login: Arc<FakeLogin>,
) -> LotteryService {
    LotteryService::new(&config(mode), store, source, login)
}

#[tokio::test]
async fn test_keyword_draw() {
    setup_logger();
    let mut comments: Vec<_> = (0..5).map(|i| raw(&format!("fan{i}"), "讚 贊 好")).collect();
    comments.extend((0..4).map(|i| raw(&format!("lurker{i}"), "nice")));
    let source = Arc::new(FakeSource::new(true, comments));
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        source,
        Arc::new(FakeLogin::new("unused")),
    );

    let mut req = request("1", 3);
    req.keyword = Some("贊".into());
    let result = svc.run(&req, &CancellationToken::new()).await.unwrap();

    assert_eq!(result.draw.winners.len(), 3);
    assert_eq!(result.draw.eligible_count, 5);
    assert_eq!(result.draw.total_participants, 9);
    assert!(result.draw.winners.iter().all(|w| w.comment_text.contains('贊')));
    assert_eq!(result.draw.mode_name(), "關鍵字篩選");
}

#[tokio::test]
async fn test_open_draw_with_duplicates() {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h", "a", "c"];
    let comments = names.iter().map(|n| raw(n, "hi")).collect();
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FakeSource::new(true, comments)),
        Arc::new(FakeLogin::new("unused")),
    );

    let result = svc
        .run(&request("2", 50), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.draw.total_participants, 10);
    assert_eq!(result.draw.eligible_count, 8);
    assert_eq!(result.draw.winners.len(), 8);
}

#[tokio::test]
async fn test_mention_draw_without_eligible() {
    let comments = vec![raw("a", "@x"), raw("b", "hello"), raw("c", "@y here")];
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FakeSource::new(true, comments)),
        Arc::new(FakeLogin::new("unused")),
    );

    let mut req = request("3", 2);
    req.mention_count = Some(2);
    let response = svc.handle(&req, &CancellationToken::new()).await;

    assert_eq!(response.status_code(), 200);
    let body = response.to_json();
    assert_eq!(body["success"], true);
    assert_eq!(body["total_participants"], 3);
    assert_eq!(body["winners"], serde_json::json!([]));
    assert_eq!(body["mode"], "3");
}

#[tokio::test]
async fn test_auto_mode_without_credential_fails_before_retrieval() {
    let source = Arc::new(FakeSource::new(false, vec![raw("a", "hi")]));
    let login = Arc::new(FakeLogin::new("sessionid=good"));
    let svc = service(
        AuthMode::Auto,
        Arc::new(MemoryCredentialStore::new()),
        source.clone(),
        login.clone(),
    );

    let err = svc
        .run(&request("2", 1), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthRequired(_)));
    assert_eq!(err.status_code(), 401);
    assert_eq!(source.calls(), 0);
    assert_eq!(login.calls.load(Ordering::SeqCst), 0);
    assert!(svc.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_retrieval_reports_failure() {
    let mut fake = FakeSource::new(true, vec![]);
    fake.hang = true;
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(fake),
        Arc::new(FakeLogin::new("unused")),
    );

    let response = svc.handle(&request("2", 1), &CancellationToken::new()).await;
    assert_eq!(response.status_code(), 502);
    assert_eq!(response.to_json()["success"], false);
    assert!(svc.results().is_empty());
}

#[tokio::test]
async fn test_prompt_login_persists_and_is_reused() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(
        dir.path(),
        Encryptor::from_secret("deployment-secret").unwrap(),
    ));
    let source = Arc::new(FakeSource::new(false, vec![raw("amy", "hi"), raw("bo", "yo")]));
    let login = Arc::new(FakeLogin::new("sessionid=good"));
    let svc = service(AuthMode::Prompt, store.clone(), source.clone(), login.clone());

    svc.run(&request("2", 1), &CancellationToken::new())
        .await
        .unwrap();
    svc.run(&request("2", 1), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(login.calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.calls(), 2);
    assert_eq!(svc.results().len(), 2);
    let status = svc.sessions().status(Platform::Threads).await.unwrap();
    assert!(status.has_credential);
}

#[tokio::test]
async fn test_rejected_credential_is_replaced() {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    store
        .save(&Credential::new(
            Platform::Threads,
            CapturedLogin {
                cookies: "sessionid=revoked".into(),
                user_agent: None,
            },
            chrono::Duration::hours(12),
        )
        .unwrap())
        .await
        .unwrap();
    let source = Arc::new(FakeSource::new(false, vec![raw("amy", "hi")]));
    let login = Arc::new(FakeLogin::new("sessionid=good"));
    let svc = service(AuthMode::Prompt, store.clone(), source, login.clone());

    svc.run(&request("2", 1), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(login.calls.load(Ordering::SeqCst), 1);
    let stored = store.load(Platform::Threads).await.unwrap().unwrap();
    assert_eq!(stored.cookies, "sessionid=good");
}

#[tokio::test]
async fn test_cancelled_request_stores_nothing() {
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FakeSource::new(true, vec![raw("a", "hi")])),
        Arc::new(FakeLogin::new("unused")),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = svc.run(&request("2", 1), &cancel).await.unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(err.status_code(), 499);
    assert!(svc.results().is_empty());
}

#[tokio::test]
async fn test_stored_result_is_downloadable() {
    let svc = service(
        AuthMode::Disabled,
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(FakeSource::new(true, vec![raw("a", "hi"), raw("b", "yo")])),
        Arc::new(FakeLogin::new("unused")),
    );
    let response = svc.handle(&request("2", 1), &CancellationToken::new()).await;
    let body = response.to_json();
    let id = body["result_id"].as_str().unwrap();

    let result = svc.result(id).unwrap();
    assert_eq!(result.draw.winners.len(), 1);
    assert_eq!(body["winners"][0]["username"], result.draw.winners[0].username.as_str());

    svc.results().clear();
    assert!(matches!(svc.result(id), Err(AppError::NotFound(_))));
}
