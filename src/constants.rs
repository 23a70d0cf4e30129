/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

pub(crate) const THREADS_HOSTS: &[&str] = &["threads.net", "threads.com"];
pub(crate) const INSTAGRAM_HOSTS: &[&str] = &["instagram.com"];

pub(crate) const THREADS_LOGIN_URL: &str = "https://www.threads.com/login";
pub(crate) const INSTAGRAM_LOGIN_URL: &str = "https://www.instagram.com/accounts/login/";

/// Platform system handles that never take part in a draw.
pub(crate) const RESERVED_HANDLES: &[&str] = &["instagram", "threads", "meta", "facebook"];

pub const DEFAULT_AVATAR_URL: &str = "/static/images/default-avatar.png";

pub(crate) const DEFAULT_RETRIEVAL_TIMEOUT_SECS: u64 = 60;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;
pub(crate) const DEFAULT_BACKOFF_MS: u64 = 1_000;
pub(crate) const MAX_BACKOFF_MS: u64 = 10_000;

pub(crate) const DEFAULT_SESSION_VALIDITY_HOURS: i64 = 24;
/// One year.
pub(crate) const MAX_SESSION_VALIDITY_HOURS: i64 = 24 * 365;
pub(crate) const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;

pub(crate) const PREVIEW_SAMPLE_SIZE: usize = 10;
pub(crate) const PREVIEW_TEXT_LIMIT: usize = 100;

pub(crate) const USER_AGENT: &str = "comment-lottery/0.1";
