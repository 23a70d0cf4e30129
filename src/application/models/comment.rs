use crate::constants::RESERVED_HANDLES;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_.]+)").expect("valid mention regex"));

/// Comment record as handed over by the content-retrieval service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default, alias = "author", alias = "user")]
    pub username: Option<String>,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub mentions: Option<Vec<String>>,
    #[serde(default, alias = "avatar")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl fmt::Display for RawComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}

/// A commenter as seen by the selection rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub username: String,
    pub comment_text: String,
    pub avatar_url: Option<String>,
    pub mentioned_accounts: Vec<String>,
}

impl Participant {
    /// Maps one raw record; `None` when no usable username can be resolved.
    pub fn from_raw(raw: &RawComment) -> Option<Self> {
        let username = raw.username.as_deref().map(clean_handle).unwrap_or_default();
        if username.is_empty() || is_reserved(&username) {
            return None;
        }

        let mentioned_accounts = match &raw.mentions {
            Some(explicit) => dedup_mentions(explicit.iter().map(String::as_str), &username),
            None => extract_mentions(&raw.text, &username),
        };

        let avatar_url = raw
            .avatar_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Some(Self {
            username,
            comment_text: raw.text.clone(),
            avatar_url,
            mentioned_accounts,
        })
    }

    pub fn mention_count(&self) -> usize {
        self.mentioned_accounts.len()
    }

    /// Case-insensitive substring match; an empty keyword matches everything.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        keyword.is_empty() || self.comment_text.to_lowercase().contains(&keyword.to_lowercase())
    }

    pub(crate) fn identity(&self) -> String {
        self.username.to_lowercase()
    }
}

/// Normalized view of one retrieved thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedComments {
    pub participants: Vec<Participant>,
    /// Records without a usable username, reserved system handles included.
    pub dropped: usize,
}

/// Maps raw records to participants in retrieval order.
pub fn normalize(raw: &[RawComment]) -> NormalizedComments {
    let participants: Vec<Participant> = raw.iter().filter_map(Participant::from_raw).collect();
    NormalizedComments {
        dropped: raw.len() - participants.len(),
        participants,
    }
}

fn clean_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').trim().to_string()
}

fn is_reserved(username: &str) -> bool {
    RESERVED_HANDLES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
}

fn extract_mentions(text: &str, author: &str) -> Vec<String> {
    let found = MENTION_REGEX
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.'));
    dedup_mentions(found, author)
}

fn dedup_mentions<'a>(mentions: impl Iterator<Item = &'a str>, author: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    mentions
        .map(clean_handle)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case(author))
        .filter(|m| seen.insert(m.to_lowercase()))
        .collect()
}
