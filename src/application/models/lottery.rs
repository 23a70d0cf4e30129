/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/10/26
 ******************************************************************************/
use crate::application::models::comment::Participant;
use crate::application::models::platform::{Platform, PostUrl};
use crate::constants::DEFAULT_AVATAR_URL;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Selection rule of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LotteryMode {
    /// Comment must contain a keyword
    #[serde(rename = "1")]
    Keyword,
    /// Every commenter takes part
    #[serde(rename = "2")]
    Open,
    /// Comment must mention at least N accounts
    #[serde(rename = "3")]
    Mention,
}

impl LotteryMode {
    pub fn code(&self) -> &'static str {
        match self {
            LotteryMode::Keyword => "1",
            LotteryMode::Open => "2",
            LotteryMode::Mention => "3",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LotteryMode::Keyword => "關鍵字篩選",
            LotteryMode::Open => "所有留言者",
            LotteryMode::Mention => "標註指定帳號",
        }
    }
}

impl fmt::Display for LotteryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LotteryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(LotteryMode::Keyword),
            "2" => Ok(LotteryMode::Open),
            "3" => Ok(LotteryMode::Mention),
            other => Err(format!("mode must be 1, 2, or 3, got {other:?}")),
        }
    }
}

/// Parameters the selection rules read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionParams {
    pub winner_count: usize,
    pub keyword: Option<String>,
    pub mention_count: usize,
    /// Fixes the draw for replay; entropy-seeded when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub rank: usize,
    pub username: String,
    pub comment_text: String,
    pub avatar_url: String,
}

impl Winner {
    pub(crate) fn new(rank: usize, participant: &Participant) -> Self {
        Self {
            rank,
            username: participant.username.clone(),
            comment_text: participant.comment_text.clone(),
            avatar_url: participant
                .avatar_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        }
    }
}

/// Where the comments of a draw came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSource {
    pub post_url: String,
    pub platform: Platform,
}

impl From<&PostUrl> for PostSource {
    fn from(post: &PostUrl) -> Self {
        Self {
            post_url: post.url.clone(),
            platform: post.platform,
        }
    }
}

/// Outcome of one draw before the result store assigns it an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryDraw {
    pub timestamp: DateTime<Utc>,
    pub mode: LotteryMode,
    pub winner_count: usize,
    pub keyword: Option<String>,
    pub mention_count: usize,
    pub total_participants: usize,
    pub eligible_count: usize,
    pub winners: Vec<Winner>,
    pub source: Option<PostSource>,
}

impl LotteryDraw {
    pub fn with_source(mut self, source: PostSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }
}

/// Opaque identifier of a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(Uuid);

impl ResultId {
    pub(crate) fn generate() -> Self {
        ResultId(Uuid::new_v4())
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResultId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(ResultId)
    }
}

/// A stored, immutable lottery result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryResult {
    pub result_id: ResultId,
    #[serde(flatten)]
    pub draw: LotteryDraw,
}

impl fmt::Display for LotteryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}
