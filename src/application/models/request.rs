use crate::application::models::lottery::{LotteryMode, LotteryResult, SelectionParams};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Lottery job as submitted by the web layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LotteryRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default = "default_winner_count")]
    pub winner_count: i64,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub mention_count: Option<i64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_winner_count() -> i64 {
    1
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryParams {
    pub url: String,
    pub mode: LotteryMode,
    pub selection: SelectionParams,
}

impl LotteryRequest {
    pub fn validate(&self) -> Result<LotteryParams, AppError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidRequest("URL is required".to_string()));
        }
        let mode: LotteryMode = self.mode.parse().map_err(AppError::InvalidRequest)?;
        if self.winner_count < 1 {
            return Err(AppError::InvalidRequest(
                "Winner count must be at least 1".to_string(),
            ));
        }

        let keyword = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);
        if mode == LotteryMode::Keyword && keyword.is_none() {
            return Err(AppError::InvalidRequest(
                "Keyword is required for mode 1".to_string(),
            ));
        }

        let mention_count = match (mode, self.mention_count) {
            (LotteryMode::Mention, Some(n)) if n >= 1 => n as usize,
            (LotteryMode::Mention, _) => {
                return Err(AppError::InvalidRequest(
                    "Mention count must be at least 1 for mode 3".to_string(),
                ))
            }
            _ => 0,
        };

        Ok(LotteryParams {
            url: url.to_string(),
            mode,
            selection: SelectionParams {
                winner_count: self.winner_count as usize,
                keyword: if mode == LotteryMode::Keyword { keyword } else { None },
                mention_count,
                seed: self.seed,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerView {
    pub username: String,
    pub comment: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
    pub result_id: String,
    pub timestamp: String,
    pub mode: String,
    pub total_participants: usize,
    pub winners: Vec<WinnerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

/// JSON reply handed back to the web layer.
///
/// Serializes to the wire body alone; the HTTP status travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LotteryResponse {
    Success(SuccessBody),
    Failure {
        #[serde(skip)]
        status: u16,
        #[serde(flatten)]
        body: FailureBody,
    },
}

impl LotteryResponse {
    pub fn success(result: &LotteryResult) -> Self {
        LotteryResponse::Success(SuccessBody {
            success: true,
            result_id: result.result_id.to_string(),
            timestamp: result.draw.timestamp.to_rfc3339(),
            mode: result.draw.mode.code().to_string(),
            total_participants: result.draw.total_participants,
            winners: result
                .draw
                .winners
                .iter()
                .map(|w| WinnerView {
                    username: w.username.clone(),
                    comment: w.comment_text.clone(),
                    avatar_url: w.avatar_url.clone(),
                })
                .collect(),
        })
    }

    pub fn failure(error: &AppError) -> Self {
        LotteryResponse::Failure {
            status: error.status_code(),
            body: FailureBody {
                success: false,
                error: error.to_string(),
            },
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            LotteryResponse::Success(_) => 200,
            LotteryResponse::Failure { status, .. } => *status,
        }
    }

    /// Body as sent on the wire.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

/// A few eligible participants shown before the actual draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub username: String,
    pub content: String,
    pub mention_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub total_comments: usize,
    pub total_participants: usize,
    pub eligible_count: usize,
    pub eligible_participants: Vec<PreviewEntry>,
}
