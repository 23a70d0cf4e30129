use crate::application::models::comment::Participant;
use crate::application::models::lottery::{LotteryDraw, LotteryMode, SelectionParams, Winner};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Applies a selection rule to normalized participants and draws winners.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionEngine;

impl SelectionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Participants passing the mode's filter, one entry per username.
    ///
    /// Duplicates are collapsed case-insensitively after filtering, keeping
    /// the first occurrence in retrieval order.
    pub fn eligible<'a>(
        &self,
        participants: &'a [Participant],
        mode: LotteryMode,
        params: &SelectionParams,
    ) -> Vec<&'a Participant> {
        let keyword = params.keyword.as_deref().unwrap_or_default();
        let mut seen = HashSet::new();
        participants
            .iter()
            .filter(|p| match mode {
                LotteryMode::Keyword => p.contains_keyword(keyword),
                LotteryMode::Open => true,
                LotteryMode::Mention => p.mention_count() >= params.mention_count,
            })
            .filter(|p| seen.insert(p.identity()))
            .collect()
    }

    /// Draws `min(winner_count, eligible)` distinct winners uniformly without replacement.
    ///
    /// Ranks follow draw order. An empty eligible set yields an empty winner
    /// list, not an error.
    pub fn select(
        &self,
        participants: &[Participant],
        mode: LotteryMode,
        params: &SelectionParams,
    ) -> LotteryDraw {
        let eligible = self.eligible(participants, mode, params);
        let amount = params.winner_count.min(eligible.len());

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let winners: Vec<Winner> = index::sample(&mut rng, eligible.len(), amount)
            .into_iter()
            .enumerate()
            .map(|(i, idx)| Winner::new(i + 1, eligible[idx]))
            .collect();

        debug!(
            total = participants.len(),
            eligible = eligible.len(),
            "Eligibility computed"
        );
        info!(
            "Drew {} of {} requested winners in mode {}",
            winners.len(),
            params.winner_count,
            mode
        );

        LotteryDraw {
            timestamp: Utc::now(),
            mode,
            winner_count: params.winner_count,
            keyword: params.keyword.clone(),
            mention_count: params.mention_count,
            total_participants: participants.len(),
            eligible_count: eligible.len(),
            winners,
            source: None,
        }
    }
}
