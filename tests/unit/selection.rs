use comment_lottery::application::models::comment::Participant;
use comment_lottery::application::models::lottery::{LotteryMode, SelectionParams};
use comment_lottery::application::services::selection_engine::SelectionEngine;
use std::collections::HashSet;

fn participant(username: &str, text: &str, mentions: usize) -> Participant {
    Participant {
        username: username.into(),
        comment_text: text.into(),
        avatar_url: None,
        mentioned_accounts: (0..mentions).map(|i| format!("friend{i}")).collect(),
    }
}

fn crowd() -> Vec<Participant> {
    let mut people = Vec::new();
    for i in 0..40 {
        let text = if i % 3 == 0 { "我要 贊 一個" } else { "hello" };
        people.push(participant(&format!("user{}", i % 25), text, i % 4));
    }
    people
}

#[test]
fn test_invariants_hold_in_every_mode() {
    let engine = SelectionEngine::new();
    let people = crowd();
    let modes = [
        (LotteryMode::Keyword, Some("贊".to_string()), 0),
        (LotteryMode::Open, None, 0),
        (LotteryMode::Mention, None, 2),
    ];
    for (mode, keyword, mention_count) in modes {
        for winner_count in [1, 3, 10, 100] {
            let params = SelectionParams {
                winner_count,
                keyword: keyword.clone(),
                mention_count,
                seed: None,
            };
            let eligible: HashSet<String> = engine
                .eligible(&people, mode, &params)
                .iter()
                .map(|p| p.username.clone())
                .collect();
            let draw = engine.select(&people, mode, &params);

            assert_eq!(draw.total_participants, people.len());
            assert_eq!(draw.eligible_count, eligible.len());
            assert_eq!(draw.winners.len(), winner_count.min(eligible.len()));
            let winners: HashSet<String> =
                draw.winners.iter().map(|w| w.username.clone()).collect();
            assert_eq!(winners.len(), draw.winners.len(), "duplicate winner in {mode:?}");
            assert!(winners.is_subset(&eligible));
            for (i, winner) in draw.winners.iter().enumerate() {
                assert_eq!(winner.rank, i + 1);
            }
        }
    }
}

#[test]
fn test_missing_avatar_gets_default() {
    let draw = SelectionEngine::new().select(
        &[participant("solo", "hi", 0)],
        LotteryMode::Open,
        &SelectionParams {
            winner_count: 1,
            ..Default::default()
        },
    );
    assert_eq!(
        draw.winners[0].avatar_url,
        comment_lottery::constants::DEFAULT_AVATAR_URL
    );
}

#[test]
fn test_empty_thread_draws_nobody() {
    let draw = SelectionEngine::new().select(
        &[],
        LotteryMode::Open,
        &SelectionParams {
            winner_count: 3,
            ..Default::default()
        },
    );
    assert!(draw.winners.is_empty());
    assert_eq!(draw.total_participants, 0);
}
