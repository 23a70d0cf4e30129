use chrono::Utc;
use comment_lottery::application::models::lottery::{LotteryDraw, LotteryMode, ResultId};
use comment_lottery::storage::result_store::ResultStore;
use std::sync::Arc;

fn draw(total: usize) -> LotteryDraw {
    LotteryDraw {
        timestamp: Utc::now(),
        mode: LotteryMode::Open,
        winner_count: 1,
        keyword: None,
        mention_count: 0,
        total_participants: total,
        eligible_count: total,
        winners: vec![],
        source: None,
    }
}

#[test]
fn test_put_then_get_round_trips() {
    let store = ResultStore::new();
    let original = draw(7);
    let id = store.put(original.clone());

    let stored = store.get(&id).unwrap();
    assert_eq!(stored.result_id, id);
    assert_eq!(stored.draw, original);
    assert_eq!(store.get_str(&id.to_string()).unwrap(), stored);
}

#[test]
fn test_ids_are_unique_and_unknown_ids_absent() {
    let store = ResultStore::new();
    let a = store.put(draw(1));
    let b = store.put(draw(1));
    assert_ne!(a, b);
    assert_eq!(store.len(), 2);

    assert!(store.get_str("not-a-uuid").is_none());
    assert!(store.get_str("00000000-0000-4000-8000-000000000000").is_none());
}

#[test]
fn test_evicted_result_reads_as_absent() {
    let store = ResultStore::new();
    let id = store.put(draw(3));
    assert!(store.remove(&id).is_some());
    assert!(store.get(&id).is_none());
    assert!(store.is_empty());
}

#[test]
fn test_listing_is_newest_first() {
    let store = ResultStore::new();
    let mut older = draw(1);
    older.timestamp = Utc::now() - chrono::Duration::minutes(5);
    let old_id = store.put(older);
    let new_id = store.put(draw(2));
    assert_eq!(store.list(), vec![new_id, old_id]);

    store.clear();
    assert!(store.list().is_empty());
}

#[test]
fn test_concurrent_puts() {
    let store = Arc::new(ResultStore::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || store.put(draw(i)))
        })
        .collect();
    let ids: Vec<ResultId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(store.len(), 8);
    for id in ids {
        assert!(store.get(&id).is_some());
    }
}
