use crate::application::models::lottery::{LotteryDraw, LotteryResult, ResultId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-process registry of completed draws, keyed by store-issued ids.
///
/// An id that was never issued, or whose result has been evicted, reads as
/// absent.
#[derive(Default)]
pub struct ResultStore {
    results: RwLock<HashMap<ResultId, Arc<LotteryResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, draw: LotteryDraw) -> ResultId {
        let result_id = ResultId::generate();
        let result = Arc::new(LotteryResult { result_id, draw });
        self.results
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(result_id, result);
        debug!("Stored lottery result {}", result_id);
        result_id
    }

    pub fn get(&self, result_id: &ResultId) -> Option<Arc<LotteryResult>> {
        let guard = self.results.read().unwrap_or_else(|p| p.into_inner());
        guard.get(result_id).cloned()
    }

    /// Looks up an id as received from the outside; unparsable ids are absent.
    pub fn get_str(&self, result_id: &str) -> Option<Arc<LotteryResult>> {
        result_id.parse::<ResultId>().ok().and_then(|id| self.get(&id))
    }

    /// Evicts a result; later lookups report it as absent.
    pub fn remove(&self, result_id: &ResultId) -> Option<Arc<LotteryResult>> {
        let mut guard = self.results.write().unwrap_or_else(|p| p.into_inner());
        guard.remove(result_id)
    }

    /// Stored ids, newest draw first.
    pub fn list(&self) -> Vec<ResultId> {
        let guard = self.results.read().unwrap_or_else(|p| p.into_inner());
        let mut entries: Vec<_> = guard.values().collect();
        entries.sort_by(|a, b| b.draw.timestamp.cmp(&a.draw.timestamp));
        entries.into_iter().map(|r| r.result_id).collect()
    }

    pub fn len(&self) -> usize {
        self.results.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.results.write().unwrap_or_else(|p| p.into_inner()).clear();
        debug!("Results cache cleared");
    }
}
