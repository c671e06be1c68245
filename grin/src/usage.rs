//! Usage counts behind the frequently-used row.
//!
//! The persisted state is one JSON-encoded id→count map handed to a
//! [`UsageStore`] after every increment. Anything wrong with the stored
//! payload is treated as an empty map; user state is never worth failing
//! over. Recency lives only in memory and serves as the tie-break between
//! equal counts within one process lifetime.

use crate::interface::UsageStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Most entries `frequently_used` ever returns.
pub const MAX_FREQUENT: usize = 16;

struct UsageState {
    counts: HashMap<String, u64>,
    last_used: HashMap<String, DateTime<Utc>>,
}

pub(crate) struct UsageTracker {
    store: Arc<dyn UsageStore>,
    state: Mutex<UsageState>,
}

impl UsageTracker {
    /// Loads the persisted map through the store. A missing or malformed
    /// payload starts the tracker empty.
    pub(crate) fn new(store: Arc<dyn UsageStore>) -> UsageTracker {
        let counts = match store.read() {
            Some(payload) => match serde_json::from_str::<HashMap<String, u64>>(&payload) {
                Ok(counts) => counts,
                Err(e) => {
                    log::warn!("usage payload unreadable, starting empty: {e}");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        UsageTracker {
            store,
            state: Mutex::new(UsageState {
                counts,
                last_used: HashMap::new(),
            }),
        }
    }

    /// Counts one selection and persists before releasing the lock, so
    /// rapid re-entrant selections cannot interleave increment and write.
    pub(crate) fn record(&self, id: &str) {
        let mut state = self.state.lock();
        *state.counts.entry(id.to_string()).or_insert(0) += 1;
        state.last_used.insert(id.to_string(), Utc::now());
        self.persist(&state);
    }

    /// Drops all counts, in memory and in the backing store.
    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        state.counts.clear();
        state.last_used.clear();
        self.store.clear();
    }

    /// The top `k` ids by descending count. Equal counts break on
    /// most-recent use, then on the caller-supplied corpus position, so
    /// consecutive reads of unchanged state always agree.
    pub(crate) fn top_ids<F>(&self, k: usize, position: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let state = self.state.lock();
        let mut entries: Vec<(&String, u64, Option<&DateTime<Utc>>)> = state
            .counts
            .iter()
            .map(|(id, &count)| (id, count, state.last_used.get(id)))
            .collect();
        entries.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| {
                    position(a.0.as_str())
                        .unwrap_or(usize::MAX)
                        .cmp(&position(b.0.as_str()).unwrap_or(usize::MAX))
                })
        });
        entries.truncate(k);
        entries.into_iter().map(|(id, _, _)| id.clone()).collect()
    }

    #[cfg(test)]
    fn count(&self, id: &str) -> u64 {
        self.state.lock().counts.get(id).copied().unwrap_or(0)
    }

    fn persist(&self, state: &UsageState) {
        match serde_json::to_string(&state.counts) {
            Ok(payload) => self.store.write(payload),
            Err(e) => log::warn!("usage payload not serializable, keeping in memory: {e}"),
        }
    }
}

/// File-backed [`UsageStore`] for hosts without a preference system. The
/// macOS shell implements the trait over UserDefaults instead.
pub struct JsonFileUsageStore {
    path: PathBuf,
}

impl JsonFileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileUsageStore {
        JsonFileUsageStore { path: path.into() }
    }
}

impl UsageStore for JsonFileUsageStore {
    fn read(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write(&self, payload: String) {
        if let Err(e) = std::fs::write(&self.path, payload) {
            log::warn!("usage store write to {} failed: {e}", self.path.display());
        }
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("usage store clear of {} failed: {e}", self.path.display());
            }
        }
    }
}

/// In-memory [`UsageStore`] for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryUsageStore {
    payload: Mutex<Option<String>>,
}

impl MemoryUsageStore {
    pub fn new() -> MemoryUsageStore {
        MemoryUsageStore::default()
    }
}

impl UsageStore for MemoryUsageStore {
    fn read(&self) -> Option<String> {
        self.payload.lock().clone()
    }

    fn write(&self, payload: String) {
        *self.payload.lock() = Some(payload);
    }

    fn clear(&self) {
        *self.payload.lock() = None;
    }
}
