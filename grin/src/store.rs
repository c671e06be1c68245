//! EmojiStore - Main API for Swift interop, designed for UniFFI export.
//!
//! One store owns the whole pipeline: corpus load + filter + grouping at
//! construction, the tantivy index behind a single-init guard, the usage
//! tracker, and the glyph cache. After construction the corpus and index
//! never change, so every query method reads without synchronization; the
//! only lock in the hot path is the usage tracker's on selection events.

use crate::corpus::Corpus;
use crate::glyph::{DefaultGlyphSource, GlyphCache};
use crate::indexer::Indexer;
use crate::interface::{EmojiGroup, EmojiPickerApi, EmojiRecord, GlyphSource, GrinError, UsageStore};
use crate::search;
use crate::usage::{JsonFileUsageStore, UsageTracker, MAX_FREQUENT};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Once};

static RAYON_INIT: Once = Once::new();

/// Initialize the global Rayon pool used for the parallel index feed.
fn init_rayon() {
    RAYON_INIT.call_once(|| {
        let _ = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("grin-rayon-{}", i))
            .build_global();
    });
}

/// Thread-safe emoji picker core.
///
/// Concurrency model:
/// - Corpus and groupings are immutable after the constructor returns
/// - The index builds once, under the OnceCell guard, on whichever call
///   gets there first; a failed build is retried lazily and search runs
///   on the fallback scan until it succeeds
/// - Usage increments take a short mutex that also covers the persist
#[derive(uniffi::Object)]
pub struct EmojiStore {
    corpus: Corpus,
    index: OnceCell<Indexer>,
    usage: UsageTracker,
    glyphs: GlyphCache,
}

// Internal implementation (not exported via FFI)
impl EmojiStore {
    fn build(
        corpus: Corpus,
        usage_store: Arc<dyn UsageStore>,
        glyph_source: Arc<dyn GlyphSource>,
    ) -> EmojiStore {
        init_rayon();
        let store = EmojiStore {
            corpus,
            index: OnceCell::new(),
            usage: UsageTracker::new(usage_store),
            glyphs: GlyphCache::new(glyph_source),
        };
        // warm the index so the first keystroke pays nothing; a failure
        // here is retried on first search
        let _ = store.indexer();
        store
    }

    /// Create a store over a caller-supplied corpus (for testing).
    #[cfg(test)]
    pub(crate) fn with_corpus_json(
        raw: &str,
        usage_store: Arc<dyn UsageStore>,
    ) -> Result<EmojiStore, GrinError> {
        let corpus = Corpus::from_json(raw).map_err(GrinError::from)?;
        Ok(Self::build(corpus, usage_store, Arc::new(DefaultGlyphSource)))
    }

    /// The index, built on first demand under the cell's lock. Concurrent
    /// first callers block on the same build instead of duplicating it.
    fn indexer(&self) -> Option<&Indexer> {
        match self.index.get_or_try_init(|| Indexer::build(&self.corpus)) {
            Ok(indexer) => Some(indexer),
            Err(e) => {
                log::error!("index unavailable, searches fall back to the scan: {e}");
                None
            }
        }
    }
}

// FFI-exported constructors (must be in standalone impl block)
#[uniffi::export]
impl EmojiStore {
    /// Create a store persisting usage counts as a JSON file at the given
    /// path, with the built-in glyph heuristic. Fails only when the
    /// bundled corpus itself is unusable.
    #[uniffi::constructor]
    pub fn new(usage_path: String) -> Result<Self, GrinError> {
        let corpus = Corpus::from_bundled().map_err(GrinError::from)?;
        Ok(Self::build(
            corpus,
            Arc::new(JsonFileUsageStore::new(usage_path)),
            Arc::new(DefaultGlyphSource),
        ))
    }

    /// Create a store with host-provided persistence and glyph checking.
    /// The macOS shell passes a UserDefaults-backed store and a font-table
    /// glyph source through here.
    #[uniffi::constructor]
    pub fn with_providers(
        usage_store: Arc<dyn UsageStore>,
        glyph_source: Arc<dyn GlyphSource>,
    ) -> Result<Self, GrinError> {
        let corpus = Corpus::from_bundled().map_err(GrinError::from)?;
        Ok(Self::build(corpus, usage_store, glyph_source))
    }
}

#[uniffi::export]
impl EmojiPickerApi for EmojiStore {
    // ─────────────────────────────────────────────────────────────────────────────
    // Browse Operations
    // ─────────────────────────────────────────────────────────────────────────────

    fn get_all(&self) -> Vec<EmojiRecord> {
        self.corpus.records().iter().map(|e| e.to_record()).collect()
    }

    fn get_by_group(&self, group: EmojiGroup) -> Vec<EmojiRecord> {
        self.corpus
            .by_group(group)
            .into_iter()
            .map(|e| e.to_record())
            .collect()
    }

    fn available_groups(&self) -> Vec<EmojiGroup> {
        self.corpus.available_groups()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────────

    /// Staged search per keystroke. Whatever goes wrong inside a stage,
    /// the caller gets an ordered, deduplicated, capped list.
    fn search(&self, query: String) -> Vec<EmojiRecord> {
        search::run_search(&self.corpus, self.indexer(), &query)
            .into_iter()
            .map(|idx| self.corpus.get(idx).to_record())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Usage Tracking
    // ─────────────────────────────────────────────────────────────────────────────

    fn record_usage(&self, id: String) {
        self.usage.record(&id);
    }

    /// Top usage counts resolved against the corpus. Ids that fell out of
    /// the corpus (older dataset revisions) are dropped silently, so the
    /// row may hold fewer than the cap.
    fn frequently_used(&self) -> Vec<EmojiRecord> {
        self.usage
            .top_ids(MAX_FREQUENT, |id| self.corpus.position(id))
            .into_iter()
            .filter_map(|id| self.corpus.by_id(&id))
            .map(|e| e.to_record())
            .collect()
    }

    fn clear_usage(&self) {
        self.usage.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Host Capabilities
    // ─────────────────────────────────────────────────────────────────────────────

    fn is_glyph_supported(&self, text: String) -> bool {
        self.glyphs.is_supported(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::MemoryUsageStore;

    const FIXTURE: &str = r#"[
        {"hexcode":"1F600","label":"grinning face","unicode":"😀","tags":["grin","happy"],"emoticon":":D"},
        {"hexcode":"1F920","label":"cowboy hat face","unicode":"🤠","group":1,"tags":["cowboy","face","hat"]},
        {"hexcode":"1F3FB","label":"light skin tone","unicode":"🏻","group":2},
        {"hexcode":"1F404","label":"cow","unicode":"🐄","group":3},
        {"hexcode":"1F436","label":"dog face","unicode":"🐶","group":3,"tags":["dog","pet"]},
        {"hexcode":"1F1E9-1F1EA","label":"flag: germany","unicode":"🇩🇪","group":9,"tags":["flag","germany"]}
    ]"#;

    fn store() -> EmojiStore {
        EmojiStore::with_corpus_json(FIXTURE, Arc::new(MemoryUsageStore::new())).unwrap()
    }

    fn ids(records: Vec<EmojiRecord>) -> Vec<String> {
        records.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn get_all_is_the_filtered_corpus_in_order() {
        let store = store();
        assert_eq!(
            ids(store.get_all()),
            ["1F600", "1F920", "1F404", "1F436", "1F1E9-1F1EA"]
        );
    }

    #[test]
    fn get_by_group_partitions_in_order() {
        let store = store();
        assert_eq!(
            ids(store.get_by_group(EmojiGroup::AnimalsAndNature)),
            ["1F404", "1F436"]
        );
        assert!(store.get_by_group(EmojiGroup::FoodAndDrink).is_empty());
        assert!(store.get_by_group(EmojiGroup::Component).is_empty());
    }

    #[test]
    fn available_groups_follow_the_fixture() {
        let store = store();
        assert_eq!(
            store.available_groups(),
            [
                EmojiGroup::SmileysAndEmotion,
                EmojiGroup::PeopleAndBody,
                EmojiGroup::AnimalsAndNature,
                EmojiGroup::Flags
            ]
        );
    }

    #[test]
    fn search_surfaces_the_cowboy_regression() {
        let store = store();
        for query in ["cow", "cowboy", "hat", "face"] {
            let found = ids(store.search(query.to_string()));
            assert!(found.contains(&"1F920".to_string()), "{query:?} missed: {found:?}");
        }
    }

    #[test]
    fn search_handles_empty_and_nonsense() {
        let store = store();
        assert!(store.search(String::new()).is_empty());
        assert!(store.search("   ".to_string()).is_empty());
        assert!(store.search("xyzabc123".to_string()).is_empty());
    }

    #[test]
    fn frequently_used_ranks_by_count() {
        let store = store();
        assert!(store.frequently_used().is_empty());

        store.record_usage("1F436".to_string());
        store.record_usage("1F920".to_string());
        store.record_usage("1F920".to_string());

        assert_eq!(ids(store.frequently_used()), ["1F920", "1F436"]);
    }

    #[test]
    fn recording_usage_never_lowers_a_rank() {
        let store = store();
        store.record_usage("1F920".to_string());
        store.record_usage("1F600".to_string());
        store.record_usage("1F600".to_string());

        let before = ids(store.frequently_used());
        let rank_before = before.iter().position(|id| id == "1F920").unwrap();

        store.record_usage("1F920".to_string());
        let after = ids(store.frequently_used());
        let rank_after = after.iter().position(|id| id == "1F920").unwrap();

        assert!(rank_after <= rank_before);
    }

    #[test]
    fn frequently_used_drops_unknown_ids() {
        let store = store();
        store.record_usage("DEAD".to_string());
        store.record_usage("1F436".to_string());
        assert_eq!(ids(store.frequently_used()), ["1F436"]);
    }

    #[test]
    fn clear_usage_empties_the_row() {
        let store = store();
        store.record_usage("1F920".to_string());
        assert_eq!(store.frequently_used().len(), 1);
        store.clear_usage();
        assert!(store.frequently_used().is_empty());
    }

    #[test]
    fn usage_counts_round_trip_through_the_store() {
        let backing = Arc::new(MemoryUsageStore::new());
        {
            let store =
                EmojiStore::with_corpus_json(FIXTURE, backing.clone() as Arc<dyn UsageStore>)
                    .unwrap();
            store.record_usage("1F920".to_string());
            store.record_usage("1F920".to_string());
            store.record_usage("1F436".to_string());
        }
        let reopened =
            EmojiStore::with_corpus_json(FIXTURE, backing as Arc<dyn UsageStore>).unwrap();
        assert_eq!(ids(reopened.frequently_used()), ["1F920", "1F436"]);
    }

    #[test]
    fn skin_variants_ride_along_on_records() {
        let raw = r#"[
            {"hexcode":"1F44B","label":"waving hand","unicode":"👋","group":1,"skins":[
                {"hexcode":"1F44B-1F3FB","label":"waving hand: light skin tone","unicode":"👋🏻","group":1},
                {"hexcode":"1F44B-1F3FF","label":"waving hand: dark skin tone","unicode":"👋🏿","group":1}
            ]}
        ]"#;
        let store =
            EmojiStore::with_corpus_json(raw, Arc::new(MemoryUsageStore::new())).unwrap();

        let all = store.get_all();
        assert_eq!(all.len(), 1, "variants are not top-level entries");
        assert_eq!(all[0].skin_variants.len(), 2);
        assert_eq!(all[0].skin_variants[0].id, "1F44B-1F3FB");
    }

    #[test]
    fn glyph_checks_go_through_the_cache() {
        let store = store();
        assert!(store.is_glyph_supported("\u{1F920}".to_string()));
        assert!(!store.is_glyph_supported(String::new()));
        // second hit answers from the cache
        assert!(store.is_glyph_supported("\u{1F920}".to_string()));
    }

    #[test]
    fn concurrent_first_searches_share_one_index_build() {
        let store = Arc::new(store());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                ids(store.search("cow".to_string()))
            }));
        }
        let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for result in &results {
            assert_eq!(result, &results[0]);
            assert!(result.contains(&"1F920".to_string()));
        }
    }
}
