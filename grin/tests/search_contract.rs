//! Search contract tests over the bundled corpus, run through the public
//! EmojiStore surface exactly as the picker UI consumes it.
//!
//! Covered here:
//! - substring recall: any query that is a case-insensitive substring of a
//!   label or tag surfaces that record (the "cow" -> "cowboy hat face"
//!   regression and friends)
//! - empty, whitespace, and nonsense queries
//! - deduplication, determinism, case folding, and the public cap

use grin::{EmojiPickerApi, EmojiStore};
use std::collections::HashSet;
use tempfile::TempDir;

fn bundled_store() -> (EmojiStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let usage_path = temp_dir.path().join("usage.json").to_string_lossy().to_string();
    let store = EmojiStore::new(usage_path).unwrap();
    (store, temp_dir)
}

fn search_ids(store: &EmojiStore, query: &str) -> Vec<String> {
    store
        .search(query.to_string())
        .into_iter()
        .map(|r| r.id)
        .collect()
}

#[test]
fn cowboy_regression_every_label_and_tag_substring_hits() {
    let (store, _temp) = bundled_store();

    let cowboy = store
        .get_all()
        .into_iter()
        .find(|r| r.id == "1F920")
        .expect("bundled corpus carries cowboy hat face");
    assert_eq!(cowboy.label, "cowboy hat face");

    for query in ["cow", "cowboy", "hat", "face"] {
        let ids = search_ids(&store, query);
        assert!(
            ids.contains(&"1F920".to_string()),
            "search({query:?}) missed 1F920, got {} results",
            ids.len()
        );
    }
}

#[test]
fn label_substrings_always_surface_their_record() {
    let (store, _temp) = bundled_store();

    // a spread of bundled records and mid-label fragments
    for (fragment, id) in [
        ("grinning", "1F600"),
        ("rinning", "1F600"),
        ("dog", "1F436"),
        ("wav", "1F44B"),
    ] {
        let ids = search_ids(&store, fragment);
        assert!(
            ids.contains(&id.to_string()),
            "search({fragment:?}) missed {id}"
        );
    }
}

#[test]
fn empty_and_whitespace_queries_yield_nothing() {
    let (store, _temp) = bundled_store();
    assert!(store.search(String::new()).is_empty());
    assert!(store.search("   ".to_string()).is_empty());
    assert!(store.search("\t\n  \r".to_string()).is_empty());
}

#[test]
fn results_never_repeat_an_id() {
    let (store, _temp) = bundled_store();
    for query in ["cow", "face", "heart", "flag", "a", "smile face happy"] {
        let ids = search_ids(&store, query);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len(), "duplicates for {query:?}");
    }
}

#[test]
fn case_folding_yields_identical_id_sets() {
    let (store, _temp) = bundled_store();
    for query in ["cowboy", "Face", "FLAG", "gErMaNy"] {
        let lower: HashSet<String> = search_ids(&store, &query.to_lowercase()).into_iter().collect();
        let upper: HashSet<String> = search_ids(&store, &query.to_uppercase()).into_iter().collect();
        assert_eq!(lower, upper, "case mismatch for {query:?}");
        assert!(!lower.is_empty(), "no results at all for {query:?}");
    }
}

#[test]
fn consecutive_searches_are_deterministic() {
    let (store, _temp) = bundled_store();
    for query in ["cow", "heart", "fla", "smile"] {
        assert_eq!(
            search_ids(&store, query),
            search_ids(&store, query),
            "order changed between calls for {query:?}"
        );
    }
}

#[test]
fn nonsense_queries_yield_nothing() {
    let (store, _temp) = bundled_store();
    assert!(store.search("xyzabc123".to_string()).is_empty());
    assert!(store.search("qqqqwwwweeee".to_string()).is_empty());
}

#[test]
fn hostile_queries_do_not_crash() {
    let (store, _temp) = bundled_store();
    let long = "face ".repeat(200);
    let _ = store.search(long);
    let _ = store.search("!@#$%^&*()[]{}".to_string());
    let _ = store.search("*".to_string());
    let _ = store.search("\u{0}\u{1}\u{2}".to_string());
    let _ = store.search("日本語のクエリ".to_string());
    // the store still answers normally afterwards
    assert!(search_ids(&store, "cowboy").contains(&"1F920".to_string()));
}

#[test]
fn results_respect_the_public_cap() {
    let (store, _temp) = bundled_store();
    // "face" appears in hundreds of bundled labels
    let ids = search_ids(&store, "face");
    assert!(ids.len() > 50, "expected a broad match, got {}", ids.len());
    assert!(ids.len() <= grin::search::PUBLIC_RESULT_CAP);
}

#[test]
fn hexcode_lookup_works_through_search() {
    let (store, _temp) = bundled_store();
    let ids = search_ids(&store, "1F920");
    assert!(ids.contains(&"1F920".to_string()));
}
