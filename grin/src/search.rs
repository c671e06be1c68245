//! Staged query pipeline over the emoji index.
//!
//! A query runs through an ordered list of independent strategies: the
//! native word match, two wildcard widenings, a per-word widening for thin
//! result sets, and a guaranteed linear substring scan. Strategies only
//! append; an id keeps the score and position given by the first strategy
//! that found it.
//!
//! Nothing in here returns an error. A stage that fails or runs out of
//! budget contributes nothing and the pipeline moves on.

use crate::corpus::Corpus;
use crate::indexer::Indexer;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Most hits any single index stage may contribute.
pub const INTERNAL_STAGE_CAP: usize = 50;

/// Most results a search ever returns.
pub const PUBLIC_RESULT_CAP: usize = 100;

/// Widening stages only run for queries at least this many characters long.
pub const WIDEN_MIN_QUERY_LEN: usize = 2;

/// Time budget handed to each stage.
pub const STAGE_TIMEOUT: Duration = Duration::from_millis(100);

/// How many rows the fallback scan walks between deadline checks.
const SCAN_CHECK_INTERVAL: usize = 256;

/// Per-stage deadline. Index stages check it once before running; the
/// linear scan polls it mid-flight and stops with partial results.
struct StageClock {
    deadline: Instant,
}

impl StageClock {
    fn start(budget: Duration) -> StageClock {
        StageClock {
            deadline: Instant::now() + budget,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// The ordered index-backed strategies. Each is a rewrite of the trimmed
/// query fed to the same wildcard-aware matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// The query as typed: exact words plus graduated fuzzy matching.
    Native,
    /// `q*`, catching completions of the last word.
    Prefix,
    /// `*q*`, reaching inside longer words.
    Substring,
    /// `*w1* *w2* ...`, loosest match, only for thin result sets.
    PerWord,
}

const INDEX_STAGES: [Stage; 4] = [Stage::Native, Stage::Prefix, Stage::Substring, Stage::PerWord];

impl Stage {
    /// The pattern this stage feeds to the index, or `None` when the stage
    /// is gated off for this query.
    fn rewrite(self, trimmed: &str, found_so_far: usize) -> Option<String> {
        let widen = trimmed.chars().count() >= WIDEN_MIN_QUERY_LEN;
        match self {
            Stage::Native => Some(trimmed.to_string()),
            Stage::Prefix if widen => Some(format!("{trimmed}*")),
            Stage::Substring if widen => Some(format!("*{trimmed}*")),
            Stage::PerWord if found_so_far < PUBLIC_RESULT_CAP / 2 => Some(
                trimmed
                    .split_whitespace()
                    .map(|word| format!("*{word}*"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }
}

/// Runs the full pipeline and returns corpus positions, ready for the
/// caller to resolve into records. Passing no indexer degrades to the
/// fallback scan alone.
pub(crate) fn run_search(corpus: &Corpus, indexer: Option<&Indexer>, raw_query: &str) -> Vec<usize> {
    run_search_with_budget(corpus, indexer, raw_query, STAGE_TIMEOUT)
}

pub(crate) fn run_search_with_budget(
    corpus: &Corpus,
    indexer: Option<&Indexer>,
    raw_query: &str,
    stage_budget: Duration,
) -> Vec<usize> {
    let trimmed = raw_query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    #[cfg(feature = "perf-log")]
    let started = Instant::now();

    let mut seen: HashSet<usize> = HashSet::new();
    let mut scored: Vec<(usize, f32)> = Vec::new();

    if let Some(indexer) = indexer {
        for stage in INDEX_STAGES {
            let Some(pattern) = stage.rewrite(trimmed, seen.len()) else {
                continue;
            };
            let clock = StageClock::start(stage_budget);
            if clock.expired() {
                // a stage with no budget contributes nothing, never an error
                log::warn!("search stage {stage:?} skipped, no budget left");
                continue;
            }
            match indexer.run(&pattern, INTERNAL_STAGE_CAP) {
                Ok(hits) => {
                    for hit in hits {
                        let Some(idx) = corpus.position(&hit.id) else {
                            continue;
                        };
                        if seen.insert(idx) {
                            scored.push((idx, hit.score));
                        }
                    }
                }
                Err(e) => log::warn!("search stage {stage:?} failed, continuing: {e}"),
            }
        }
    }

    // Guaranteed recall pass: whatever the index stages found, a literal
    // case-insensitive substring of a label or tag must surface.
    let needle = trimmed.to_lowercase();
    let clock = StageClock::start(stage_budget);
    let mut fallback: Vec<usize> = Vec::new();
    for (idx, row) in corpus.fallback_rows().iter().enumerate() {
        if idx > 0 && idx % SCAN_CHECK_INTERVAL == 0 && clock.expired() {
            log::warn!("fallback scan stopped early at row {idx} of {}", corpus.len());
            break;
        }
        if seen.contains(&idx) {
            continue;
        }
        if row.label.contains(&needle) || row.tags.iter().any(|tag| tag.contains(&needle)) {
            seen.insert(idx);
            fallback.push(idx);
        }
    }

    // Stable sort keeps stage order between equal scores. Fallback rows
    // follow in corpus order, then the public cap cuts the tail.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    #[cfg(feature = "perf-log")]
    eprintln!(
        "[perf] search \"{}\": {} scored, {} fallback, {:?}",
        trimmed,
        scored.len(),
        fallback.len(),
        started.elapsed()
    );

    let mut results: Vec<usize> = Vec::with_capacity(scored.len() + fallback.len());
    results.extend(scored.into_iter().map(|(idx, _)| idx));
    results.extend(fallback);
    results.truncate(PUBLIC_RESULT_CAP);
    results
}
