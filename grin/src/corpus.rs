//! Bundled emoji corpus: parse, filter, group.
//!
//! The dataset is a build-time asset compiled into the library. Loading it
//! is the only fatal path in the crate: a corpus that fails to parse means a
//! broken build, not a runtime condition to paper over.

use crate::interface::EmojiGroup;
use crate::models::Emoji;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

static BUNDLED_JSON: &str = include_str!("../data/emoji.json");

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("record {hexcode} has group {group}, outside the known categories")]
    UnknownGroup { hexcode: String, group: u32 },
}

/// The filtered, grouped, immutable corpus. Built once per store; every
/// accessor hands out views in bundled order.
pub struct Corpus {
    records: Vec<Emoji>,
    by_id: HashMap<String, usize>,
    groups: BTreeMap<u32, Vec<usize>>,
    rows: Vec<FallbackRow>,
}

/// Precomputed lowercase text backing the linear fallback scan.
pub(crate) struct FallbackRow {
    pub(crate) label: String,
    pub(crate) tags: Vec<String>,
}

impl Corpus {
    /// Parses and prepares the bundled dataset.
    pub fn from_bundled() -> Result<Corpus, CorpusError> {
        Self::from_json(BUNDLED_JSON)
    }

    /// Parses and prepares a dataset from raw JSON. Tests feed fixtures
    /// through here.
    pub fn from_json(raw: &str) -> Result<Corpus, CorpusError> {
        let parsed: Vec<Emoji> = serde_json::from_str(raw)?;
        let total = parsed.len();

        let mut records: Vec<Emoji> = Vec::with_capacity(total);
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(total);
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();

        for mut emoji in parsed {
            if !emoji.is_useful() {
                continue;
            }
            let group = emoji.group_raw();
            if EmojiGroup::from_raw(group).is_none() {
                return Err(CorpusError::UnknownGroup {
                    hexcode: emoji.hexcode,
                    group,
                });
            }
            normalize_tags(&mut emoji);
            // first record wins on duplicate ids
            if by_id.contains_key(&emoji.hexcode) {
                log::debug!("duplicate corpus id {}, keeping the first", emoji.hexcode);
                continue;
            }
            let idx = records.len();
            by_id.insert(emoji.hexcode.clone(), idx);
            groups.entry(group).or_default().push(idx);
            records.push(emoji);
        }

        let rows = records
            .iter()
            .map(|emoji| FallbackRow {
                label: emoji.label.to_lowercase(),
                tags: emoji.tags().iter().map(|t| t.to_lowercase()).collect(),
            })
            .collect();

        log::info!("corpus loaded: {} of {} records kept", records.len(), total);

        Ok(Corpus {
            records,
            by_id,
            groups,
            rows,
        })
    }

    /// All picker-visible records in bundled order.
    pub fn records(&self) -> &[Emoji] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Emoji {
        &self.records[idx]
    }

    pub fn by_id(&self, id: &str) -> Option<&Emoji> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    /// Bundled-order position of a record, the deterministic last-resort
    /// tie-break everywhere ordering matters.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Records of one category, in bundled order.
    pub fn by_group(&self, group: EmojiGroup) -> Vec<&Emoji> {
        self.groups
            .get(&group.raw())
            .map(|indices| indices.iter().map(|&idx| &self.records[idx]).collect())
            .unwrap_or_default()
    }

    /// Categories that hold at least one record, in raw-id order, with
    /// components excluded.
    pub fn available_groups(&self) -> Vec<EmojiGroup> {
        self.groups
            .iter()
            .filter(|(_, indices)| !indices.is_empty())
            .filter_map(|(&raw, _)| EmojiGroup::from_raw(raw))
            .filter(|&group| group != EmojiGroup::Component)
            .collect()
    }

    pub(crate) fn fallback_rows(&self) -> &[FallbackRow] {
        &self.rows
    }
}

/// Collapses runs of whitespace inside each tag and drops tags that end up
/// empty.
fn normalize_tags(emoji: &mut Emoji) {
    if let Some(tags) = emoji.tags.as_mut() {
        for tag in tags.iter_mut() {
            *tag = tag.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        tags.retain(|tag| !tag.is_empty());
    }
}
