//! Grin FFI Interface Definition
//!
//! This file defines the public interface exposed to Swift via UniFFI.
//! It acts as the source of truth for the shared types between Rust and Swift.

use thiserror::Error;

// ============================================================================
// ENUMS
// ============================================================================

/// Emoji category, mirroring the group ids carried by the bundled dataset.
///
/// The raw ids are stable dataset values; `Component` holds sub-glyph
/// building blocks (skin tones, hair) and never appears in picker sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum EmojiGroup {
    SmileysAndEmotion,
    PeopleAndBody,
    Component,
    AnimalsAndNature,
    FoodAndDrink,
    TravelAndPlaces,
    Activities,
    Objects,
    Symbols,
    Flags,
}

impl EmojiGroup {
    pub const ALL: [EmojiGroup; 10] = [
        EmojiGroup::SmileysAndEmotion,
        EmojiGroup::PeopleAndBody,
        EmojiGroup::Component,
        EmojiGroup::AnimalsAndNature,
        EmojiGroup::FoodAndDrink,
        EmojiGroup::TravelAndPlaces,
        EmojiGroup::Activities,
        EmojiGroup::Objects,
        EmojiGroup::Symbols,
        EmojiGroup::Flags,
    ];

    /// Maps a raw dataset group id to its category, `None` for ids outside
    /// the known range.
    pub fn from_raw(raw: u32) -> Option<EmojiGroup> {
        match raw {
            0 => Some(EmojiGroup::SmileysAndEmotion),
            1 => Some(EmojiGroup::PeopleAndBody),
            2 => Some(EmojiGroup::Component),
            3 => Some(EmojiGroup::AnimalsAndNature),
            4 => Some(EmojiGroup::FoodAndDrink),
            5 => Some(EmojiGroup::TravelAndPlaces),
            6 => Some(EmojiGroup::Activities),
            7 => Some(EmojiGroup::Objects),
            8 => Some(EmojiGroup::Symbols),
            9 => Some(EmojiGroup::Flags),
            _ => None,
        }
    }

    /// The raw dataset group id.
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Section title shown in the picker.
    pub fn display_name(self) -> &'static str {
        match self {
            EmojiGroup::SmileysAndEmotion => "Smileys & Emotion",
            EmojiGroup::PeopleAndBody => "People & Body",
            EmojiGroup::Component => "Components",
            EmojiGroup::AnimalsAndNature => "Animals & Nature",
            EmojiGroup::FoodAndDrink => "Food & Drink",
            EmojiGroup::TravelAndPlaces => "Travel & Places",
            EmojiGroup::Activities => "Activities",
            EmojiGroup::Objects => "Objects",
            EmojiGroup::Symbols => "Symbols",
            EmojiGroup::Flags => "Flags",
        }
    }

    /// The emoji rendered on the category tab.
    pub fn representative(self) -> &'static str {
        match self {
            EmojiGroup::SmileysAndEmotion => "\u{1F600}",
            EmojiGroup::PeopleAndBody => "\u{1F44B}",
            EmojiGroup::Component => "\u{1F9B0}",
            EmojiGroup::AnimalsAndNature => "\u{1F436}",
            EmojiGroup::FoodAndDrink => "\u{1F354}",
            EmojiGroup::TravelAndPlaces => "\u{1F697}",
            EmojiGroup::Activities => "\u{26BD}",
            EmojiGroup::Objects => "\u{1F4A1}",
            EmojiGroup::Symbols => "\u{2764}\u{FE0F}",
            EmojiGroup::Flags => "\u{1F3C1}",
        }
    }
}

/// Section title for a category, for hosts that build their own tab bar.
#[uniffi::export]
pub fn group_display_name(group: EmojiGroup) -> String {
    group.display_name().to_string()
}

/// Tab emoji for a category.
#[uniffi::export]
pub fn group_representative(group: EmojiGroup) -> String {
    group.representative().to_string()
}

// ============================================================================
// RECORDS
// ============================================================================

/// One emoji as handed to the picker UI.
///
/// `id` is the corpus hexcode (e.g. "1F920"), `display` the renderable
/// character sequence. Skin-tone renditions ride along so the long-press
/// variant bar needs no second lookup.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct EmojiRecord {
    pub id: String,
    pub label: String,
    pub display: String,
    pub group: EmojiGroup,
    pub order: Option<u64>,
    pub tags: Vec<String>,
    pub emoticons: Vec<String>,
    pub skin_variants: Vec<SkinVariant>,
}

/// A skin-tone rendition of a base emoji.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct SkinVariant {
    pub id: String,
    pub label: String,
    pub display: String,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error type for Grin store construction.
///
/// Only building a store can fail. Every per-query operation degrades
/// silently instead of surfacing errors to the picker.
#[derive(Debug, Error, uniffi::Error)]
pub enum GrinError {
    #[error("Corpus error: {0}")]
    CorpusError(String),
    #[error("Index error: {0}")]
    IndexError(String),
}

// ============================================================================
// SERVICE INTERFACE
// ============================================================================

/// The primary interface for the emoji picker core.
/// This matches the functionality exposed by the `EmojiStore` object.
#[uniffi::export(with_foreign)]
pub trait EmojiPickerApi: Send + Sync {
    /// Every picker-visible emoji, in bundled corpus order.
    fn get_all(&self) -> Vec<EmojiRecord>;

    /// Emojis of one category, in bundled corpus order.
    fn get_by_group(&self, group: EmojiGroup) -> Vec<EmojiRecord>;

    /// Categories that currently hold at least one emoji. Components are
    /// never listed.
    fn available_groups(&self) -> Vec<EmojiGroup>;

    /// Staged search over labels, tags, emoticons, and ids. Never fails;
    /// empty or whitespace input yields an empty list.
    fn search(&self, query: String) -> Vec<EmojiRecord>;

    /// Count one selection for the frequently-used row and persist it.
    fn record_usage(&self, id: String);

    /// The most-used emojis, highest count first, at most 16 entries.
    fn frequently_used(&self) -> Vec<EmojiRecord>;

    /// Drop all usage counts, in memory and in the backing store.
    fn clear_usage(&self);

    /// Whether `text` renders as a real glyph on this host.
    fn is_glyph_supported(&self, text: String) -> bool;
}

// ============================================================================
// HOST PROVIDER INTERFACES
// ============================================================================

/// Persistence seam for the usage-count payload.
///
/// The payload is one opaque JSON string; implementations never fail the
/// caller and log problems on their own side. The macOS shell backs this
/// with UserDefaults, headless hosts use [`crate::JsonFileUsageStore`].
#[uniffi::export(with_foreign)]
pub trait UsageStore: Send + Sync {
    /// The stored payload, if any.
    fn read(&self) -> Option<String>;

    /// Replace the stored payload.
    fn write(&self, payload: String);

    /// Remove the stored payload.
    fn clear(&self);
}

/// Host hook answering whether a character sequence has a real glyph in the
/// installed fonts. Answers are memoized per store, so implementations may
/// be as slow as a font-table lookup.
#[uniffi::export(with_foreign)]
pub trait GlyphSource: Send + Sync {
    fn is_glyph_supported(&self, text: String) -> bool;
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<crate::corpus::CorpusError> for GrinError {
    fn from(e: crate::corpus::CorpusError) -> Self {
        GrinError::CorpusError(e.to_string())
    }
}

impl From<crate::indexer::IndexerError> for GrinError {
    fn from(e: crate::indexer::IndexerError) -> Self {
        GrinError::IndexError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_round_trip() {
        for group in EmojiGroup::ALL {
            assert_eq!(EmojiGroup::from_raw(group.raw()), Some(group));
        }
        assert_eq!(EmojiGroup::from_raw(10), None);
        assert_eq!(EmojiGroup::from_raw(u32::MAX), None);
    }

    #[test]
    fn component_group_is_id_two() {
        assert_eq!(EmojiGroup::Component.raw(), 2);
    }

    #[test]
    fn every_group_has_a_tab_face() {
        for group in EmojiGroup::ALL {
            assert!(!group.display_name().is_empty());
            assert!(!group.representative().is_empty());
        }
    }
}
