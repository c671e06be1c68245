//! Corpus record model shared by the loader, the indexer, and the FFI layer.

use crate::interface::{EmojiGroup, EmojiRecord, SkinVariant};
use serde::{Deserialize, Serialize};

/// Emoticon aliases as shipped in the dataset: either a single string or a
/// list of alternatives for the same emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emoticon {
    Single(String),
    Multiple(Vec<String>),
}

impl Emoticon {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Emoticon::Single(alias) => std::slice::from_ref(alias),
            Emoticon::Multiple(aliases) => aliases,
        }
    }
}

/// One bundled dataset entry. Skin-tone variants reuse the same shape,
/// nested one level deep under `skins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    pub hexcode: String,
    pub label: String,
    pub unicode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoticon: Option<Emoticon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<Vec<Emoji>>,
}

/// Label fragments marking sub-glyph component entries, matched
/// case-insensitively.
const COMPONENT_LABEL_FRAGMENTS: [&str; 5] = [
    "skin tone",
    "hair component",
    "combining",
    "modifier",
    "variation selector",
];

impl Emoji {
    /// Group id with the dataset default applied; entries without an
    /// explicit group belong to group 0.
    pub fn group_raw(&self) -> u32 {
        self.group.unwrap_or(0)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    pub fn emoticons(&self) -> &[String] {
        self.emoticon.as_ref().map(Emoticon::as_slice).unwrap_or(&[])
    }

    pub fn skins(&self) -> &[Emoji] {
        self.skins.as_deref().unwrap_or(&[])
    }

    pub fn supports_skin_tones(&self) -> bool {
        !self.skins().is_empty()
    }

    /// Whether this entry is a standalone emoji rather than a sub-glyph
    /// building block.
    ///
    /// The raw dataset interleaves regional-indicator letters, skin-tone and
    /// hair components, combining marks, and bare selectors with the real
    /// emojis; none of those belong in the picker or the index. The
    /// "regional indicator" check stays case-sensitive to match the
    /// dataset's lowercase labels exactly.
    pub fn is_useful(&self) -> bool {
        if self.label.contains("regional indicator") {
            return false;
        }
        let label = self.label.to_lowercase();
        !COMPONENT_LABEL_FRAGMENTS
            .iter()
            .any(|fragment| label.contains(fragment))
    }

    /// The text blob fed to the index: label, tags, emoticon aliases, and
    /// the hexcode id, space-joined.
    pub fn search_blob(&self) -> String {
        let mut blob = String::with_capacity(self.label.len() + 32);
        blob.push_str(&self.label);
        for tag in self.tags() {
            blob.push(' ');
            blob.push_str(tag);
        }
        for alias in self.emoticons() {
            blob.push(' ');
            blob.push_str(alias);
        }
        blob.push(' ');
        blob.push_str(&self.hexcode);
        blob
    }

    /// Flattens into the FFI-facing record. Group ids were validated at
    /// load, so an out-of-range id here cannot occur; the fallback keeps
    /// the conversion total anyway.
    pub fn to_record(&self) -> EmojiRecord {
        EmojiRecord {
            id: self.hexcode.clone(),
            label: self.label.clone(),
            display: self.unicode.clone(),
            group: EmojiGroup::from_raw(self.group_raw())
                .unwrap_or(EmojiGroup::SmileysAndEmotion),
            order: self.order,
            tags: self.tags().to_vec(),
            emoticons: self.emoticons().to_vec(),
            skin_variants: self
                .skins()
                .iter()
                .map(|skin| SkinVariant {
                    id: skin.hexcode.clone(),
                    label: skin.label.clone(),
                    display: skin.unicode.clone(),
                })
                .collect(),
        }
    }
}
