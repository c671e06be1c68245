//! Glyph support checks, memoized per store.
//!
//! Whether a character sequence renders as a real glyph depends on the
//! host's installed fonts, so the actual answer comes from a [`GlyphSource`]
//! the host injects. Sources may be as slow as a font-table lookup; every
//! answer is cached here and the same text is never asked twice.

use crate::interface::GlyphSource;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) struct GlyphCache {
    source: Arc<dyn GlyphSource>,
    answers: RwLock<HashMap<String, bool>>,
}

impl GlyphCache {
    pub(crate) fn new(source: Arc<dyn GlyphSource>) -> GlyphCache {
        GlyphCache {
            source,
            answers: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn is_supported(&self, text: &str) -> bool {
        if let Some(&answer) = self.answers.read().get(text) {
            return answer;
        }
        let answer = self.source.is_glyph_supported(text.to_string());
        self.answers.write().insert(text.to_string(), answer);
        answer
    }
}

/// Fallback [`GlyphSource`] for hosts without font access.
///
/// Optimistic on purpose: without a font table the only safe default is to
/// show the emoji rather than hide it. Rejected are empty input, the
/// replacement character, and sequences that open with a bare sub-glyph
/// scalar (a skin-tone modifier, variation selector, zero-width joiner, or
/// combining keycap), which never render standalone.
pub struct DefaultGlyphSource;

impl GlyphSource for DefaultGlyphSource {
    fn is_glyph_supported(&self, text: String) -> bool {
        let trimmed = text.trim();
        let Some(first) = trimmed.chars().next() else {
            return false;
        };
        if trimmed.contains('\u{FFFD}') {
            return false;
        }
        !matches!(
            first,
            '\u{1F3FB}'..='\u{1F3FF}' | '\u{FE00}'..='\u{FE0F}' | '\u{200D}' | '\u{20E3}'
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl GlyphSource for CountingSource {
        fn is_glyph_supported(&self, text: String) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            text != "\u{1FAE9}"
        }
    }

    #[test]
    fn answers_are_memoized() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = GlyphCache::new(source.clone());

        assert!(cache.is_supported("\u{1F920}"));
        assert!(cache.is_supported("\u{1F920}"));
        assert!(cache.is_supported("\u{1F920}"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert!(!cache.is_supported("\u{1FAE9}"));
        assert!(!cache.is_supported("\u{1FAE9}"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn default_source_accepts_real_sequences() {
        let source = DefaultGlyphSource;
        assert!(source.is_glyph_supported("\u{1F920}".to_string()));
        // zero-width-joiner sequence, joiner not in leading position
        assert!(source.is_glyph_supported("\u{1F469}\u{200D}\u{1F692}".to_string()));
        // skin-tone rendition led by the base scalar
        assert!(source.is_glyph_supported("\u{1F44B}\u{1F3FB}".to_string()));
        assert!(!source.is_glyph_supported(String::new()));
        assert!(!source.is_glyph_supported("  ".to_string()));
        assert!(!source.is_glyph_supported("\u{FFFD}".to_string()));
    }

    #[test]
    fn default_source_rejects_bare_sub_glyph_scalars() {
        let source = DefaultGlyphSource;
        assert!(!source.is_glyph_supported("\u{1F3FB}".to_string())); // skin tone
        assert!(!source.is_glyph_supported("\u{FE0F}".to_string())); // variation selector
        assert!(!source.is_glyph_supported("\u{200D}".to_string())); // joiner
        assert!(!source.is_glyph_supported("\u{20E3}".to_string())); // keycap
    }
}
