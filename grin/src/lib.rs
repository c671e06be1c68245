//! Grin Core - Rust search engine for the Grin emoji picker
//!
//! This library implements the data pipeline (load, filter, group, index)
//! and the staged search that powers keystroke-driven lookup over the
//! bundled emoji corpus, plus the usage tracker behind the
//! frequently-used row.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub mod corpus;
mod glyph;
pub mod indexer;
pub mod interface;
pub mod models;
pub mod search;
mod store;
mod usage;

pub use glyph::DefaultGlyphSource;
pub use interface::*;
pub use store::EmojiStore;
pub use usage::{JsonFileUsageStore, MemoryUsageStore, MAX_FREQUENT};

uniffi::setup_scaffolding!("grin");
