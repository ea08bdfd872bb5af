//! Deck occurrence cache for jpdb.io vocabulary.
//!
//! Decks are fetched once, compressed into a [`cache::CacheSnapshot`] and
//! stored; page queries decode and trim the snapshot, then aggregate and rank
//! the per-deck counts.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod engine;
pub mod ids;
pub mod rank;
pub mod refresh;
pub mod store;

pub use aggregate::{WordCounts, WordRef};
pub use config::{Config, Page};
pub use engine::{OccurrenceEngine, VocabularyView};
pub use store::{CacheStore, FileStore, MemoryStore};
