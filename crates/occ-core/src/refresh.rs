//! Cache refresh: fetch every deck from a [`DeckSource`], resolve spellings,
//! encode, and replace the stored snapshot in a single write.
//!
//! Calls are made one at a time: deck list, each deck in list order, then one
//! batched spelling lookup. Nothing is written unless every call succeeds.

use std::collections::{HashMap, HashSet};
use std::io;

use tracing::info;

use crate::cache::{encode, SourceDeck, WordOccurrence};
use crate::ids::{DeckId, SpellingId, WordIdentity};
use crate::store::{CacheStore, EntryStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("could not store the cache: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckHeader {
    pub id: DeckId,
    pub name: String,
}

/// Upstream provider of deck contents and spelling text.
pub trait DeckSource {
    fn list_decks(&mut self) -> Result<Vec<DeckHeader>, SourceError>;

    fn deck_vocabulary(&mut self, deck: &DeckHeader) -> Result<Vec<WordOccurrence>, SourceError>;

    /// Resolve spelling text for `words`. Words that cannot be resolved are
    /// left out of the returned map.
    fn lookup_spellings(
        &mut self,
        words: &[WordIdentity],
    ) -> Result<HashMap<SpellingId, String>, SourceError>;
}

/// Refresh progress, reported before each step starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshProgress<'a> {
    ListingDecks,
    /// `index` is 1-based.
    Deck {
        index: usize,
        total: usize,
        name: &'a str,
    },
    Spellings {
        words: usize,
    },
    Compressing,
    Done {
        fetched_at: &'a str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub decks: usize,
    /// Records kept in the snapshot.
    pub records: usize,
    pub slots: usize,
    /// Source records dropped for lack of a spelling (or a zero count).
    pub dropped: usize,
    pub fetched_at: String,
}

pub fn refresh<S: EntryStore>(
    source: &mut dyn DeckSource,
    store: &CacheStore<S>,
    mut progress: impl FnMut(RefreshProgress<'_>),
) -> Result<RefreshSummary, RefreshError> {
    progress(RefreshProgress::ListingDecks);
    info!("fetching deck list");
    let headers = source.list_decks()?;

    let total = headers.len();
    let mut decks = Vec::with_capacity(total);
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for (i, header) in headers.into_iter().enumerate() {
        progress(RefreshProgress::Deck {
            index: i + 1,
            total,
            name: &header.name,
        });
        info!(deck = header.id, "fetching deck {} of {total}", i + 1);
        let vocabulary = source.deck_vocabulary(&header)?;
        for word in &vocabulary {
            if seen.insert(word.identity()) {
                words.push(word.identity());
            }
        }
        decks.push(SourceDeck {
            id: header.id,
            name: header.name,
            vocabulary,
        });
    }

    progress(RefreshProgress::Spellings { words: words.len() });
    info!(words = words.len(), "fetching spellings");
    let spellings = source.lookup_spellings(&words)?;

    progress(RefreshProgress::Compressing);
    let snapshot = encode(&decks, &spellings);
    store.set_snapshot(&snapshot)?;

    let source_records: usize = decks.iter().map(|d| d.vocabulary.len()).sum();
    let summary = RefreshSummary {
        decks: snapshot.decks().len(),
        records: snapshot.record_count(),
        slots: snapshot.slots().len(),
        dropped: source_records - snapshot.record_count(),
        fetched_at: snapshot.fetched_at().to_string(),
    };
    info!(
        decks = summary.decks,
        slots = summary.slots,
        dropped = summary.dropped,
        "cache refreshed"
    );
    progress(RefreshProgress::Done {
        fetched_at: &summary.fetched_at,
    });
    Ok(summary)
}
