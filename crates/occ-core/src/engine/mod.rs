//! Page-level queries over the stored cache.
//!
//! Each query reads the config, decodes and trims the snapshot once, then
//! aggregates and ranks. A missing or unreadable cache is logged and the
//! query shows nothing; it is never an error for the caller.


use tracing::{debug, error};

use crate::aggregate::{aggregate, WordCounts, WordRef};
use crate::cache::{trim_decks, TargetVids, TrimmedDeck};
use crate::config::{Config, LoadedConfig, Page};
use crate::ids::VocabId;
use crate::rank::OccurrenceTable;
use crate::refresh::{self, DeckSource, RefreshError, RefreshProgress, RefreshSummary};
use crate::store::{CacheStore, EntryStore, StoreError};

/// What a vocabulary page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyView {
    /// Per-deck table for the page's word and, with list counts on, the
    /// listed words.
    pub table: OccurrenceTable,
    /// Counts for the words listed on the page, in input order. Empty when
    /// list counts are disabled.
    pub listed: Vec<(WordRef, WordCounts)>,
}

pub struct OccurrenceEngine<S> {
    store: CacheStore<S>,
}

impl<S: EntryStore> OccurrenceEngine<S> {
    pub fn new(store: CacheStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CacheStore<S> {
        &self.store
    }

    pub fn config(&self) -> LoadedConfig {
        self.store.config()
    }

    pub fn save_config(&self, config: &Config) -> Result<(), StoreError> {
        self.store.set_config(config)
    }

    /// Trimmed decks for `targets`; empty when the cache is unusable.
    pub fn trimmed_decks(&self, targets: &TargetVids) -> Vec<TrimmedDeck> {
        self.load_trimmed(targets).unwrap_or_default()
    }

    fn load_trimmed(&self, targets: &TargetVids) -> Option<Vec<TrimmedDeck>> {
        match self.store.snapshot() {
            Ok(snapshot) => Some(trim_decks(&snapshot, targets)),
            Err(e) => {
                error!("{e}; fetch the decks again to rebuild the cache");
                None
            }
        }
    }

    /// Table for word `vid` plus counts for the words `listed` on the page.
    ///
    /// With list counts on, the table covers the listed words too. `None`
    /// when `page` has its table disabled or the cache is unusable.
    pub fn vocabulary_view(
        &self,
        page: Page,
        vid: VocabId,
        listed: &[WordRef],
    ) -> Option<VocabularyView> {
        let config = self.config().config;
        if !config.shows_table_on(page) {
            return None;
        }
        let with_counts = config.shows_counts_on(page);
        let targets: TargetVids = if with_counts && !listed.is_empty() {
            std::iter::once(vid)
                .chain(listed.iter().map(|w| w.vid))
                .collect()
        } else {
            TargetVids::One(vid)
        };
        let decks = self.load_trimmed(&targets)?;
        let filter = config.deck_filter();

        let table = OccurrenceTable::build(&decks, &filter);
        debug!(vid, rows = table.rows.len(), "vocabulary table");

        let listed = if with_counts {
            listed
                .iter()
                .map(|w| (w.clone(), aggregate(w, &decks, &filter)))
                .collect()
        } else {
            Vec::new()
        };
        Some(VocabularyView { table, listed })
    }

    /// Counts for each item of a word list (deck page, kanji page).
    ///
    /// `None` when counts are disabled on `page` or the cache is unusable.
    pub fn list_counts(&self, page: Page, items: &[WordRef]) -> Option<Vec<WordCounts>> {
        let config = self.config().config;
        if !config.shows_counts_on(page) {
            return None;
        }
        let targets: TargetVids = items.iter().map(|w| w.vid).collect();
        let decks = self.load_trimmed(&targets)?;
        let filter = config.deck_filter();
        Some(
            items
                .iter()
                .map(|item| aggregate(item, &decks, &filter))
                .collect(),
        )
    }

    pub fn refresh(
        &self,
        source: &mut dyn DeckSource,
        progress: impl FnMut(RefreshProgress<'_>),
    ) -> Result<RefreshSummary, RefreshError> {
        refresh::refresh(source, &self.store, progress)
    }
}
