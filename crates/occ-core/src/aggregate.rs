//! Per-word occurrence totals across the counted decks.

use std::collections::BTreeSet;

use tracing::debug_span;

use crate::cache::TrimmedDeck;
use crate::config::DeckFilter;
use crate::ids::VocabId;

/// A word as it appears on a page: vocabulary id plus the spelling shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordRef {
    pub vid: VocabId,
    pub spelling: String,
}

impl WordRef {
    pub fn new(vid: VocabId, spelling: impl Into<String>) -> Self {
        Self {
            vid,
            spelling: spelling.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    pub total_all_spellings: u64,
    pub total_this_spelling: u64,
    /// Other spellings of the same vocabulary id seen in counted decks.
    pub other_spellings: BTreeSet<String>,
}

impl WordCounts {
    pub fn other_spellings_total(&self) -> u64 {
        self.total_all_spellings - self.total_this_spelling
    }

    /// One-line description of the counts for `spelling`.
    pub fn summary(&self, spelling: &str) -> String {
        if self.other_spellings.is_empty() {
            if self.total_this_spelling == 0 {
                return format!("{spelling} never occurs in the decks");
            }
            return format!(
                "{spelling} occurs {}× and is the only spelling",
                self.total_this_spelling
            );
        }
        let others: Vec<&str> = self.other_spellings.iter().map(String::as_str).collect();
        let verb = if others.len() == 1 { "occurs" } else { "occur" };
        format!(
            "{spelling} occurs {}×, {} {verb} {}×",
            self.total_this_spelling,
            others.join("/"),
            self.other_spellings_total()
        )
    }
}

/// Count `item` across every deck that passes `filter`.
///
/// Entries of the same vocabulary id count towards `total_all_spellings`;
/// only those with `item.spelling` count towards `total_this_spelling`.
pub fn aggregate(item: &WordRef, decks: &[TrimmedDeck], filter: &DeckFilter) -> WordCounts {
    let _span = debug_span!("aggregate", vid = item.vid).entered();
    let mut counts = WordCounts::default();
    for deck in decks {
        if !filter.allows(deck.id) || deck.is_empty() {
            continue;
        }
        let Some(mapped) = deck.mapped_vid(item.vid) else {
            continue;
        };
        for entry in deck.entries.iter().filter(|e| e.vid_text == mapped) {
            let n = u64::from(entry.occurrences);
            counts.total_all_spellings += n;
            if entry.spelling == item.spelling {
                counts.total_this_spelling += n;
            } else {
                counts.other_spellings.insert(entry.spelling.clone());
            }
        }
    }
    counts
}
