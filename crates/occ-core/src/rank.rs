//! Display ordering for the per-deck occurrence table.
//!
//! Columns are spellings, most frequent first. Rows are decks, ordered by a
//! weighted total in which every occurrence counts `NUDGE_BASE` plus a bonus
//! for how high its spelling ranks. The base dominates realistic counts, so
//! decks dominated by well-known spellings sort above decks with slightly
//! more occurrences of rare ones.

use std::collections::HashMap;

use tracing::{debug, debug_span};

use crate::cache::TrimmedDeck;
use crate::config::DeckFilter;
use crate::ids::DeckId;

/// Weight of one occurrence whose spelling is not among the ranked columns.
pub const NUDGE_BASE: u64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingColumn {
    pub spelling: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckRow {
    pub deck_id: DeckId,
    pub deck_name: String,
    /// One cell per ranked column; `None` renders blank.
    pub cells: Vec<Option<u64>>,
    /// Spellings missing from the ranked columns, in entry order.
    pub extra: Vec<(String, u64)>,
    pub total: u64,
    pub weighted_total: u64,
}

/// Ranked columns and rows for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceTable {
    pub columns: Vec<SpellingColumn>,
    pub rows: Vec<DeckRow>,
    /// Sum of the row totals.
    pub total: u64,
}

impl OccurrenceTable {
    pub fn build(decks: &[TrimmedDeck], filter: &DeckFilter) -> Self {
        let columns = rank_spelling_columns(decks);
        let rows = rank_deck_rows(decks, &columns, filter);
        let total = rows.iter().map(|r| r.total).sum();
        Self {
            columns,
            rows,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Total occurrences per spelling over all decks, descending.
/// Equal totals keep the order in which the spellings were first seen.
pub fn rank_spelling_columns(decks: &[TrimmedDeck]) -> Vec<SpellingColumn> {
    let _span = debug_span!("rank_spelling_columns").entered();
    let mut columns: Vec<SpellingColumn> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for entry in decks.iter().flat_map(|d| &d.entries) {
        let i = *index.entry(entry.spelling.as_str()).or_insert_with(|| {
            columns.push(SpellingColumn {
                spelling: entry.spelling.clone(),
                total: 0,
            });
            columns.len() - 1
        });
        columns[i].total += u64::from(entry.occurrences);
    }
    // Stable: ties stay in discovery order.
    columns.sort_by(|a, b| b.total.cmp(&a.total));
    columns
}

/// Weight of one occurrence of the spelling at `rank` among `column_count` columns.
pub fn nudge(rank: Option<usize>, column_count: usize) -> u64 {
    match rank {
        Some(i) => NUDGE_BASE + column_count.saturating_sub(i) as u64,
        None => NUDGE_BASE,
    }
}

/// One row per counted, non-empty deck, by descending weighted total.
pub fn rank_deck_rows(
    decks: &[TrimmedDeck],
    columns: &[SpellingColumn],
    filter: &DeckFilter,
) -> Vec<DeckRow> {
    let _span = debug_span!("rank_deck_rows", columns = columns.len()).entered();
    let rank_of: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.spelling.as_str(), i))
        .collect();

    let mut rows: Vec<DeckRow> = Vec::new();
    for deck in decks {
        if !filter.allows(deck.id) || deck.is_empty() {
            continue;
        }
        let mut cells = vec![None; columns.len()];
        let mut extra: Vec<(String, u64)> = Vec::new();
        let mut total = 0u64;
        let mut weighted_total = 0u64;
        for entry in &deck.entries {
            let n = u64::from(entry.occurrences);
            let rank = rank_of.get(entry.spelling.as_str()).copied();
            total += n;
            weighted_total = weighted_total.saturating_add(n.saturating_mul(nudge(rank, columns.len())));
            match rank {
                Some(i) => *cells[i].get_or_insert(0) += n,
                None => extra.push((entry.spelling.clone(), n)),
            }
        }
        if weighted_total == 0 {
            continue;
        }
        rows.push(DeckRow {
            deck_id: deck.id,
            deck_name: deck.name.clone(),
            cells,
            extra,
            total,
            weighted_total,
        });
    }
    rows.sort_by(|a, b| b.weighted_total.cmp(&a.weighted_total));
    debug!(rows = rows.len());
    rows
}
