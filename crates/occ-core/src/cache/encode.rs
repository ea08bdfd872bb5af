use std::collections::HashMap;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, debug_span};

use super::{CacheSnapshot, DeckSnapshot, OccurrenceRecord, SlotEntry, SlotTable};
use crate::ids::{vid_text, DeckId, SpellingId, VocabId, WordIdentity, WordSlot};

/// A deck as delivered by the fetch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeck {
    pub id: DeckId,
    pub name: String,
    pub vocabulary: Vec<WordOccurrence>,
}

/// One word of a source deck with its occurrence count in that deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordOccurrence {
    pub vid: VocabId,
    pub sid: SpellingId,
    pub occurrences: u32,
}

impl WordOccurrence {
    pub fn identity(&self) -> WordIdentity {
        WordIdentity::new(self.vid, self.sid)
    }
}

/// Encode decks into a snapshot stamped with the current time.
pub fn encode(decks: &[SourceDeck], spellings: &HashMap<SpellingId, String>) -> CacheSnapshot {
    encode_at(decks, spellings, OffsetDateTime::now_utc())
}

/// Encode decks into a snapshot stamped with `fetched_at`.
///
/// Slots are assigned in first-seen order over decks, then records. A slot is
/// keyed by vocabulary id and spelling text, so two spelling ids that resolve
/// to the same text share one slot. Records whose spelling id is missing from
/// `spellings`, or that occur zero times, are dropped.
pub fn encode_at(
    decks: &[SourceDeck],
    spellings: &HashMap<SpellingId, String>,
    fetched_at: OffsetDateTime,
) -> CacheSnapshot {
    let _span = debug_span!("encode", decks = decks.len()).entered();

    let mut words = SlotTable::default();
    let mut slot_of: HashMap<(VocabId, &str), WordSlot> = HashMap::new();
    let mut dropped = 0usize;

    let compressed: Vec<DeckSnapshot> = decks
        .iter()
        .map(|deck| {
            let mut records = Vec::with_capacity(deck.vocabulary.len());
            for word in &deck.vocabulary {
                let Some(spelling) = spellings.get(&word.sid) else {
                    dropped += 1;
                    continue;
                };
                if word.occurrences == 0 {
                    dropped += 1;
                    continue;
                }
                let slot = *slot_of.entry((word.vid, spelling.as_str())).or_insert_with(|| {
                    words.push(SlotEntry {
                        vid_text: vid_text(word.vid),
                        spelling: spelling.clone(),
                    })
                });
                records.push(OccurrenceRecord::new(slot, word.occurrences));
            }
            DeckSnapshot {
                name: deck.name.clone(),
                id: deck.id,
                records,
            }
        })
        .collect();

    debug!(slots = words.len(), dropped, "encoded cache");

    let fetched_at = fetched_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| fetched_at.unix_timestamp().to_string());
    CacheSnapshot::from_parts(compressed, words, fetched_at)
}
