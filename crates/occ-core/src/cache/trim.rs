use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, debug_span};

use super::{decode, CacheError, CacheSnapshot, FormatVersion};
use crate::ids::{vid_text, DeckId, VocabId};

/// Raw vocabulary id → slot table text, shared by every deck of one query.
pub type VidMap = HashMap<VocabId, String>;

/// The vocabulary ids a query is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetVids {
    One(VocabId),
    Many(BTreeSet<VocabId>),
}

impl TargetVids {
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn vid_map(&self) -> VidMap {
        match self {
            Self::One(vid) => HashMap::from([(*vid, vid_text(*vid))]),
            Self::Many(set) => set.iter().map(|&vid| (vid, vid_text(vid))).collect(),
        }
    }
}

impl From<VocabId> for TargetVids {
    fn from(vid: VocabId) -> Self {
        Self::One(vid)
    }
}

impl FromIterator<VocabId> for TargetVids {
    fn from_iter<I: IntoIterator<Item = VocabId>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedEntry {
    pub vid_text: String,
    pub spelling: String,
    pub occurrences: u32,
}

/// One deck restricted to the query's target words.
#[derive(Debug, Clone)]
pub struct TrimmedDeck {
    pub id: DeckId,
    pub name: String,
    pub entries: Vec<TrimmedEntry>,
    pub vid_map: Arc<VidMap>,
}

impl TrimmedDeck {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slot table text for `vid`, if `vid` was one of the query targets.
    pub fn mapped_vid(&self, vid: VocabId) -> Option<&str> {
        self.vid_map.get(&vid).map(String::as_str)
    }
}

/// Decode a stored snapshot and trim it in one step.
pub fn decode_and_trim(
    raw: Option<&str>,
    targets: &TargetVids,
) -> Result<Vec<TrimmedDeck>, CacheError> {
    let snapshot = decode(raw)?;
    Ok(trim_decks(&snapshot, targets))
}

/// Project every deck of `snapshot` onto the entries of `targets`.
///
/// Decks come back in snapshot order, including decks with no matching
/// entries.
pub fn trim_decks(snapshot: &CacheSnapshot, targets: &TargetVids) -> Vec<TrimmedDeck> {
    match snapshot.format() {
        FormatVersion::V1 => trim_v1(snapshot, targets),
    }
}

fn trim_v1(snapshot: &CacheSnapshot, targets: &TargetVids) -> Vec<TrimmedDeck> {
    let _span = debug_span!("trim_decks", targets = targets.len()).entered();

    let vid_map = Arc::new(targets.vid_map());
    let wanted_text: HashSet<&str> = vid_map.values().map(String::as_str).collect();

    // One pass over the slot table, so each record below is a single index.
    let wanted: Vec<bool> = snapshot
        .slots()
        .iter()
        .map(|e| wanted_text.contains(e.vid_text.as_str()))
        .collect();

    let mut matched = 0usize;
    let trimmed: Vec<TrimmedDeck> = snapshot
        .decks()
        .iter()
        .map(|deck| {
            let mut entries = Vec::new();
            for record in &deck.records {
                let (slot, occurrences) = record.parts();
                if occurrences == 0 || !wanted.get(slot as usize).copied().unwrap_or(false) {
                    continue;
                }
                let Some(word) = snapshot.slots().get(slot) else {
                    continue;
                };
                entries.push(TrimmedEntry {
                    vid_text: word.vid_text.clone(),
                    spelling: word.spelling.clone(),
                    occurrences,
                });
            }
            matched += entries.len();
            TrimmedDeck {
                id: deck.id,
                name: deck.name.clone(),
                entries,
                vid_map: Arc::clone(&vid_map),
            }
        })
        .collect();

    debug!(decks = trimmed.len(), matched, "trimmed cache");
    trimmed
}
