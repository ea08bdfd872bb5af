//! Compressed deck cache.
//!
//! A `CacheSnapshot` stores every (vocabulary id, spelling) pair once in a
//! slot table; decks reference words by slot. Records with a single
//! occurrence are stored as a bare slot number, others as `[slot, count]`.
//!
//! The serialized form is JSON tagged with a format UUID. Decoding is a single
//! pass: the tag is checked as soon as it is read, and an unknown tag stops the
//! parse there. Encoders write the tag first; fields that come before it are
//! buffered until the version is known.

mod encode;
#[cfg(test)]
mod tests;
mod trim;

pub use encode::{encode, encode_at, SourceDeck, WordOccurrence};
pub use trim::{decode_and_trim, trim_decks, TargetVids, TrimmedDeck, TrimmedEntry, VidMap};

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ids::{DeckId, WordSlot};

/// Tag written by format 1 encoders.
pub const FORMAT_1_TAG: &str = "2f0169ea-593c-423f-8496-255f98f73df5";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("no decks in cache")]
    Missing,

    #[error("unrecognized cache format: {}", .0.as_deref().unwrap_or("<none>"))]
    UnknownFormat(Option<String>),

    #[error("malformed cache: {0}")]
    Malformed(String),

    #[error("cache could not be read: {0}")]
    Unreadable(String),
}

/// Snapshot format versions this build can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    V1,
}

impl FormatVersion {
    /// Version written by [`encode`].
    pub const CURRENT: Self = Self::V1;

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            FORMAT_1_TAG => Some(Self::V1),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::V1 => FORMAT_1_TAG,
        }
    }
}

impl Serialize for FormatVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// One deck's reference to a word slot.
///
/// `Implicit` is the shorthand for a single occurrence. Use [`parts`](Self::parts)
/// rather than matching on the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OccurrenceRecord {
    Implicit(WordSlot),
    Explicit(WordSlot, u32),
}

impl OccurrenceRecord {
    /// Build a record, using the shorthand form when `count == 1`.
    pub fn new(slot: WordSlot, count: u32) -> Self {
        if count == 1 {
            Self::Implicit(slot)
        } else {
            Self::Explicit(slot, count)
        }
    }

    /// Normalized `(slot, count)`.
    pub fn parts(self) -> (WordSlot, u32) {
        match self {
            Self::Implicit(slot) => (slot, 1),
            Self::Explicit(slot, count) => (slot, count),
        }
    }

    pub fn slot(self) -> WordSlot {
        self.parts().0
    }

    pub fn count(self) -> u32 {
        self.parts().1
    }
}

/// Display data for one word slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotEntry {
    /// Base-36 vocabulary id, see [`crate::ids::vid_text`].
    pub vid_text: String,
    pub spelling: String,
}

/// Slot table, serialized flat as `[vid0, spelling0, vid1, spelling1, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct SlotTable {
    entries: Vec<SlotEntry>,
}

impl SlotTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: WordSlot) -> Option<&SlotEntry> {
        self.entries.get(slot as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlotEntry> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, entry: SlotEntry) -> WordSlot {
        let slot = self.entries.len() as WordSlot;
        self.entries.push(entry);
        slot
    }
}

impl TryFrom<Vec<String>> for SlotTable {
    type Error = String;

    fn try_from(words: Vec<String>) -> Result<Self, Self::Error> {
        if words.len() % 2 != 0 {
            return Err(format!("slot table has odd length {}", words.len()));
        }
        let mut entries = Vec::with_capacity(words.len() / 2);
        let mut it = words.into_iter();
        while let (Some(vid_text), Some(spelling)) = (it.next(), it.next()) {
            entries.push(SlotEntry { vid_text, spelling });
        }
        Ok(Self { entries })
    }
}

impl Serialize for SlotTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len() * 2))?;
        for e in &self.entries {
            seq.serialize_element(&e.vid_text)?;
            seq.serialize_element(&e.spelling)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSnapshot {
    pub name: String,
    pub id: DeckId,
    #[serde(rename = "vocabulary")]
    pub records: Vec<OccurrenceRecord>,
}

/// The persisted unit: every deck, the shared slot table and the fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    format: FormatVersion,
    decks: Vec<DeckSnapshot>,
    words: SlotTable,
    #[serde(rename = "lastFetched")]
    fetched_at: String,
}

impl CacheSnapshot {
    pub(crate) fn from_parts(decks: Vec<DeckSnapshot>, words: SlotTable, fetched_at: String) -> Self {
        Self {
            format: FormatVersion::CURRENT,
            decks,
            words,
            fetched_at,
        }
    }

    pub fn format(&self) -> FormatVersion {
        self.format
    }

    pub fn decks(&self) -> &[DeckSnapshot] {
        &self.decks
    }

    pub fn slots(&self) -> &SlotTable {
        &self.words
    }

    pub fn fetched_at(&self) -> &str {
        &self.fetched_at
    }

    pub fn record_count(&self) -> usize {
        self.decks.iter().map(|d| d.records.len()).sum()
    }

    /// Look up the display data of a record's slot.
    pub fn resolve(&self, record: OccurrenceRecord) -> Option<&SlotEntry> {
        self.words.get(record.slot())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Every record must point into the slot table. Zero counts are allowed
    /// and skipped by the trim.
    fn validate(&self) -> Result<(), CacheError> {
        let slots = self.words.len();
        for deck in &self.decks {
            for record in &deck.records {
                let slot = record.slot();
                if slot as usize >= slots {
                    return Err(CacheError::Malformed(format!(
                        "deck {} references slot {slot} but the table has {slots} slots",
                        deck.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(field_identifier)]
enum Field {
    #[serde(rename = "format")]
    Format,
    #[serde(rename = "decks")]
    Decks,
    #[serde(rename = "words")]
    Words,
    #[serde(rename = "lastFetched")]
    LastFetched,
    #[serde(other)]
    Other,
}

/// Format 1 fields collected while walking the document.
#[derive(Default)]
struct V1Fields {
    decks: Option<Vec<DeckSnapshot>>,
    words: Option<SlotTable>,
    fetched_at: Option<String>,
}

impl V1Fields {
    fn read<'de, A: MapAccess<'de>>(&mut self, field: Field, map: &mut A) -> Result<(), A::Error> {
        match field {
            Field::Decks => self.decks = Some(map.next_value()?),
            Field::Words => self.words = Some(map.next_value()?),
            Field::LastFetched => self.fetched_at = Some(map.next_value()?),
            Field::Format | Field::Other => {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(())
    }

    /// Decode a field that was buffered before the tag.
    fn take(&mut self, field: Field, value: Value) -> Result<(), serde_json::Error> {
        match field {
            Field::Decks => self.decks = Some(Vec::deserialize(value)?),
            Field::Words => self.words = Some(SlotTable::deserialize(value)?),
            Field::LastFetched => self.fetched_at = Some(String::deserialize(value)?),
            Field::Format | Field::Other => {}
        }
        Ok(())
    }

    fn finish<E: de::Error>(self) -> Result<CacheSnapshot, E> {
        Ok(CacheSnapshot {
            format: FormatVersion::V1,
            decks: self.decks.ok_or_else(|| E::missing_field("decks"))?,
            words: self.words.ok_or_else(|| E::missing_field("words"))?,
            fetched_at: self.fetched_at.ok_or_else(|| E::missing_field("lastFetched"))?,
        })
    }
}

/// Set by the visitor when it stops because of the format tag.
#[derive(Debug, Default)]
struct TagRejection {
    rejected: bool,
    tag: Option<String>,
}

struct SnapshotVisitor<'a> {
    rejection: &'a mut TagRejection,
}

impl SnapshotVisitor<'_> {
    fn reject<E: de::Error>(self, tag: Option<String>) -> E {
        let msg = format!("unrecognized format tag {tag:?}");
        self.rejection.rejected = true;
        self.rejection.tag = tag;
        E::custom(msg)
    }
}

impl<'de> Visitor<'de> for SnapshotVisitor<'_> {
    type Value = CacheSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a cache snapshot object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CacheSnapshot, A::Error> {
        let mut version = None;
        let mut fields = V1Fields::default();
        let mut early: Vec<(Field, Value)> = Vec::new();

        while let Some(field) = map.next_key::<Field>()? {
            match field {
                Field::Format => {
                    let tag: Option<String> = map.next_value()?;
                    match tag.as_deref().and_then(FormatVersion::from_tag) {
                        Some(v) => version = Some(v),
                        None => return Err(self.reject(tag)),
                    }
                }
                Field::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
                _ if version.is_some() => fields.read(field, &mut map)?,
                _ => early.push((field, map.next_value()?)),
            }
        }

        match version {
            Some(FormatVersion::V1) => {
                for (field, value) in early {
                    fields
                        .take(field, value)
                        .map_err(<A::Error as de::Error>::custom)?;
                }
                fields.finish()
            }
            None => Err(self.reject(None)),
        }
    }
}

/// Decode a stored snapshot string.
///
/// `None` (nothing stored) is [`CacheError::Missing`]. A document whose tag
/// is not listed in [`FormatVersion`] is [`CacheError::UnknownFormat`]; when
/// the tag comes first, nothing after it is parsed.
pub fn decode(raw: Option<&str>) -> Result<CacheSnapshot, CacheError> {
    let raw = raw.ok_or(CacheError::Missing)?;
    let mut rejection = TagRejection::default();
    let mut de = serde_json::Deserializer::from_str(raw);
    let parsed = (&mut de)
        .deserialize_map(SnapshotVisitor {
            rejection: &mut rejection,
        })
        .and_then(|snapshot| de.end().map(|()| snapshot));
    let snapshot = match parsed {
        Ok(snapshot) => snapshot,
        Err(_) if rejection.rejected => return Err(CacheError::UnknownFormat(rejection.tag)),
        Err(e) => return Err(CacheError::Malformed(e.to_string())),
    };
    snapshot.validate()?;
    debug!(
        format = snapshot.format.tag(),
        decks = snapshot.decks.len(),
        slots = snapshot.words.len(),
        "decoded cache"
    );
    Ok(snapshot)
}
