//! Offline deck source read from a JSON export.
//!
//! ```json
//! {
//!   "decks": [{"id": 1, "name": "Deck A", "vocabulary": [[vid, sid, occurrences], ...]}],
//!   "spellings": {"sid": "text", ...}
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use occ_core::cache::WordOccurrence;
use occ_core::ids::{DeckId, SpellingId, VocabId, WordIdentity};
use occ_core::refresh::{DeckHeader, DeckSource, SourceError};

#[derive(Debug, Deserialize)]
struct ImportDeck {
    id: DeckId,
    name: String,
    vocabulary: Vec<(VocabId, SpellingId, u32)>,
}

#[derive(Debug, Deserialize)]
pub struct FileSource {
    decks: Vec<ImportDeck>,
    #[serde(default)]
    spellings: HashMap<SpellingId, String>,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SourceError> {
        serde_json::from_str(text).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

impl DeckSource for FileSource {
    fn list_decks(&mut self) -> Result<Vec<DeckHeader>, SourceError> {
        Ok(self
            .decks
            .iter()
            .map(|d| DeckHeader {
                id: d.id,
                name: d.name.clone(),
            })
            .collect())
    }

    fn deck_vocabulary(&mut self, deck: &DeckHeader) -> Result<Vec<WordOccurrence>, SourceError> {
        let found = self
            .decks
            .iter()
            .find(|d| d.id == deck.id)
            .ok_or_else(|| SourceError::Parse(format!("no deck with id {}", deck.id)))?;
        Ok(found
            .vocabulary
            .iter()
            .map(|&(vid, sid, occurrences)| WordOccurrence {
                vid,
                sid,
                occurrences,
            })
            .collect())
    }

    fn lookup_spellings(
        &mut self,
        words: &[WordIdentity],
    ) -> Result<HashMap<SpellingId, String>, SourceError> {
        Ok(words
            .iter()
            .filter_map(|w| self.spellings.get(&w.sid).map(|s| (w.sid, s.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use occ_core::cache::TargetVids;
    use occ_core::store::{CacheStore, FileStore};
    use occ_core::OccurrenceEngine;

    use super::*;

    const EXPORT: &str = r#"{
        "decks": [
            {"id": 1, "name": "Deck A", "vocabulary": [[1358280, 10, 5], [1358280, 11, 1]]},
            {"id": 2, "name": "Deck B", "vocabulary": [[1358280, 10, 2], [5, 99, 1]]}
        ],
        "spellings": {"10": "食べる", "11": "喰べる"}
    }"#;

    #[test]
    fn reads_decks_and_spellings() {
        let mut source = FileSource::from_json(EXPORT).unwrap();
        let decks = source.list_decks().unwrap();
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[1].name, "Deck B");

        let words = source.deck_vocabulary(&decks[0]).unwrap();
        assert_eq!(words[0].occurrences, 5);

        let spellings = source
            .lookup_spellings(&[WordIdentity::new(1_358_280, 11), WordIdentity::new(5, 99)])
            .unwrap();
        assert_eq!(spellings.len(), 1);
        assert_eq!(spellings[&11], "喰べる");
    }

    #[test]
    fn unknown_deck() {
        let mut source = FileSource::from_json(EXPORT).unwrap();
        let missing = DeckHeader {
            id: 42,
            name: "gone".into(),
        };
        assert!(matches!(
            source.deck_vocabulary(&missing),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn rejects_bad_export() {
        assert!(FileSource::from_json(r#"{"decks": [{"id": "x"}]}"#).is_err());
        assert!(FileSource::from_json(r#"{"decks": [], "spellings": {"ten": "x"}}"#).is_err());
    }

    #[test]
    fn import_into_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let store = CacheStore::new(FileStore::new(dir.path().join("store")));
        let engine = OccurrenceEngine::new(store);
        let mut source = FileSource::open(&path).unwrap();
        let summary = engine.refresh(&mut source, |_| {}).unwrap();
        assert_eq!(summary.decks, 2);
        assert_eq!(summary.dropped, 1);

        let decks = engine.trimmed_decks(&TargetVids::One(1_358_280));
        assert_eq!(decks[0].entries.len(), 2);
        assert_eq!(decks[1].entries.len(), 1);
    }
}
