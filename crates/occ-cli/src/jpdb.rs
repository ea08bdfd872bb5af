//! jpdb.io API client.
//!
//! Every endpoint is a JSON `POST` authorized with the user's API key. The
//! response parsers are split from the transport so they can be tested on
//! canned bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use occ_core::cache::WordOccurrence;
use occ_core::ids::{DeckId, SpellingId, VocabId, WordIdentity};
use occ_core::refresh::{DeckHeader, DeckSource, SourceError};

const API_BASE: &str = "https://jpdb.io/api/v1/";

pub struct JpdbClient {
    api_key: String,
}

impl JpdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<String, SourceError> {
        let url = format!("{API_BASE}{endpoint}");
        debug!(endpoint, "jpdb request");
        ureq::post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| SourceError::Http(format!("{endpoint}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| SourceError::Http(format!("{endpoint}: {e}")))
    }
}

impl DeckSource for JpdbClient {
    fn list_decks(&mut self) -> Result<Vec<DeckHeader>, SourceError> {
        let body = self.post("list-user-decks", json!({ "fields": ["name", "id"] }))?;
        parse_deck_list(&body)
    }

    fn deck_vocabulary(&mut self, deck: &DeckHeader) -> Result<Vec<WordOccurrence>, SourceError> {
        let body = self.post(
            "deck/list-vocabulary",
            json!({ "id": deck.id, "fetch_occurences": true }),
        )?;
        parse_deck_vocabulary(&body)
    }

    fn lookup_spellings(
        &mut self,
        words: &[WordIdentity],
    ) -> Result<HashMap<SpellingId, String>, SourceError> {
        if words.is_empty() {
            return Ok(HashMap::new());
        }
        let list: Vec<[u64; 2]> = words.iter().map(|w| [w.vid, w.sid]).collect();
        let body = self.post(
            "lookup-vocabulary",
            json!({ "list": list, "fields": ["spelling"] }),
        )?;
        parse_spellings(&body, words)
    }
}

#[derive(Deserialize)]
struct DeckListResponse {
    decks: Vec<(String, DeckId)>,
}

#[derive(Deserialize)]
struct VocabularyResponse {
    vocabulary: Vec<(VocabId, SpellingId)>,
    // Upstream spelling.
    occurences: Vec<u32>,
}

#[derive(Deserialize)]
struct LookupResponse {
    vocabulary_info: Vec<Option<(Option<String>,)>>,
}

fn parse<'a, T: Deserialize<'a>>(what: &str, body: &'a str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(format!("{what}: {e}")))
}

/// `{"decks": [[name, id], ...]}`
pub fn parse_deck_list(body: &str) -> Result<Vec<DeckHeader>, SourceError> {
    let response: DeckListResponse = parse("deck list", body)?;
    Ok(response
        .decks
        .into_iter()
        .map(|(name, id)| DeckHeader { id, name })
        .collect())
}

/// `{"vocabulary": [[vid, sid], ...], "occurences": [n, ...]}`, paired by index.
pub fn parse_deck_vocabulary(body: &str) -> Result<Vec<WordOccurrence>, SourceError> {
    let response: VocabularyResponse = parse("deck vocabulary", body)?;
    if response.vocabulary.len() != response.occurences.len() {
        return Err(SourceError::Parse(format!(
            "deck vocabulary: {} words but {} occurrence counts",
            response.vocabulary.len(),
            response.occurences.len()
        )));
    }
    Ok(response
        .vocabulary
        .into_iter()
        .zip(response.occurences)
        .map(|((vid, sid), occurrences)| WordOccurrence {
            vid,
            sid,
            occurrences,
        })
        .collect())
}

/// `{"vocabulary_info": [[spelling] | null, ...]}`, in request order.
/// Unknown words (`null`) are left out of the map.
pub fn parse_spellings(
    body: &str,
    words: &[WordIdentity],
) -> Result<HashMap<SpellingId, String>, SourceError> {
    let response: LookupResponse = parse("spellings", body)?;
    if response.vocabulary_info.len() != words.len() {
        return Err(SourceError::Parse(format!(
            "spellings: asked for {} words, got {}",
            words.len(),
            response.vocabulary_info.len()
        )));
    }
    Ok(words
        .iter()
        .zip(response.vocabulary_info)
        .filter_map(|(word, info)| Some((word.sid, info?.0?)))
        .collect())
}
