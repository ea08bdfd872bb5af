//! Typed configuration read from the `vv_config` store entry.
//!
//! Parsing never fails: anything unusable falls back to its default and is
//! reported as a [`ConfigIssue`] (also logged at `warn`), so callers can tell
//! a fallback happened.

use std::collections::HashSet;

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::ids::DeckId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("damaged config, using defaults: {0}")]
    Malformed(String),

    #[error("config field {field} must be {expected}, using the default")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid targetDecks value {0}, counting all decks")]
    InvalidDeckFilter(String),
}

/// Which decks are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetDecks {
    #[default]
    All,
    Only(Vec<DeckId>),
}

impl TargetDecks {
    /// Parse the settings form input: `all`, or deck ids separated by `,` or `;`.
    ///
    /// Any token that is not an integer rejects the whole list.
    pub fn parse_list(text: &str) -> Result<Self, ConfigIssue> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        text.split([',', ';'])
            .map(|token| token.trim().parse::<DeckId>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Only)
            .map_err(|_| ConfigIssue::InvalidDeckFilter(format!("{text:?}")))
    }

    fn from_value(value: &Value) -> Result<Self, ConfigIssue> {
        match value {
            Value::String(s) if s == "all" => Ok(Self::All),
            Value::Array(items) => items
                .iter()
                .map(Value::as_i64)
                .collect::<Option<Vec<_>>>()
                .map(Self::Only)
                .ok_or_else(|| ConfigIssue::InvalidDeckFilter(value.to_string())),
            other => Err(ConfigIssue::InvalidDeckFilter(other.to_string())),
        }
    }
}

impl Serialize for TargetDecks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Only(ids) => {
                let mut seq = serializer.serialize_seq(Some(ids.len()))?;
                for id in ids {
                    seq.serialize_element(id)?;
                }
                seq.end()
            }
        }
    }
}

/// Deck predicate derived from [`TargetDecks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeckFilter {
    #[default]
    All,
    Only(HashSet<DeckId>),
}

impl DeckFilter {
    pub fn allows(&self, deck: DeckId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&deck),
        }
    }
}

impl From<&TargetDecks> for DeckFilter {
    fn from(targets: &TargetDecks) -> Self {
        match targets {
            TargetDecks::All => Self::All,
            TargetDecks::Only(ids) => Self::Only(ids.iter().copied().collect()),
        }
    }
}

/// Kind of page a query is made for; selects which display option applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    DeckList,
    VocabularyDetails,
    VocabularyUsedIn,
    Kanji,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub display_on_deck_page: bool,
    pub display_on_vocabulary_page: bool,
    pub display_on_vocabulary_used_in_page: bool,
    pub display_in_used_in_lists: bool,
    pub target_decks: TargetDecks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_on_deck_page: true,
            display_on_vocabulary_page: true,
            display_on_vocabulary_used_in_page: false,
            display_in_used_in_lists: true,
            target_decks: TargetDecks::All,
        }
    }
}

/// A config together with every fallback taken while reading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: Config,
    pub issues: Vec<ConfigIssue>,
}

impl LoadedConfig {
    fn defaults_because(issue: ConfigIssue) -> Self {
        warn!(%issue, "config fallback");
        Self {
            config: Config::default(),
            issues: vec![issue],
        }
    }
}

impl Config {
    /// Read a stored config. Missing and `null` fields take their defaults.
    pub fn from_json(text: &str) -> LoadedConfig {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => return LoadedConfig::defaults_because(ConfigIssue::Malformed(e.to_string())),
        };
        let map = match value {
            Value::Object(map) => map,
            other => {
                return LoadedConfig::defaults_because(ConfigIssue::Malformed(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        let mut config = Config::default();
        let mut issues = Vec::new();
        let bools: [(&'static str, &mut bool); 4] = [
            ("displayOnDeckPage", &mut config.display_on_deck_page),
            ("displayOnVocabularyPage", &mut config.display_on_vocabulary_page),
            (
                "displayOnVocabularyUsedInPage",
                &mut config.display_on_vocabulary_used_in_page,
            ),
            ("displayInUsedInLists", &mut config.display_in_used_in_lists),
        ];
        for (field, slot) in bools {
            read_bool(&map, field, slot, &mut issues);
        }
        if let Some(value) = present(&map, "targetDecks") {
            match TargetDecks::from_value(value) {
                Ok(targets) => config.target_decks = targets,
                Err(issue) => issues.push(issue),
            }
        }

        for issue in &issues {
            warn!(%issue, "config fallback");
        }
        LoadedConfig { config, issues }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Replace the deck list from settings form text, falling back to all
    /// decks when the text does not parse.
    pub fn set_target_decks_from_text(&mut self, text: &str) -> Option<ConfigIssue> {
        match TargetDecks::parse_list(text) {
            Ok(targets) => {
                self.target_decks = targets;
                None
            }
            Err(issue) => {
                warn!(%issue, "config fallback");
                self.target_decks = TargetDecks::All;
                Some(issue)
            }
        }
    }

    pub fn deck_filter(&self) -> DeckFilter {
        DeckFilter::from(&self.target_decks)
    }

    /// Whether the per-deck occurrence table is shown on `page`.
    pub fn shows_table_on(&self, page: Page) -> bool {
        match page {
            Page::VocabularyDetails => self.display_on_vocabulary_page,
            Page::VocabularyUsedIn => self.display_on_vocabulary_used_in_page,
            Page::DeckList | Page::Kanji => false,
        }
    }

    /// Whether per-word counts are shown next to listed words on `page`.
    pub fn shows_counts_on(&self, page: Page) -> bool {
        match page {
            Page::DeckList => self.display_on_deck_page,
            Page::VocabularyDetails | Page::VocabularyUsedIn | Page::Kanji => {
                self.display_in_used_in_lists
            }
        }
    }
}

fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn read_bool(
    map: &Map<String, Value>,
    field: &'static str,
    slot: &mut bool,
    issues: &mut Vec<ConfigIssue>,
) {
    match present(map, field) {
        None => {}
        Some(Value::Bool(b)) => *slot = *b,
        Some(_) => issues.push(ConfigIssue::FieldType {
            field,
            expected: "a boolean",
        }),
    }
}
