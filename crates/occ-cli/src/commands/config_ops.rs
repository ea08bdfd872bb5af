use std::path::Path;

use clap::ValueEnum;
use occ_core::config::{Config, TargetDecks};

use super::open_engine;

/// Display toggles settable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayOption {
    /// Counts next to each word of a deck's vocabulary list
    DeckPage,
    /// Table on the vocabulary details page
    VocabularyPage,
    /// Table on the vocabulary "used in" page
    UsedInPage,
    /// Counts in "used in", "composed of" and kanji lists
    UsedInLists,
}

impl DisplayOption {
    pub fn apply(self, config: &mut Config, value: bool) {
        let slot = match self {
            Self::DeckPage => &mut config.display_on_deck_page,
            Self::VocabularyPage => &mut config.display_on_vocabulary_page,
            Self::UsedInPage => &mut config.display_on_vocabulary_used_in_page,
            Self::UsedInLists => &mut config.display_in_used_in_lists,
        };
        *slot = value;
    }
}

fn print_config(config: &Config) {
    let json = die!(serde_json::to_string_pretty(config), "Error: {}");
    println!("{json}");
}

pub fn show(store_dir: &Path) {
    let loaded = open_engine(store_dir).config();
    for issue in &loaded.issues {
        eprintln!("Warning: {issue}");
    }
    print_config(&loaded.config);
}

pub fn set(store_dir: &Path, option: DisplayOption, value: bool) {
    let engine = open_engine(store_dir);
    let mut config = engine.config().config;
    option.apply(&mut config, value);
    die!(engine.save_config(&config), "Error saving config: {}");
    print_config(&config);
}

/// `text` is `all` or deck ids separated by `,` or `;`.
pub fn decks(store_dir: &Path, text: &str) {
    let engine = open_engine(store_dir);
    let mut config = engine.config().config;
    if let Some(issue) = config.set_target_decks_from_text(text) {
        eprintln!("Warning: {issue}");
    }
    die!(engine.save_config(&config), "Error saving config: {}");
    match &config.target_decks {
        TargetDecks::All => println!("Counting all decks"),
        TargetDecks::Only(ids) => {
            let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
            println!("Counting decks {}", ids.join(", "));
        }
    }
}
