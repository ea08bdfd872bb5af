use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use occ_cli::commands::config_ops::DisplayOption;
use occ_cli::commands::{self, cache_ops, config_ops, query_ops};
use occ_cli::logging::init_tracing;
use occ_core::aggregate::WordRef;
use occ_core::Page;

#[derive(Parser)]
#[command(name = "occtool", about = "jpdb deck occurrence cache")]
struct Cli {
    /// Cache directory (default: ~/.local/share/occtool)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum VocabularyPage {
    Details,
    UsedIn,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListPage {
    Deck,
    Kanji,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every deck from jpdb.io and rebuild the cache
    Fetch {
        /// jpdb.io API key
        #[arg(long, env = "JPDB_API_KEY")]
        api_key: String,
    },
    /// Rebuild the cache from a JSON export
    Import {
        /// Export file
        file: PathBuf,
    },
    /// Show cache format, fetch time and size
    Info,
    /// Per-deck occurrence table for a word
    Show {
        /// Vocabulary id
        vid: u64,
        /// Page the table is shown on
        #[arg(long, value_enum, default_value = "details")]
        page: VocabularyPage,
        /// Words listed on the page, as vid/spelling
        #[arg(long, value_parser = query_ops::parse_word_ref, num_args = 1..)]
        listed: Vec<WordRef>,
    },
    /// Occurrence counts for words of a list
    Counts {
        /// Words as vid/spelling
        #[arg(required = true, value_parser = query_ops::parse_word_ref)]
        words: Vec<WordRef>,
        /// Page the list is on
        #[arg(long, value_enum, default_value = "deck")]
        page: ListPage,
    },
    /// Show or edit display settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Turn a display option on or off
    Set {
        #[arg(value_enum)]
        option: DisplayOption,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Decks to count: `all`, or ids separated by `,` or `;`
    Decks { list: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let store = cli
        .store
        .unwrap_or_else(|| PathBuf::from(commands::default_store_dir()));

    match cli.command {
        Command::Fetch { api_key } => cache_ops::fetch(&store, &api_key),
        Command::Import { file } => cache_ops::import(&store, &file),
        Command::Info => cache_ops::info(&store),
        Command::Show { vid, page, listed } => {
            let page = match page {
                VocabularyPage::Details => Page::VocabularyDetails,
                VocabularyPage::UsedIn => Page::VocabularyUsedIn,
            };
            query_ops::show(&store, vid, page, &listed)
        }
        Command::Counts { words, page } => {
            let page = match page {
                ListPage::Deck => Page::DeckList,
                ListPage::Kanji => Page::Kanji,
            };
            query_ops::counts(&store, &words, page)
        }
        Command::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => config_ops::show(&store),
            ConfigAction::Set { option, value } => config_ops::set(&store, option, value),
            ConfigAction::Decks { list } => config_ops::decks(&store, &list),
        },
    }
}
