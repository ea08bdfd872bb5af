use std::path::Path;

use occ_core::cache::CacheError;
use occ_core::refresh::{DeckSource, RefreshProgress, RefreshSummary};

use super::open_engine;
use crate::import::FileSource;
use crate::jpdb::JpdbClient;

fn print_progress(progress: RefreshProgress<'_>) {
    match progress {
        RefreshProgress::ListingDecks => eprintln!("Fetching deck list..."),
        RefreshProgress::Deck { index, total, name } => {
            eprintln!("  [{index}/{total}] {name}")
        }
        RefreshProgress::Spellings { words } => eprintln!("Fetching spellings for {words} words..."),
        RefreshProgress::Compressing => eprintln!("Compressing..."),
        RefreshProgress::Done { fetched_at } => eprintln!("Done at {fetched_at}"),
    }
}

fn print_summary(summary: &RefreshSummary) {
    println!("Decks:    {}", summary.decks);
    println!("Words:    {}", summary.slots);
    println!("Records:  {}", summary.records);
    if summary.dropped > 0 {
        println!("Dropped:  {} (no spelling)", summary.dropped);
    }
}

fn refresh_from(store_dir: &Path, source: &mut dyn DeckSource) {
    let engine = open_engine(store_dir);
    let summary = die!(
        engine.refresh(source, print_progress),
        "Error refreshing cache: {}"
    );
    print_summary(&summary);
}

pub fn fetch(store_dir: &Path, api_key: &str) {
    let mut client = JpdbClient::new(api_key);
    refresh_from(store_dir, &mut client);
}

pub fn import(store_dir: &Path, file: &Path) {
    let mut source = die!(
        FileSource::open(file),
        "Error reading {}: {}",
        file.display()
    );
    refresh_from(store_dir, &mut source);
}

pub fn info(store_dir: &Path) {
    let engine = open_engine(store_dir);
    let snapshot = match engine.store().snapshot() {
        Ok(s) => s,
        Err(CacheError::Missing) => {
            println!("No cache in {}; run `occtool fetch` first", store_dir.display());
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let size = die!(
        engine.store().raw_snapshot_len(),
        "Error reading cache: {}"
    )
    .unwrap_or(0);

    println!("Store:    {}", store_dir.display());
    println!("Format:   {}", snapshot.format().tag());
    println!("Fetched:  {}", snapshot.fetched_at());
    println!("Decks:    {}", snapshot.decks().len());
    println!("Words:    {}", snapshot.slots().len());
    println!("Records:  {}", snapshot.record_count());
    println!("Size:     {:.1} KB", size as f64 / 1024.0);
}
