use std::path::Path;

use occ_core::aggregate::WordRef;
use occ_core::ids::VocabId;
use occ_core::Page;

use super::open_engine;
use crate::render::{render_counts, render_table};

/// Parse `vid/spelling`, the tail of a jpdb vocabulary URL.
pub fn parse_word_ref(text: &str) -> Result<WordRef, String> {
    let (vid, spelling) = text
        .split_once('/')
        .ok_or_else(|| format!("expected vid/spelling, got {text:?}"))?;
    let vid: VocabId = vid
        .trim()
        .parse()
        .map_err(|_| format!("invalid vocabulary id {vid:?}"))?;
    let spelling = spelling.trim();
    if spelling.is_empty() {
        return Err(format!("missing spelling in {text:?}"));
    }
    Ok(WordRef::new(vid, spelling))
}

pub fn show(store_dir: &Path, vid: VocabId, page: Page, listed: &[WordRef]) {
    let engine = open_engine(store_dir);
    let Some(view) = engine.vocabulary_view(page, vid, listed) else {
        println!("Nothing to show: the table is turned off for this page or there is no usable cache");
        return;
    };
    print!("{}", render_table(&view.table));
    if !view.listed.is_empty() {
        println!();
        print!("{}", render_counts(&view.listed));
    }
}

pub fn counts(store_dir: &Path, items: &[WordRef], page: Page) {
    let engine = open_engine(store_dir);
    let Some(counts) = engine.list_counts(page, items) else {
        println!("Nothing to show: counts are turned off for this page or there is no usable cache");
        return;
    };
    let rows: Vec<_> = items.iter().cloned().zip(counts).collect();
    print!("{}", render_counts(&rows));
}
