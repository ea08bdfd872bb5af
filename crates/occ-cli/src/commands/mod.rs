//! `occtool` subcommands. Each one prints its result to stdout and exits
//! with status 1 on error.

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod cache_ops;
pub mod config_ops;
pub mod query_ops;

use std::path::Path;

use occ_core::{CacheStore, FileStore, OccurrenceEngine};

pub fn default_store_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    format!("{home}/.local/share/occtool")
}

pub(crate) fn open_engine(store_dir: &Path) -> OccurrenceEngine<FileStore> {
    OccurrenceEngine::new(CacheStore::new(FileStore::new(store_dir)))
}
