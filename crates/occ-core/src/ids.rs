//! Identifiers shared by the codec, aggregator and ranking passes.
//!
//! Vocabulary ids are stored in the slot table as lowercase base-36 text,
//! which is shorter than decimal for the id ranges the remote service uses.

/// Remote identifier of a word family (all spellings of one lemma).
pub type VocabId = u64;
/// Remote identifier of one written form of a vocabulary entry.
pub type SpellingId = u64;
/// Remote identifier of a deck.
pub type DeckId = i64;
/// Dense index into a snapshot's slot table.
pub type WordSlot = u32;

/// One spelling variant of one vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordIdentity {
    pub vid: VocabId,
    pub sid: SpellingId,
}

impl WordIdentity {
    pub fn new(vid: VocabId, sid: SpellingId) -> Self {
        Self { vid, sid }
    }
}

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render a vocabulary id the way the slot table stores it.
pub fn vid_text(vid: VocabId) -> String {
    if vid == 0 {
        return "0".to_string();
    }
    let mut buf = [0u8; 13]; // u64::MAX is 13 digits in base 36
    let mut pos = buf.len();
    let mut n = vid;
    while n > 0 {
        pos -= 1;
        buf[pos] = DIGITS[(n % 36) as usize];
        n /= 36;
    }
    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Inverse of [`vid_text`]. Returns `None` for anything that is not base-36.
pub fn parse_vid_text(text: &str) -> Option<VocabId> {
    if text.is_empty() || text.starts_with('+') {
        return None;
    }
    VocabId::from_str_radix(text, 36).ok()
}
