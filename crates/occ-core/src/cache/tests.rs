use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use time::macros::datetime;

use super::*;
use crate::ids::{parse_vid_text, vid_text};

fn w(vid: u64, sid: u64, occurrences: u32) -> WordOccurrence {
    WordOccurrence {
        vid,
        sid,
        occurrences,
    }
}

fn deck(id: i64, name: &str, vocabulary: Vec<WordOccurrence>) -> SourceDeck {
    SourceDeck {
        id,
        name: name.to_string(),
        vocabulary,
    }
}

fn spellings(pairs: &[(u64, &str)]) -> HashMap<u64, String> {
    pairs.iter().map(|&(sid, s)| (sid, s.to_string())).collect()
}

fn sample() -> CacheSnapshot {
    let decks = vec![
        deck(7, "Deck A", vec![w(1, 10, 5), w(1, 11, 1), w(2, 20, 1)]),
        deck(9, "Deck B", vec![w(1, 10, 2), w(3, 99, 4)]),
    ];
    let spellings = spellings(&[(10, "食べる"), (11, "喰べる"), (20, "飲む")]);
    encode_at(&decks, &spellings, datetime!(2026-10-17 09:00 UTC))
}

#[test]
fn wire_format() {
    let json = sample().to_json().unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"format":"2f0169ea-593c-423f-8496-255f98f73df5","#,
            r#""decks":[{"name":"Deck A","id":7,"vocabulary":[[0,5],1,2]},"#,
            r#"{"name":"Deck B","id":9,"vocabulary":[[0,2]]}],"#,
            r#""words":["1","食べる","1","喰べる","2","飲む"],"#,
            r#""lastFetched":"2026-10-17T09:00:00Z"}"#
        )
    );
}

#[test]
fn slots_are_first_seen_and_deduplicated() {
    let snapshot = sample();
    let slots: Vec<(&str, &str)> = snapshot
        .slots()
        .iter()
        .map(|e| (e.vid_text.as_str(), e.spelling.as_str()))
        .collect();
    assert_eq!(slots, vec![("1", "食べる"), ("1", "喰べる"), ("2", "飲む")]);
    assert_eq!(snapshot.decks()[1].records, vec![OccurrenceRecord::Explicit(0, 2)]);
}

#[test]
fn unresolved_spellings_are_dropped() {
    let snapshot = sample();
    // Deck B's (3, 99) has no spelling.
    assert_eq!(snapshot.decks()[1].records.len(), 1);
    assert_eq!(snapshot.record_count(), 4);
}

#[test]
fn zero_counts_are_dropped() {
    let snapshot = encode_at(
        &[deck(1, "A", vec![w(1, 10, 0), w(1, 10, 3)])],
        &spellings(&[(10, "x")]),
        time::OffsetDateTime::UNIX_EPOCH,
    );
    assert_eq!(snapshot.decks()[0].records, vec![OccurrenceRecord::Explicit(0, 3)]);
}

#[test]
fn same_text_under_two_spelling_ids_shares_a_slot() {
    let snapshot = encode_at(
        &[deck(1, "A", vec![w(1, 10, 1), w(1, 12, 2), w(2, 10, 1)])],
        &spellings(&[(10, "見る"), (12, "見る")]),
        time::OffsetDateTime::UNIX_EPOCH,
    );
    assert_eq!(snapshot.slots().len(), 2);
    assert_eq!(
        snapshot.decks()[0].records,
        vec![
            OccurrenceRecord::Implicit(0),
            OccurrenceRecord::Explicit(0, 2),
            OccurrenceRecord::Implicit(1)
        ]
    );
}

#[test]
fn decode_roundtrip() {
    let snapshot = sample();
    let json = snapshot.to_json().unwrap();
    assert_eq!(decode(Some(&json)).unwrap(), snapshot);
}

#[test]
fn decode_missing() {
    assert!(matches!(decode(None), Err(CacheError::Missing)));
}

#[test]
fn decode_rejects_unknown_tags() {
    // The rest of the document is not looked at.
    let err = decode(Some(r#"{"format":"v2","decks":"whatever"}"#)).unwrap_err();
    assert!(matches!(err, CacheError::UnknownFormat(Some(ref t)) if t == "v2"));

    let err = decode(Some(r#"{"decks":[],"words":[]}"#)).unwrap_err();
    assert!(matches!(err, CacheError::UnknownFormat(None)));

    let err = decode(Some(r#"{"format":null}"#)).unwrap_err();
    assert!(matches!(err, CacheError::UnknownFormat(None)));
}

#[test]
fn decode_rejects_garbage() {
    for raw in ["", "not json", "null", "[1,2]", r#"{"format":5}"#] {
        assert!(
            matches!(decode(Some(raw)), Err(CacheError::Malformed(_))),
            "{raw:?}"
        );
    }
}

fn v1(decks: &str, words: &str) -> String {
    format!(r#"{{"format":"{FORMAT_1_TAG}","decks":{decks},"words":{words},"lastFetched":"x"}}"#)
}

#[test]
fn decode_rejects_odd_slot_table() {
    let raw = v1("[]", r#"["1","a","2"]"#);
    assert!(matches!(decode(Some(&raw)), Err(CacheError::Malformed(_))));
}

#[test]
fn decode_rejects_dangling_slot() {
    let raw = v1(r#"[{"name":"A","id":1,"vocabulary":[0,[1,3]]}]"#, r#"["1","a"]"#);
    let err = decode(Some(&raw)).unwrap_err();
    assert!(err.to_string().contains("slot 1"), "{err}");
}

#[test]
fn zero_count_records_are_skipped() {
    let raw = v1(
        r#"[{"name":"A","id":1,"vocabulary":[[0,0],[1,2]]}]"#,
        r#"["1","a","1","b"]"#,
    );
    let decks = decode_and_trim(Some(&raw), &TargetVids::One(1)).unwrap();
    assert_eq!(decks.len(), 1);
    let spellings: Vec<&str> = decks[0].entries.iter().map(|e| e.spelling.as_str()).collect();
    assert_eq!(spellings, vec!["b"]);
}

#[test]
fn decode_accepts_tag_after_fields() {
    let raw = format!(
        r#"{{"lastFetched":"x","decks":[{{"name":"A","id":1,"vocabulary":[0]}}],"words":["1","a"],"extra":{{"k":[1]}},"format":"{FORMAT_1_TAG}"}}"#
    );
    let snapshot = decode(Some(&raw)).unwrap();
    assert_eq!(snapshot.format(), FormatVersion::V1);
    assert_eq!(snapshot.fetched_at(), "x");
    assert_eq!(snapshot.record_count(), 1);

    let err = decode(Some(r#"{"decks":"whatever","format":"v2"}"#)).unwrap_err();
    assert!(matches!(err, CacheError::UnknownFormat(Some(ref t)) if t == "v2"));
}

#[test]
fn foreign_tag_stops_the_parse() {
    // Nothing after the tag is read, so the broken tail is never seen.
    let err = decode(Some(r#"{"format":"v2","decks":[[[[ not json"#)).unwrap_err();
    assert!(matches!(err, CacheError::UnknownFormat(Some(ref t)) if t == "v2"));
}

#[test]
fn decode_requires_every_field() {
    let raw = format!(r#"{{"format":"{FORMAT_1_TAG}","decks":[]}}"#);
    let err = decode(Some(&raw)).unwrap_err();
    assert!(matches!(err, CacheError::Malformed(ref m) if m.contains("words")), "{err}");

    let raw = format!("{} trailing", v1("[]", "[]"));
    assert!(matches!(decode(Some(&raw)), Err(CacheError::Malformed(_))));
}

#[test]
fn shorthand_and_explicit_single_decode_alike() {
    let raw = v1(
        r#"[{"name":"A","id":1,"vocabulary":[0]},{"name":"B","id":2,"vocabulary":[[0,1]]}]"#,
        r#"["1","a"]"#,
    );
    let decks = decode_and_trim(Some(&raw), &TargetVids::One(1)).unwrap();
    assert_eq!(decks[0].entries, decks[1].entries);
    assert_eq!(decks[0].entries[0].occurrences, 1);
    assert_eq!(OccurrenceRecord::Implicit(4).parts(), OccurrenceRecord::Explicit(4, 1).parts());
}

#[test]
fn record_constructor_uses_shorthand() {
    assert_eq!(OccurrenceRecord::new(3, 1), OccurrenceRecord::Implicit(3));
    assert_eq!(OccurrenceRecord::new(3, 2), OccurrenceRecord::Explicit(3, 2));
    assert_eq!(OccurrenceRecord::new(3, 2).count(), 2);
    assert_eq!(OccurrenceRecord::new(3, 2).slot(), 3);
}

#[test]
fn trim_single_target() {
    let decks = trim_decks(&sample(), &TargetVids::One(1));
    assert_eq!(decks.len(), 2);
    assert_eq!(decks[0].id, 7);
    assert_eq!(decks[0].name, "Deck A");
    let entries: Vec<(&str, u32)> = decks[0]
        .entries
        .iter()
        .map(|e| (e.spelling.as_str(), e.occurrences))
        .collect();
    assert_eq!(entries, vec![("食べる", 5), ("喰べる", 1)]);
    assert_eq!(decks[1].entries.len(), 1);
    assert_eq!(decks[0].mapped_vid(1), Some("1"));
    assert_eq!(decks[0].mapped_vid(2), None);
}

#[test]
fn trim_target_set() {
    let targets: TargetVids = [2, 3, 500].into_iter().collect();
    let decks = trim_decks(&sample(), &targets);
    assert_eq!(decks[0].entries.len(), 1);
    assert_eq!(decks[0].entries[0].spelling, "飲む");
    assert!(decks[1].is_empty());
    // Every target is mapped, found or not.
    assert_eq!(decks[1].mapped_vid(500), Some(vid_text(500).as_str()));
    assert!(Arc::ptr_eq(&decks[0].vid_map, &decks[1].vid_map));
}

#[test]
fn target_vids_sizes() {
    let one = TargetVids::from(5);
    assert_eq!(one, TargetVids::One(5));
    assert_eq!(one.len(), 1);
    let two: TargetVids = [5, 6, 5].into_iter().collect();
    assert_eq!(two.len(), 2);
    let many: TargetVids = Vec::<u64>::new().into_iter().collect();
    assert!(many.is_empty());
}

fn arb_decks() -> impl Strategy<Value = Vec<SourceDeck>> {
    let word = (0u64..40, 0u64..12, 1u32..20).prop_map(|(vid, s, n)| w(vid, vid * 100 + s, n));
    prop::collection::vec(prop::collection::vec(word, 0..30), 0..8).prop_map(|decks| {
        decks
            .into_iter()
            .enumerate()
            .map(|(i, vocabulary)| deck(i as i64, &format!("deck {i}"), vocabulary))
            .collect()
    })
}

/// Resolve every spelling id except those ending in 7.
fn arb_resolver(decks: &[SourceDeck]) -> HashMap<u64, String> {
    decks
        .iter()
        .flat_map(|d| &d.vocabulary)
        .filter(|w| w.sid % 10 != 7)
        .map(|w| (w.sid, format!("s{}", w.sid % 100)))
        .collect()
}

proptest! {
    #[test]
    fn slot_table_has_no_duplicates(decks in arb_decks()) {
        let resolver = arb_resolver(&decks);
        let snapshot = encode_at(&decks, &resolver, time::OffsetDateTime::UNIX_EPOCH);
        let mut seen = HashSet::new();
        for entry in snapshot.slots().iter() {
            prop_assert!(seen.insert((entry.vid_text.clone(), entry.spelling.clone())));
        }
        for d in snapshot.decks() {
            for r in &d.records {
                prop_assert!(snapshot.resolve(*r).is_some());
            }
        }
    }

    #[test]
    fn trim_reproduces_source_multisets(decks in arb_decks()) {
        let resolver = arb_resolver(&decks);
        let snapshot = encode_at(&decks, &resolver, time::OffsetDateTime::UNIX_EPOCH);
        let json = snapshot.to_json().unwrap();
        let all: TargetVids = decks.iter().flat_map(|d| &d.vocabulary).map(|w| w.vid).collect();
        let trimmed = decode_and_trim(Some(&json), &all).unwrap();
        prop_assert_eq!(trimmed.len(), decks.len());

        for (source, trimmed) in decks.iter().zip(&trimmed) {
            prop_assert_eq!(source.id, trimmed.id);
            let mut expected: Vec<(u64, String, u32)> = source
                .vocabulary
                .iter()
                .filter_map(|w| resolver.get(&w.sid).map(|s| (w.vid, s.clone(), w.occurrences)))
                .collect();
            let mut actual: Vec<(u64, String, u32)> = trimmed
                .entries
                .iter()
                .map(|e| (parse_vid_text(&e.vid_text).unwrap(), e.spelling.clone(), e.occurrences))
                .collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(expected, actual);
        }
    }
}
