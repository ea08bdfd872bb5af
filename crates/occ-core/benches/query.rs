use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use occ_core::cache::{encode_at, trim_decks, CacheSnapshot, SourceDeck, TargetVids, WordOccurrence};
use occ_core::config::DeckFilter;
use occ_core::rank::OccurrenceTable;

const DECKS: u64 = 300;
const WORDS_PER_DECK: u64 = 200;
const VOCABULARY: u64 = 20_000;

/// Decks drawing overlapping slices of a shared vocabulary, two spellings
/// for every tenth word.
fn bench_snapshot() -> CacheSnapshot {
    let mut spellings = HashMap::new();
    let decks: Vec<SourceDeck> = (0..DECKS)
        .map(|d| {
            let vocabulary = (0..WORDS_PER_DECK)
                .map(|i| {
                    let vid = 1_000_000 + (d * 37 + i * 101) % VOCABULARY;
                    let sid = vid * 2 + u64::from(vid % 10 == 0 && i % 2 == 0);
                    spellings
                        .entry(sid)
                        .or_insert_with(|| format!("語{vid}-{}", sid % 2));
                    WordOccurrence {
                        vid,
                        sid,
                        occurrences: (i % 7 + 1) as u32,
                    }
                })
                .collect();
            SourceDeck {
                id: d as i64,
                name: format!("deck {d}"),
                vocabulary,
            }
        })
        .collect();
    encode_at(&decks, &spellings, time::OffsetDateTime::UNIX_EPOCH)
}

fn bench_trim(c: &mut Criterion) {
    let snapshot = bench_snapshot();
    let json = snapshot.to_json().unwrap_or_default();
    let mut group = c.benchmark_group("trim");

    group.bench_function("decode", |b| {
        b.iter(|| occ_core::cache::decode(Some(&json)));
    });

    for n in [1u64, 50, 500] {
        let targets: TargetVids = if n == 1 {
            TargetVids::One(1_000_000)
        } else {
            (0..n).map(|i| 1_000_000 + i * 13).collect()
        };
        group.bench_with_input(BenchmarkId::new("targets", n), &targets, |b, targets| {
            b.iter(|| trim_decks(&snapshot, targets));
        });
    }
    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let snapshot = bench_snapshot();
    let decks = trim_decks(&snapshot, &TargetVids::One(1_000_000));
    c.bench_function("table/build", |b| {
        b.iter(|| OccurrenceTable::build(&decks, &DeckFilter::All));
    });
}

criterion_group!(benches, bench_trim, bench_table);
criterion_main!(benches);
