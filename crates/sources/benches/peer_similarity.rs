//! Benchmarks for peer similarity
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic peer table: 2,000 users with 60 actions each over a
//! 1,500-item catalog.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{ActionKind, ContentId, PeerAction, UserId};
use sources::similarity::{similarities_from, tally_overlaps, DEFAULT_MIN_SIMILARITY};
use std::collections::HashMap;

const USERS: u64 = 2_000;
const ACTIONS_PER_USER: u64 = 60;
const CATALOG_SIZE: u64 = 1_500;

fn synthetic_table() -> HashMap<ContentId, Vec<PeerAction>> {
    let mut by_content: HashMap<ContentId, Vec<PeerAction>> = HashMap::new();
    for user_id in 1..=USERS {
        for n in 0..ACTIONS_PER_USER {
            let content_id = (user_id * 7 + n * 31) % CATALOG_SIZE;
            let action = match (user_id + n) % 3 {
                0 => ActionKind::Like,
                1 => ActionKind::Pass,
                _ => ActionKind::SaveForLater,
            };
            by_content
                .entry(content_id)
                .or_default()
                .push(PeerAction { user_id, content_id, action });
        }
    }
    by_content
}

fn gather_for(user_id: UserId, table: &HashMap<ContentId, Vec<PeerAction>>) -> (Vec<PeerAction>, Vec<Vec<PeerAction>>) {
    let own: Vec<PeerAction> = table
        .values()
        .flatten()
        .filter(|a| a.user_id == user_id)
        .copied()
        .collect();
    let peers = own
        .iter()
        .map(|a| table.get(&a.content_id).cloned().unwrap_or_default())
        .collect();
    (own, peers)
}

fn bench_tally_overlaps(c: &mut Criterion) {
    let table = synthetic_table();
    let (own, peers) = gather_for(1, &table);

    c.bench_function("tally_overlaps", |b| {
        b.iter(|| {
            let overlaps = tally_overlaps(black_box(1), black_box(&own), black_box(&peers));
            black_box(overlaps)
        })
    });
}

fn bench_similarities_from(c: &mut Criterion) {
    let table = synthetic_table();
    let (own, peers) = gather_for(1, &table);
    let overlaps = tally_overlaps(1, &own, &peers);

    c.bench_function("similarities_from", |b| {
        b.iter(|| {
            let map = similarities_from(black_box(&overlaps), black_box(DEFAULT_MIN_SIMILARITY));
            black_box(map)
        })
    });
}

criterion_group!(benches, bench_tally_overlaps, bench_similarities_from);
criterion_main!(benches);
