use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use confboard::{
    core::store::EntryStore,
    entry::{EntryForm, EntryPatch, LeaderboardEntry},
    export::export_csv,
    rank::{filter, rank},
    settings::ConferenceSettings,
};

fn board(n: u64) -> Vec<LeaderboardEntry> {
    let mut store = EntryStore::new();
    for i in 0..n {
        let _ = store
            .add(&EntryForm::new(
                format!("Player {i}"),
                format!("Org {}", i % 37),
                (i * 7919 % 1000).to_string(),
                (i % 3600).to_string(),
            ))
            .expect("add");
    }
    store.export_snapshot()
}

fn bench_adds(c: &mut Criterion) {
    c.bench_function("store_add_10k", |b| {
        b.iter(|| board(10_000));
    });
}

fn bench_patches(c: &mut Criterion) {
    let entries = board(5_000);
    c.bench_function("store_patch_5k", |b| {
        b.iter(|| {
            let mut store = EntryStore::from_entries(entries.clone()).expect("load");
            for (i, e) in entries.iter().enumerate() {
                let _ = store.update(
                    &e.id,
                    EntryPatch {
                        score: Some(i as u64),
                        ..EntryPatch::default()
                    },
                );
            }
        });
    });
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    for n in [100u64, 1_000, 10_000] {
        let entries = board(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &entries, |b, entries| {
            b.iter(|| rank(entries));
        });
    }
    group.finish();
}

fn bench_search_and_csv(c: &mut Criterion) {
    let entries = board(10_000);
    let settings = ConferenceSettings::default();
    c.bench_function("filter_rank_10k", |b| {
        b.iter(|| rank(&filter(&entries, "org 1")));
    });
    c.bench_function("export_csv_10k", |b| {
        b.iter(|| export_csv(&entries, &settings));
    });
}

criterion_group!(benches, bench_adds, bench_patches, bench_rank, bench_search_and_csv);
criterion_main!(benches);
