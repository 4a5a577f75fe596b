//! Criterion benchmarks for the ranking pass.
//!
//! Run with: cargo bench -p shelter-core --bench benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shelter_core::rank::{rank, RankOptions};
use shelter_core::{
    AcceptanceTag, CapabilityMap, DistanceModel, GeoPoint, MergedRecord, Provenance, Site,
};
use std::hint::black_box;

fn scatter(n: usize) -> Vec<MergedRecord> {
    (0..n)
        .map(|i| {
            let j = (i * 7919) % 10_000;
            MergedRecord {
                ordinal: i,
                key: Some(i.to_string()),
                site: Some(Site {
                    name: format!("Shelter {i}"),
                    address: String::new(),
                    location: GeoPoint::new_unchecked(
                        33.6 + j as f64 * 5e-5,
                        132.5 + ((j * 31) % 10_000) as f64 * 5e-5,
                    ),
                    acceptance: AcceptanceTag::Unspecified,
                }),
                capabilities: CapabilityMap::new(),
                provenance: Provenance::single("facilities"),
            }
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_top5");
    let origin = GeoPoint::new_unchecked(33.8117, 132.7789);

    for n in [1_000usize, 20_000] {
        let records = scatter(n);
        let refs: Vec<&MergedRecord> = records.iter().collect();

        for (label, options) in [
            (
                "sequential",
                RankOptions {
                    parallel_threshold: usize::MAX,
                    ..RankOptions::default()
                },
            ),
            ("auto", RankOptions::default()),
            (
                "haversine",
                RankOptions {
                    model: DistanceModel::Haversine,
                    ..RankOptions::default()
                },
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(label, n), &refs, |b, refs| {
                b.iter(|| black_box(rank(black_box(refs), origin, 5, &options)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
