use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use rackquote_core::{ExpectedVersion, PartId, RackFamily};
use rackquote_infra::FileOverrideRepository;
use rackquote_pricing::{InMemoryOverrideRepository, OverrideRepository, PartDescriptor, PriceOverride};

fn part(i: usize) -> PartId {
    PartDescriptor::new(RackFamily::Pallet, format!("Load Beam({})", 1000 + i), "").part_id()
}

fn write_overrides<R: OverrideRepository>(repo: &R, count: usize) {
    for i in 0..count {
        let record = PriceOverride::new(1000 + i as u64, "bench", Utc::now());
        repo.put(&part(i), record, ExpectedVersion::Any).unwrap();
    }
}

fn bench_override_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("override_writes");

    for count in [10usize, 100] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("in_memory", count), &count, |b, &count| {
            b.iter(|| {
                let repo = InMemoryOverrideRepository::new();
                write_overrides(&repo, black_box(count));
            });
        });

        group.bench_with_input(BenchmarkId::new("file_backed", count), &count, |b, &count| {
            let path = std::env::temp_dir().join(format!("rackquote-bench-{}.json", uuid::Uuid::now_v7()));
            b.iter(|| {
                let repo = FileOverrideRepository::open(&path).unwrap();
                write_overrides(&repo, black_box(count));
            });
            let _ = std::fs::remove_file(&path);
        });
    }

    group.finish();
}

fn bench_reopen(c: &mut Criterion) {
    let path = std::env::temp_dir().join(format!("rackquote-bench-{}.json", uuid::Uuid::now_v7()));
    let repo = FileOverrideRepository::open(&path).unwrap();
    write_overrides(&repo, 500);

    c.bench_function("reopen_500_overrides", |b| {
        b.iter(|| {
            let reopened = FileOverrideRepository::open(black_box(&path)).unwrap();
            black_box(reopened.list().unwrap().len())
        });
    });
    let _ = std::fs::remove_file(&path);
}

criterion_group!(benches, bench_override_writes, bench_reopen);
criterion_main!(benches);
