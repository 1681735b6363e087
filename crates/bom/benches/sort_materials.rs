use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rackquote_bom::{BomLine, aggregate_lines, sort_materials};
use rackquote_core::RackFamily;

const NAMES: [&str; 10] = [
    "Post(H4500)",
    "Load Beam(2080)",
    "Tie Beam(1000)",
    "Shelf(900)",
    "Safety Pin(pallet)",
    "Diagonal Bracing",
    "Horizontal Brace",
    "Anchor Bolt",
    "Bracing Bolt",
    "Casters",
];

/// Deterministic pseudo-random material list.
fn material_list(len: usize) -> Vec<BomLine> {
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let family = RackFamily::ALL[(seed % 6) as usize];
            let name = NAMES[((seed >> 8) % NAMES.len() as u64) as usize];
            BomLine::computed(family, name, format!("{}", (seed >> 16) % 3000), seed % 97 + 1)
        })
        .collect()
}

fn bench_sort_materials(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_materials");

    for len in [100usize, 1_000, 10_000].iter() {
        let lines = material_list(*len);
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &lines, |b, lines| {
            b.iter(|| {
                let mut work = lines.clone();
                sort_materials(black_box(&mut work));
                work
            });
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_lines");

    for len in [100usize, 1_000, 10_000].iter() {
        let lines = material_list(*len);
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &lines, |b, lines| {
            b.iter(|| aggregate_lines(black_box(lines.iter())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort_materials, bench_aggregate);
criterion_main!(benches);
