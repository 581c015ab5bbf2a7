use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use romcal::bytediff::diff_bytes;
use romcal::tables::TableRegistry;
use romcal::tables::extract;

fn bench_byte_diff(c: &mut Criterion) {
    let size = 512 * 1024;
    let a: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    let mut b = a.clone();
    for i in (0..size).step_by(4096) {
        b[i] = b[i].wrapping_add(1);
    }

    let mut group = c.benchmark_group("byte_diff");
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("identical", |bench| {
        bench.iter(|| diff_bytes(black_box(&a), black_box(&a), true).unwrap())
    });
    group.bench_function("scattered_changes", |bench| {
        bench.iter(|| diff_bytes(black_box(&a), black_box(&b), true).unwrap())
    });
    group.finish();
}

fn bench_table_extract(c: &mut Criterion) {
    let registry = TableRegistry::builtin();
    let def = registry.get("ignition").unwrap();
    let image: Vec<u8> = (0..0x8000).map(|i| (i % 251) as u8).collect();

    c.bench_function("extract_ignition_16x16", |bench| {
        bench.iter(|| extract(black_box(&image), def).unwrap())
    });
}

criterion_group!(benches, bench_byte_diff, bench_table_extract);
criterion_main!(benches);
