use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use listdelta_diff::{diff, staged_diff, staged_sectioned_diff};
use listdelta_types::ArraySection;

/// 1000 entities, order shuffled, the tail 10% replaced with fresh ones.
fn flat_snapshots() -> (Vec<u64>, Vec<u64>) {
    let mut rng = StdRng::seed_from_u64(7);
    let source: Vec<u64> = (0..1_000).collect();
    let mut target = source.clone();
    target.shuffle(&mut rng);
    for value in target.iter_mut().skip(900) {
        *value = rng.gen_range(1_000..2_000);
    }
    (source, target)
}

/// 20 sections of 50 elements; the target reshuffles elements across all
/// sections, replaces 5% of them and reorders the sections.
fn sectioned_snapshots() -> (Vec<ArraySection<u64, u64>>, Vec<ArraySection<u64, u64>>) {
    let mut rng = StdRng::seed_from_u64(7);
    let source: Vec<ArraySection<u64, u64>> = (0..20)
        .map(|section| {
            let base = section * 50;
            ArraySection::new(section, (base..base + 50).collect())
        })
        .collect();

    let mut elements: Vec<u64> = source
        .iter()
        .flat_map(|section| section.elements.iter().copied())
        .collect();
    elements.shuffle(&mut rng);
    for value in elements.iter_mut().skip(950) {
        *value = rng.gen_range(10_000..20_000);
    }

    let mut models: Vec<u64> = (0..20).collect();
    models.shuffle(&mut rng);
    let target = models
        .into_iter()
        .map(|model| {
            let chunk: Vec<u64> = elements.split_off(elements.len() - 50);
            ArraySection::new(model, chunk)
        })
        .collect();
    (source, target)
}

fn bench_flat_diff(c: &mut Criterion) {
    let (source, target) = flat_snapshots();
    c.bench_function("flat_diff_1000_shuffled", |b| {
        b.iter(|| diff(black_box(&source), black_box(&target)))
    });
    c.bench_function("flat_staged_diff_1000_shuffled", |b| {
        b.iter(|| staged_diff(black_box(&source), black_box(&target)))
    });
}

fn bench_sectioned_diff(c: &mut Criterion) {
    let (source, target) = sectioned_snapshots();
    c.bench_function("sectioned_staged_diff_20x50_shuffled", |b| {
        b.iter(|| staged_sectioned_diff(black_box(&source), black_box(&target)))
    });
}

criterion_group!(benches, bench_flat_diff, bench_sectioned_diff);
criterion_main!(benches);
