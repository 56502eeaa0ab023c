mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use land_field::interpolate::{
    fallback_pass, interpolate_with_report, InterpolateOptions, InterpolationMode,
};
use land_field::lattice::Lattice;

const RESOLUTIONS: [usize; 3] = [100, 200, 400];
const STATIONS: usize = 500;

fn interpolate_mode_benches(c: &mut Criterion) {
    let samples = common::random_samples(0x5EED, STATIONS);
    let opts = InterpolateOptions::default();

    for mode in [
        InterpolationMode::Linear,
        InterpolationMode::Cubic,
        InterpolationMode::Nearest,
    ] {
        let mut group = c.benchmark_group(format!("interpolate/{mode:?}").to_lowercase());

        for &n in &RESOLUTIONS {
            let lattice = Lattice::build(common::REGION, n, n).expect("valid lattice");
            group.throughput(common::elements_throughput(lattice.len()));
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| {
                    let (field, _) =
                        interpolate_with_report(&samples, &lattice, mode, &opts).expect("field");
                    black_box(field.len());
                });
            });
        }

        group.finish();
    }
}

fn fallback_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate/fallback");
    let lattice = Lattice::build(common::REGION, 200, 200).expect("valid lattice");

    for &stations in &[50usize, 500, 2000] {
        let samples = common::random_samples(0xFA11 ^ stations as u64, stations);
        group.throughput(common::elements_throughput(lattice.len()));
        group.bench_with_input(
            BenchmarkId::from_parameter(stations),
            &stations,
            |b, _| {
                b.iter(|| black_box(fallback_pass(&samples, &lattice).len()));
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = interpolate_mode_benches, fallback_benches
}
criterion_main!(benches);
