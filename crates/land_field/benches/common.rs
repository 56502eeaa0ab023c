use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::DVec2;
use land_field::geometry::{Bounds, MultiPolygon, Polygon};
use land_field::sample::Sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const REGION: Bounds = Bounds::new(119.3, 122.1, 21.7, 25.4);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

fn unit(rng: &mut StdRng) -> f64 {
    (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
}

#[allow(dead_code)]
pub fn random_samples(seed: u64, n: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = REGION.min_x + unit(&mut rng) * REGION.width();
            let y = REGION.min_y + unit(&mut rng) * REGION.height();
            Sample::new(x, y, 15.0 + 15.0 * unit(&mut rng))
        })
        .collect()
}

/// A vertex-heavy main island inside the region plus small islands, some far outside.
#[allow(dead_code)]
pub fn island_boundary(seed: u64, vertices: usize, islands: usize) -> MultiPolygon {
    let mut rng = StdRng::seed_from_u64(seed);
    let center = (REGION.min() + REGION.max()) * 0.5;
    let mut out = MultiPolygon::new(vec![blob(&mut rng, center, 1.2, vertices)]);
    for k in 0..islands {
        let spread = if k % 2 == 0 { 2.0 } else { 12.0 };
        let c = center
            + DVec2::new(unit(&mut rng) - 0.5, unit(&mut rng) - 0.5) * spread * 2.0;
        let radius = 0.05 + 0.1 * unit(&mut rng);
        out.push(blob(&mut rng, c, radius, 64));
    }
    out
}

fn blob(rng: &mut StdRng, center: DVec2, radius: f64, n: usize) -> Polygon {
    let ring = (0..n)
        .map(|k| {
            let angle = std::f64::consts::TAU * k as f64 / n as f64;
            let r = radius * (0.7 + 0.3 * unit(rng));
            center + DVec2::new(angle.cos(), angle.sin() * 1.5) * r
        })
        .collect();
    Polygon::new(ring)
}
