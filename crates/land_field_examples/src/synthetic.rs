use std::collections::BTreeMap;

use glam::DVec2;
use land_field::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Region used by the synthetic scenes, in degrees.
pub const ISLAND_REGION: Bounds = Bounds::new(119.3, 122.1, 21.7, 25.4);

#[inline]
fn unit(rng: &mut StdRng) -> f64 {
    (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
}

/// Irregular star-shaped ring around `center` with `n` vertices.
pub fn blob(rng: &mut StdRng, center: DVec2, radii: DVec2, n: usize, roughness: f64) -> Vec<DVec2> {
    let phase = unit(rng) * std::f64::consts::TAU;
    (0..n)
        .map(|k| {
            let a = std::f64::consts::TAU * k as f64 / n as f64;
            let wobble = 1.0 + roughness * ((3.0 * a + phase).sin() * 0.5 + (unit(rng) - 0.5));
            center + DVec2::new(a.cos() * radii.x, a.sin() * radii.y) * wobble
        })
        .collect()
}

/// An elongated main island with a lake, a few offshore islets and one islet outside
/// the region.
pub fn synthetic_archipelago(seed: u64) -> MultiPolygon {
    let mut rng = StdRng::seed_from_u64(seed);
    let main_center = DVec2::new(120.95, 23.6);
    let lake = blob(&mut rng, DVec2::new(120.9, 23.9), DVec2::new(0.08, 0.1), 16, 0.2);
    let main = Polygon::new(blob(
        &mut rng,
        main_center,
        DVec2::new(0.55, 1.45),
        720,
        0.12,
    ))
    .with_hole(lake);

    let mut out = MultiPolygon::new(vec![main]);
    for c in [
        DVec2::new(119.6, 23.5),
        DVec2::new(121.55, 22.05),
        DVec2::new(121.75, 25.05),
        DVec2::new(123.5, 24.4),
    ] {
        let r = 0.04 + 0.06 * unit(&mut rng);
        out.push(Polygon::new(blob(&mut rng, c, DVec2::splat(r), 48, 0.3)));
    }
    out
}

/// Temperature-like readings: warmer in the south-west, cooler towards the island's
/// mountainous spine, with a little noise.
pub fn synthetic_stations(
    seed: u64,
    count: usize,
    boundary: &MultiPolygon,
) -> BTreeMap<String, StationReading> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = BTreeMap::new();
    let mut attempts = 0;
    while out.len() < count && attempts < count * 100 {
        attempts += 1;
        let p = DVec2::new(
            ISLAND_REGION.min_x + unit(&mut rng) * ISLAND_REGION.width(),
            ISLAND_REGION.min_y + unit(&mut rng) * ISLAND_REGION.height(),
        );
        if !boundary.contains(p) {
            continue;
        }
        let id = format!("C{:05}", rng.next_u32() % 100_000);
        out.insert(id, StationReading::new(p.y, p.x, temperature_at(p, &mut rng)));
    }
    out
}

fn temperature_at(p: DVec2, rng: &mut StdRng) -> f64 {
    let spine = (-((p.x - 121.0) / 0.25).powi(2)).exp();
    29.5 - 1.6 * (p.y - 22.0) - 9.0 * spine + (unit(rng) - 0.5) * 0.8
}
