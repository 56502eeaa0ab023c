use std::time::Instant;

use glam::DVec2;
use land_field::prelude::*;
use land_field_examples::{blob, init_tracing, render_mask_to_png, RenderConfig, ISLAND_REGION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(2025);

    // A dense scatter of islets; most lie far outside the region and are culled by the
    // bounding-box prefilter.
    let mut islands = MultiPolygon::default();
    for _ in 0..400 {
        let u = (rng.next_u32() as f64) / (u32::MAX as f64);
        let v = (rng.next_u32() as f64) / (u32::MAX as f64);
        let center = DVec2::new(110.0 + u * 20.0, 15.0 + v * 18.0);
        let ring = blob(&mut rng, center, DVec2::splat(0.12), 256, 0.35);
        islands.push(Polygon::new(ring));
    }
    let boundary = Boundary::from(islands);
    let lattice = Lattice::build(ISLAND_REGION, 400, 400)?;

    let mut skipped = 0usize;
    let mut sink = FnSink::new(|event| {
        if let FieldEvent::PolygonSkipped { .. } = event {
            skipped += 1;
        }
    });

    let start = Instant::now();
    let (fast, report) = mask_with(&lattice, &boundary, &MaskOptions::new(), &mut sink)?;
    let fast_elapsed = start.elapsed();
    drop(sink);

    let start = Instant::now();
    let (slow, _) = mask_with(
        &lattice,
        &boundary,
        &MaskOptions::new().with_prefilter(false),
        &mut (),
    )?;
    let slow_elapsed = start.elapsed();

    info!(
        "Prefilter: {:?} ({} of {} polygons skipped); brute force: {:?}.",
        fast_elapsed, skipped, report.polygons_total, slow_elapsed
    );
    anyhow::ensure!(fast == slow, "prefiltered mask differs from brute force");
    info!("Both paths produced {} land cells.", report.land_cells);

    render_mask_to_png(&fast, &lattice, &RenderConfig::new(2), "mask-prefilter-islands.png")?;
    Ok(())
}
