use land_field::prelude::*;
use land_field_examples::{
    draw_stations, init_tracing, render_field, render_field_to_png, synthetic_archipelago,
    synthetic_stations, RenderConfig, ISLAND_REGION,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let archipelago = synthetic_archipelago(3);
    let samples = plain_samples(&samples_from_stations(synthetic_stations(
        5,
        40,
        &archipelago,
    )));
    let lattice = Lattice::build(ISLAND_REGION, 280, 370)?;
    let rc = RenderConfig::new(2).with_station_marker([20, 20, 20], 2);

    // Long triangles across data-sparse areas are left to the nearest-sample fallback.
    let opts = InterpolateOptions::new().with_max_edge_length(0.6);
    let primary = primary_pass(&samples, &lattice, InterpolationMode::Cubic, &opts)?;
    let fallback = fallback_pass(&samples, &lattice);
    let merged = merge(&primary.field, &fallback)?;
    info!(
        "Primary pass covers {} of {} cells; fallback patches {}.",
        primary.field.defined_count(),
        lattice.len(),
        merged.defined_count() - primary.field.defined_count()
    );

    let mut img = render_field(&primary.field, &lattice, &rc);
    draw_stations(&mut img, &lattice, &samples, &rc);
    img.save("coverage-primary.png")?;
    render_field_to_png(&fallback, &lattice, &rc, "coverage-fallback.png")?;
    render_field_to_png(&merged, &lattice, &rc, "coverage-merged.png")?;
    Ok(())
}
