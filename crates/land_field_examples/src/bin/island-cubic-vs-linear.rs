use land_field::prelude::*;
use land_field_examples::{
    init_tracing, render_run_result_to_png, synthetic_archipelago, synthetic_stations,
    RenderConfig, ISLAND_REGION,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let archipelago = synthetic_archipelago(7);
    let stations = synthetic_stations(11, 120, &archipelago);
    let samples = plain_samples(&samples_from_stations(stations));
    let boundary = Boundary::from(archipelago);

    // Shared color range so the three images are comparable.
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
    let rc = RenderConfig::new(2)
        .with_value_range(lo, hi)
        .with_station_marker([20, 20, 20], 2);

    for mode in [
        InterpolationMode::Linear,
        InterpolationMode::Cubic,
        InterpolationMode::Nearest,
    ] {
        let config = RunConfig::new(280, 370).with_mode(mode);
        let runner = FieldRunner::try_new(config)?;
        let result = runner.run(&samples, ISLAND_REGION, Some(&boundary))?;
        let report = &result.report.interpolation;
        info!(
            "{:?}: {} triangles, {} primary cells, {} patched by nearest sample.",
            mode, report.triangles, report.primary_defined, report.patched
        );

        let out = format!("island-{}.png", format!("{mode:?}").to_lowercase());
        render_run_result_to_png(&result, &samples, &rc, &out)?;
    }

    Ok(())
}
