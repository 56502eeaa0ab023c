use land_field::prelude::*;
use land_field_examples::{init_tracing, render_run_result_to_png, RenderConfig, Scene};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/coastal-stations.ron").to_string()
    });
    let scene = Scene::load(&path)?;
    let samples = scene.samples();

    let mut sink = VecSink::only([FieldEventKind::Warning, FieldEventKind::MaskBuilt]);
    let runner = FieldRunner::try_new(scene.config.clone())?;
    let result =
        runner.run_with_events(&samples, scene.region, scene.boundary.as_ref(), &mut sink)?;
    for event in sink.as_slice() {
        info!("{:?}", event);
    }

    for s in &result.extremes.highest {
        info!("High: {:.1} at ({:.3}, {:.3})", s.value, s.x, s.y);
    }
    for s in &result.extremes.lowest {
        info!("Low: {:.1} at ({:.3}, {:.3})", s.value, s.x, s.y);
    }

    let rc = RenderConfig::new(scene.scale).with_station_marker([20, 20, 20], 2);
    render_run_result_to_png(&result, &samples, &rc, &scene.output)?;
    Ok(())
}
