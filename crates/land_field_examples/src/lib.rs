#![forbid(unsafe_code)]

mod rendering;
mod scene;
mod synthetic;

pub use rendering::{
    draw_stations, init_tracing, render_field, render_field_to_png, render_mask,
    render_mask_to_png, render_run_result_to_png, ColorRamp, RenderConfig,
};
pub use scene::Scene;
pub use synthetic::{blob, synthetic_archipelago, synthetic_stations, ISLAND_REGION};
