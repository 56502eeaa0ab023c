use std::path::Path;

use glam::DVec2;
use image::{Rgb, RgbImage};
use land_field::prelude::*;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a `fmt` subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Piecewise-linear color ramp over normalized values in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ColorRamp {
    stops: Vec<(f64, [u8; 3])>,
}

impl ColorRamp {
    /// Stops must be sorted by position.
    pub fn new(stops: Vec<(f64, [u8; 3])>) -> Self {
        Self { stops }
    }

    /// Blue through green and yellow to red.
    pub fn temperature() -> Self {
        Self::new(vec![
            (0.0, [49, 54, 149]),
            (0.25, [69, 117, 180]),
            (0.45, [145, 207, 96]),
            (0.65, [254, 224, 139]),
            (0.85, [244, 109, 67]),
            (1.0, [165, 0, 38]),
        ])
    }

    pub fn color(&self, t: f64) -> [u8; 3] {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let Some(first) = self.stops.first() else {
            return [0, 0, 0];
        };
        if t <= first.0 {
            return first.1;
        }
        for w in self.stops.windows(2) {
            let (t0, c0) = w[0];
            let (t1, c1) = w[1];
            if t <= t1 {
                let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
                return [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])];
            }
        }
        self.stops.last().map_or(first.1, |s| s.1)
    }
}

/// Drawing options for field previews.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Pixels per lattice cell on each axis.
    pub scale: u32,
    /// Color of missing cells.
    pub background: [u8; 3],
    pub ramp: ColorRamp,
    /// Fixed `(min, max)` for the ramp. Defaults to the field's own range.
    pub value_range: Option<(f64, f64)>,
    /// Station marker color and radius in pixels.
    pub station_marker: Option<([u8; 3], i32)>,
}

impl RenderConfig {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            background: [26, 26, 26],
            ramp: ColorRamp::temperature(),
            value_range: None,
            station_marker: None,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some((min, max));
        self
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn with_station_marker(mut self, color: [u8; 3], radius: i32) -> Self {
        self.station_marker = Some((color, radius));
        self
    }
}

/// Image of `field`, north up. Missing cells use the background color.
pub fn render_field(field: &Field, lattice: &Lattice, rc: &RenderConfig) -> RgbImage {
    let (rows, cols) = lattice.shape();
    let mut img = RgbImage::from_pixel(
        rows as u32 * rc.scale,
        cols as u32 * rc.scale,
        Rgb(rc.background),
    );
    let (lo, hi) = rc
        .value_range
        .or_else(|| field.value_range())
        .unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };

    for (i, j, _) in lattice.iter() {
        let Some(Some(v)) = field.get(i, j) else {
            continue;
        };
        let color = rc.ramp.color((v - lo) / span);
        fill_cell(&mut img, rc.scale, i, cols - 1 - j, color);
    }
    img
}

/// Black and white image of a mask, land white.
pub fn render_mask(mask: &Mask, lattice: &Lattice, rc: &RenderConfig) -> RgbImage {
    let (rows, cols) = lattice.shape();
    let mut img = RgbImage::from_pixel(
        rows as u32 * rc.scale,
        cols as u32 * rc.scale,
        Rgb(rc.background),
    );
    for (i, j, _) in lattice.iter() {
        if mask.get(i, j) == Some(&true) {
            fill_cell(&mut img, rc.scale, i, cols - 1 - j, [235, 235, 235]);
        }
    }
    img
}

/// Draws station markers over an existing image.
pub fn draw_stations(img: &mut RgbImage, lattice: &Lattice, samples: &[Sample], rc: &RenderConfig) {
    let Some((color, radius)) = rc.station_marker else {
        return;
    };
    for s in samples {
        if let Some((px, py)) = to_pixel(lattice, rc.scale, s.position()) {
            draw_disk(img, px, py, radius, color);
        }
    }
}

pub fn render_field_to_png(
    field: &Field,
    lattice: &Lattice,
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    save(render_field(field, lattice, rc), path.as_ref())
}

pub fn render_mask_to_png(
    mask: &Mask,
    lattice: &Lattice,
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    save(render_mask(mask, lattice, rc), path.as_ref())
}

/// Renders the final field of a run with station markers; the hottest and coldest
/// stations get a larger white or black ring.
pub fn render_run_result_to_png(
    result: &RunResult,
    samples: &[Sample],
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let mut img = render_field(&result.field, &result.lattice, rc);
    draw_stations(&mut img, &result.lattice, samples, rc);
    let radius = rc.station_marker.map_or(3, |(_, r)| r + 2);
    for (group, color) in [
        (&result.extremes.highest, [255, 255, 255]),
        (&result.extremes.lowest, [0, 0, 0]),
    ] {
        for s in group {
            if let Some((px, py)) = to_pixel(&result.lattice, rc.scale, s.position()) {
                draw_ring(&mut img, px, py, radius, color);
            }
        }
    }
    save(img, path.as_ref())
}

fn save(img: RgbImage, path: &Path) -> anyhow::Result<()> {
    img.save(path)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn fill_cell(img: &mut RgbImage, scale: u32, cx: usize, cy: usize, color: [u8; 3]) {
    let x0 = cx as u32 * scale;
    let y0 = cy as u32 * scale;
    for dy in 0..scale {
        for dx in 0..scale {
            img.put_pixel(x0 + dx, y0 + dy, Rgb(color));
        }
    }
}

fn to_pixel(lattice: &Lattice, scale: u32, p: DVec2) -> Option<(i32, i32)> {
    let region = lattice.region();
    if !region.contains(p) {
        return None;
    }
    let w = (lattice.rows() as u32 * scale) as f64;
    let h = (lattice.cols() as u32 * scale) as f64;
    let px = (p.x - region.min_x) / region.width() * (w - 1.0);
    let py = (region.max_y - p.y) / region.height() * (h - 1.0);
    Some((px.round() as i32, py.round() as i32))
}

fn draw_disk(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_ring(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    let outer = radius * radius;
    let inner = (radius - 1).max(0).pow(2);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = dx * dx + dy * dy;
            if d <= outer && d > inner {
                put_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_clipped(img: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}
