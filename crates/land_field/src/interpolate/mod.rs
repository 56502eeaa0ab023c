//! Scatter-to-lattice interpolation with an explicit two-pass merge.
//!
//! The primary pass evaluates a smooth estimator over the sample triangulation and
//! leaves lattice points it cannot estimate (outside the convex hull, inside excluded
//! triangles, non-finite results) missing. The fallback pass assigns every point the
//! value of its nearest sample. [`merge`] keeps the primary value wherever one exists,
//! so the merged field is total whenever at least one sample exists.
//!
//! ```
//! use land_field::geometry::Bounds;
//! use land_field::interpolate::{interpolate, InterpolationMode};
//! use land_field::lattice::Lattice;
//! use land_field::sample::Sample;
//!
//! let samples = [
//!     Sample::new(120.0, 22.0, 25.0),
//!     Sample::new(122.0, 22.0, 27.0),
//!     Sample::new(121.0, 25.0, 21.0),
//! ];
//! let lattice = Lattice::build(Bounds::new(120.0, 122.0, 22.0, 25.0), 16, 16).unwrap();
//! let field = interpolate(&samples, &lattice, InterpolationMode::Cubic).unwrap();
//! assert_eq!(field.missing_count(), 0);
//! ```
pub mod delaunay;
pub mod nearest;
pub mod triangulated;

use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use self::delaunay::Triangulation;
pub use self::nearest::NearestEstimator;
pub use self::triangulated::TriangulatedEstimator;
use crate::error::{Error, Result};
use crate::lattice::Lattice;
use crate::raster::{Field, Raster};
use crate::sample::Sample;

/// Minimum number of samples for the primary estimator.
pub const MIN_SAMPLES: usize = 3;

/// Estimator used by the primary pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpolationMode {
    /// Barycentric blend of the three triangle vertices.
    Linear,
    /// Cubic Bernstein-Bezier patch per triangle with estimated vertex gradients.
    #[default]
    Cubic,
    /// Nearest sample everywhere; the primary pass equals the fallback.
    Nearest,
}

/// Tuning knobs for the primary pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct InterpolateOptions {
    /// Triangles with a longer edge are left undefined and filled by the fallback.
    pub max_edge_length: Option<f64>,
    /// Samples closer than this on both axes are merged by averaging their values.
    pub duplicate_tolerance: f64,
}

impl Default for InterpolateOptions {
    fn default() -> Self {
        Self {
            max_edge_length: None,
            duplicate_tolerance: 1e-9,
        }
    }
}

impl InterpolateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum triangle edge length, in degrees.
    pub fn with_max_edge_length(mut self, max_edge_length: f64) -> Self {
        self.max_edge_length = Some(max_edge_length);
        self
    }

    /// Sets the duplicate merge tolerance, in degrees.
    pub fn with_duplicate_tolerance(mut self, duplicate_tolerance: f64) -> Self {
        self.duplicate_tolerance = duplicate_tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(len) = self.max_edge_length {
            if !(len.is_finite() && len > 0.0) {
                return Err(Error::InvalidConfig(
                    "max_edge_length must be finite and > 0".into(),
                ));
            }
        }
        if !(self.duplicate_tolerance.is_finite() && self.duplicate_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(
                "duplicate_tolerance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// A point estimator over scattered samples.
pub trait ScatterEstimator: Send + Sync {
    /// Estimate at `p`, or `None` where the estimator is undefined.
    fn estimate(&self, p: DVec2) -> Option<f64>;

    /// Evaluates every lattice point.
    fn estimate_lattice(&self, lattice: &Lattice) -> Field {
        let mut field: Field = Raster::filled(lattice, None);
        fill_rows(&mut field, |i, row| {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.estimate(lattice.point(i, j));
            }
        });
        field
    }
}

/// Runs `f(i, row)` over each lattice row of `field`.
pub(crate) fn fill_rows<F>(field: &mut Field, f: F)
where
    F: Fn(usize, &mut [Option<f64>]) + Sync,
{
    let cols = field.cols();
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        field
            .as_mut_slice()
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        field
            .as_mut_slice()
            .chunks_mut(cols)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }
}

/// Result of the primary pass.
#[derive(Clone, Debug)]
pub struct PrimaryPass {
    pub field: Field,
    /// Triangles in the sample triangulation; zero in `Nearest` mode.
    pub triangles: usize,
}

/// How many cells each pass supplied to the merged field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterpolationReport {
    pub mode: InterpolationMode,
    pub triangles: usize,
    /// Cells defined by the primary pass.
    pub primary_defined: usize,
    /// Cells filled by the fallback pass.
    pub patched: usize,
    pub total: usize,
}

impl InterpolationReport {
    /// Cells the primary pass left missing.
    pub fn primary_missing(&self) -> usize {
        self.total - self.primary_defined
    }
}

/// Interpolates `samples` onto `lattice` with default options.
pub fn interpolate(samples: &[Sample], lattice: &Lattice, mode: InterpolationMode) -> Result<Field> {
    interpolate_with_report(samples, lattice, mode, &InterpolateOptions::default())
        .map(|(field, _)| field)
}

/// Runs both passes and merges them, returning the field and per-pass counts.
pub fn interpolate_with_report(
    samples: &[Sample],
    lattice: &Lattice,
    mode: InterpolationMode,
    opts: &InterpolateOptions,
) -> Result<(Field, InterpolationReport)> {
    ensure_enough_samples(samples)?;
    opts.validate()?;

    #[cfg(feature = "parallel")]
    let (primary, fallback) = rayon::join(
        || primary_pass(samples, lattice, mode, opts),
        || fallback_pass(samples, lattice),
    );
    #[cfg(not(feature = "parallel"))]
    let (primary, fallback) = (
        primary_pass(samples, lattice, mode, opts),
        fallback_pass(samples, lattice),
    );
    let primary = primary?;

    let primary_defined = primary.field.defined_count();
    let field = merge(&primary.field, &fallback)?;
    let report = InterpolationReport {
        mode,
        triangles: primary.triangles,
        primary_defined,
        patched: field.defined_count() - primary_defined,
        total: field.len(),
    };
    debug!(
        "Interpolated {} samples: {} primary cells, {} patched, {} total.",
        samples.len(),
        report.primary_defined,
        report.patched,
        report.total
    );
    Ok((field, report))
}

/// Evaluates the smooth estimator for `mode` on every lattice point.
pub fn primary_pass(
    samples: &[Sample],
    lattice: &Lattice,
    mode: InterpolationMode,
    opts: &InterpolateOptions,
) -> Result<PrimaryPass> {
    ensure_enough_samples(samples)?;
    opts.validate()?;

    if mode == InterpolationMode::Nearest {
        return Ok(PrimaryPass {
            field: fallback_pass(samples, lattice),
            triangles: 0,
        });
    }

    let unique = merge_duplicates(samples, opts.duplicate_tolerance);
    if unique.len() < samples.len() {
        debug!(
            "Merged {} duplicate samples before triangulation.",
            samples.len() - unique.len()
        );
    }
    let estimator = TriangulatedEstimator::new(&unique, mode, opts.max_edge_length);
    if estimator.triangle_count() == 0 {
        warn!(
            "Samples are collinear or coincident; the {:?} pass is undefined everywhere.",
            mode
        );
    }
    Ok(PrimaryPass {
        field: estimator.estimate_lattice(lattice),
        triangles: estimator.triangle_count(),
    })
}

/// Nearest-sample value at every lattice point. Total for any non-empty sample set.
pub fn fallback_pass(samples: &[Sample], lattice: &Lattice) -> Field {
    NearestEstimator::new(samples).estimate_lattice(lattice)
}

/// Per-cell `primary.or(fallback)`.
pub fn merge(primary: &Field, fallback: &Field) -> Result<Field> {
    primary.ensure_same_shape(fallback)?;
    let data = primary
        .as_slice()
        .iter()
        .zip(fallback.as_slice())
        .map(|(p, f)| p.or(*f))
        .collect();
    Raster::from_vec(primary.rows(), primary.cols(), data)
}

/// Collapses samples within `tolerance` of an earlier sample on both axes.
///
/// Each group keeps the position of its first member and the mean of its values.
/// Output order follows the first occurrence of each group.
pub fn merge_duplicates(samples: &[Sample], tolerance: f64) -> Vec<Sample> {
    let mut groups: Vec<(Sample, f64, usize)> = Vec::with_capacity(samples.len());
    'samples: for s in samples {
        for (first, sum, count) in groups.iter_mut() {
            if (first.position() - s.position()).abs().max_element() <= tolerance {
                *sum += s.value;
                *count += 1;
                continue 'samples;
            }
        }
        groups.push((*s, s.value, 1));
    }
    groups
        .into_iter()
        .map(|(first, sum, count)| {
            if count == 1 {
                first
            } else {
                Sample::new(first.x, first.y, sum / count as f64)
            }
        })
        .collect()
}

fn ensure_enough_samples(samples: &[Sample]) -> Result<()> {
    if samples.len() < MIN_SAMPLES {
        return Err(Error::InsufficientSamples {
            required: MIN_SAMPLES,
            actual: samples.len(),
        });
    }
    Ok(())
}
