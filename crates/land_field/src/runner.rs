//! High-level runner: lattice, interpolation, masking and composition in one call.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::compose::compose;
use crate::error::{Error, Result};
use crate::events::{EventSink, FieldEvent, FieldEventKind};
use crate::geometry::{Boundary, Bounds};
use crate::interpolate::{
    interpolate_with_report, InterpolateOptions, InterpolationMode, InterpolationReport,
};
use crate::lattice::Lattice;
use crate::mask::{mask_with, MaskOptions, MaskReport};
use crate::raster::{Field, Mask, Raster};
use crate::sample::{extremes, Extremes, Sample};

/// Configuration for a field run.
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Lattice points along x (longitude).
    pub rows: usize,
    /// Lattice points along y (latitude).
    pub cols: usize,
    /// Estimator for the primary pass.
    pub mode: InterpolationMode,
    /// Primary pass options.
    pub interpolate: InterpolateOptions,
    /// Masking options.
    pub mask: MaskOptions,
    /// Number of highest and lowest samples reported for annotation.
    pub extremes_k: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rows: 400,
            cols: 400,
            mode: InterpolationMode::Cubic,
            interpolate: InterpolateOptions::default(),
            mask: MaskOptions::default(),
            extremes_k: 3,
        }
    }
}

impl RunConfig {
    /// Creates a new [`RunConfig`] with the given lattice resolution.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Sets the interpolation mode.
    pub fn with_mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the primary pass options.
    pub fn with_interpolate_options(mut self, interpolate: InterpolateOptions) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Sets the masking options.
    pub fn with_mask_options(mut self, mask: MaskOptions) -> Self {
        self.mask = mask;
        self
    }

    /// Toggles the bounding-box prefilter of the mask engine.
    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.mask.prefilter = prefilter;
        self
    }

    /// Sets how many extreme samples are reported at each end.
    pub fn with_extremes_k(mut self, extremes_k: usize) -> Self {
        self.extremes_k = extremes_k;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.rows < 2 || self.cols < 2 {
            return Err(Error::InvalidConfig(
                "rows and cols must both be >= 2".into(),
            ));
        }
        self.interpolate.validate()?;
        self.mask.validate()?;
        Ok(())
    }
}

/// Per-stage counts of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub interpolation: InterpolationReport,
    /// `None` when the run had no boundary.
    pub mask: Option<MaskReport>,
}

/// Result of a field run.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Lattice every raster below is aligned with.
    pub lattice: Lattice,
    /// Final field: interpolated values on land, missing elsewhere.
    pub field: Field,
    /// Merged interpolation before masking.
    pub interpolated: Field,
    /// Land mask, `None` when the run had no boundary.
    pub mask: Option<Mask>,
    pub extremes: Extremes,
    pub report: RunReport,
}

pub struct FieldRunner {
    /// Run configuration applied to this runner.
    pub config: RunConfig,
}

impl FieldRunner {
    pub fn try_new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn new(config: RunConfig) -> Self {
        debug_assert!(
            config.rows >= 2 && config.cols >= 2,
            "rows and cols must both be >= 2"
        );
        Self { config }
    }

    /// Runs the pipeline. `boundary = None` skips masking.
    pub fn run(
        &self,
        samples: &[Sample],
        region: Bounds,
        boundary: Option<&Boundary>,
    ) -> Result<RunResult> {
        run_field(samples, region, boundary, &self.config, None)
    }

    pub fn run_with_events(
        &self,
        samples: &[Sample],
        region: Bounds,
        boundary: Option<&Boundary>,
        sink: &mut dyn EventSink,
    ) -> Result<RunResult> {
        run_field(samples, region, boundary, &self.config, Some(sink))
    }
}

/// Builds the lattice over `region`, interpolates `samples`, masks with `boundary` and
/// composes the final field.
///
/// [`Error::InvalidRegion`], [`Error::InsufficientSamples`] and configuration errors
/// abort the run. An empty boundary yields an all-false mask, an all-missing field and a
/// warning event.
pub fn run_field(
    samples: &[Sample],
    region: Bounds,
    boundary: Option<&Boundary>,
    config: &RunConfig,
    sink: Option<&mut dyn EventSink>,
) -> Result<RunResult> {
    if let Some(s) = sink {
        run_field_internal(samples, region, boundary, config, s)
    } else {
        run_field_internal(samples, region, boundary, config, &mut ())
    }
}

fn run_field_internal(
    samples: &[Sample],
    region: Bounds,
    boundary: Option<&Boundary>,
    config: &RunConfig,
    sink: &mut dyn EventSink,
) -> Result<RunResult> {
    config.validate()?;
    info!(
        "Starting field run: {} samples, {}x{} lattice, {:?} mode.",
        samples.len(),
        config.rows,
        config.cols,
        config.mode
    );
    if sink.wants(FieldEventKind::RunStarted) {
        sink.send(FieldEvent::RunStarted {
            config: config.clone(),
            sample_count: samples.len(),
        });
    }

    let lattice = Lattice::build(region, config.rows, config.cols)?;
    if sink.wants(FieldEventKind::LatticeBuilt) {
        sink.send(FieldEvent::LatticeBuilt {
            shape: lattice.shape(),
        });
    }

    let (interpolated, interp_report) =
        interpolate_with_report(samples, &lattice, config.mode, &config.interpolate)?;
    info!(
        "Interpolation finished: {} cells from the primary pass, {} from the fallback.",
        interp_report.primary_defined, interp_report.patched
    );
    if sink.wants(FieldEventKind::PrimaryPassFinished) {
        sink.send(FieldEvent::PrimaryPassFinished {
            mode: interp_report.mode,
            triangles: interp_report.triangles,
            missing: interp_report.primary_missing(),
        });
    }
    if sink.wants(FieldEventKind::FallbackApplied) {
        sink.send(FieldEvent::FallbackApplied {
            report: interp_report.clone(),
        });
    }

    let (field, mask, mask_report) = match boundary {
        None => (interpolated.clone(), None, None),
        Some(boundary) => match mask_with(&lattice, boundary, &config.mask, &mut *sink) {
            Ok((mask, report)) => {
                info!(
                    "Mask built: {} land cells from {} polygons ({} skipped).",
                    report.land_cells, report.polygons_total, report.polygons_skipped
                );
                if sink.wants(FieldEventKind::MaskBuilt) {
                    sink.send(FieldEvent::MaskBuilt {
                        report: report.clone(),
                    });
                }
                let field = compose(&interpolated, &mask)?;
                (field, Some(mask), Some(report))
            }
            Err(Error::EmptyBoundary) => {
                warn!("Boundary holds no polygons; the final field is entirely missing.");
                if sink.wants(FieldEventKind::Warning) {
                    sink.send(FieldEvent::Warning {
                        context: "mask".into(),
                        message: "Boundary holds no polygons; no cell is land".into(),
                    });
                }
                (
                    Raster::filled(&lattice, None),
                    Some(Raster::filled(&lattice, false)),
                    Some(MaskReport::default()),
                )
            }
            Err(e) => return Err(e),
        },
    };

    let extremes = extremes(samples, config.extremes_k);
    let defined_cells = field.defined_count();
    info!(
        "Field run finished: {} of {} cells defined.",
        defined_cells,
        field.len()
    );
    if sink.wants(FieldEventKind::RunFinished) {
        sink.send(FieldEvent::RunFinished {
            defined_cells,
            total_cells: field.len(),
        });
    }

    Ok(RunResult {
        lattice,
        field,
        interpolated,
        mask,
        extremes,
        report: RunReport {
            interpolation: interp_report,
            mask: mask_report,
        },
    })
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::events::VecSink;
    use crate::geometry::{MultiPolygon, Polygon};

    fn region() -> Bounds {
        Bounds::new(120.0, 122.0, 22.0, 25.0)
    }

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(120.3, 22.4, 28.0),
            Sample::new(121.7, 22.6, 30.5),
            Sample::new(121.2, 24.8, 19.0),
            Sample::new(120.6, 24.1, 22.5),
            Sample::new(121.0, 23.5, 25.0),
        ]
    }

    fn west_half() -> Boundary {
        Polygon::rect(Bounds::new(119.0, 121.0, 21.0, 26.0)).into()
    }

    #[test]
    fn config_validation() {
        assert!(RunConfig::default().validate().is_ok());
        assert!(RunConfig::new(1, 10).validate().is_err());
        assert!(FieldRunner::try_new(RunConfig::new(10, 1)).is_err());
        let bad = RunConfig::new(10, 10)
            .with_interpolate_options(InterpolateOptions::new().with_max_edge_length(-1.0));
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn run_masks_the_interpolated_field() {
        let runner = FieldRunner::try_new(RunConfig::new(21, 31)).unwrap();
        let result = runner.run(&samples(), region(), Some(&west_half())).unwrap();
        assert_eq!(result.lattice.shape(), (21, 31));
        assert_eq!(result.interpolated.missing_count(), 0);

        let mask = result.mask.as_ref().unwrap();
        for (i, j, p) in result.lattice.iter() {
            let land = *mask.get(i, j).unwrap();
            assert_eq!(land, p.x < 121.0);
            let value = result.field.get(i, j).copied().flatten();
            if land {
                assert_eq!(value, result.interpolated.get(i, j).copied().flatten());
            } else {
                assert_eq!(value, None);
            }
        }
        assert_eq!(result.extremes.highest[0].value, 30.5);
        assert_eq!(result.extremes.lowest[0].value, 19.0);
    }

    #[test]
    fn no_boundary_keeps_interpolated_field() {
        let runner = FieldRunner::try_new(RunConfig::new(11, 11)).unwrap();
        let result = runner.run(&samples(), region(), None).unwrap();
        assert!(result.mask.is_none());
        assert!(result.report.mask.is_none());
        assert_eq!(result.field, result.interpolated);
    }

    #[test]
    fn empty_boundary_yields_missing_field_and_warning() {
        let runner = FieldRunner::try_new(RunConfig::new(11, 11)).unwrap();
        let boundary = Boundary::from(MultiPolygon::default());
        let mut sink = VecSink::new();
        let result = runner
            .run_with_events(&samples(), region(), Some(&boundary), &mut sink)
            .unwrap();
        assert_eq!(result.field.defined_count(), 0);
        assert_eq!(result.mask.as_ref().unwrap().count_true(), 0);
        assert!(sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, FieldEvent::Warning { .. })));
    }

    #[test]
    fn fatal_errors_surface() {
        let runner = FieldRunner::try_new(RunConfig::new(11, 11)).unwrap();
        assert!(matches!(
            runner.run(&samples(), Bounds::new(122.0, 120.0, 22.0, 25.0), None),
            Err(Error::InvalidRegion(_))
        ));
        assert!(matches!(
            runner.run(&samples()[..2], region(), None),
            Err(Error::InsufficientSamples { .. })
        ));
    }

    #[test]
    fn events_follow_stage_order() {
        let runner = FieldRunner::try_new(RunConfig::new(11, 11)).unwrap();
        let far_island = Polygon::rect(Bounds::new(140.0, 141.0, 40.0, 41.0));
        let boundary = Boundary::from(MultiPolygon::new(vec![
            Polygon::rect(Bounds::new(119.0, 121.0, 21.0, 26.0)),
            far_island,
        ]));
        let mut sink = VecSink::new();
        runner
            .run_with_events(&samples(), region(), Some(&boundary), &mut sink)
            .unwrap();
        let kinds: Vec<FieldEventKind> = sink.as_slice().iter().map(FieldEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldEventKind::RunStarted,
                FieldEventKind::LatticeBuilt,
                FieldEventKind::PrimaryPassFinished,
                FieldEventKind::FallbackApplied,
                FieldEventKind::PolygonSkipped,
                FieldEventKind::PolygonRasterized,
                FieldEventKind::MaskBuilt,
                FieldEventKind::RunFinished,
            ]
        );
    }

    #[test]
    fn prefilter_toggle_does_not_change_output() {
        let boundary = Boundary::from(
            Polygon::new(vec![
                DVec2::new(120.2, 22.1),
                DVec2::new(121.9, 22.9),
                DVec2::new(121.1, 24.9),
                DVec2::new(120.4, 23.6),
            ])
            .with_hole(vec![
                DVec2::new(120.9, 23.2),
                DVec2::new(121.2, 23.2),
                DVec2::new(121.0, 23.6),
            ]),
        );
        let on = FieldRunner::new(RunConfig::new(33, 47))
            .run(&samples(), region(), Some(&boundary))
            .unwrap();
        let off = FieldRunner::new(RunConfig::new(33, 47).with_prefilter(false))
            .run(&samples(), region(), Some(&boundary))
            .unwrap();
        assert_eq!(on.mask, off.mask);
        assert_eq!(on.field, off.field);
    }
}
