#![forbid(unsafe_code)]
//! land_field: Scatter-to-grid interpolation of station readings, restricted to a landmass.
//!
//! Modules:
//! - geometry: bounds, polygons with holes, multi-polygon boundaries, even-odd containment
//! - lattice: the regular evaluation grid every raster is aligned with
//! - interpolate: Delaunay-based linear/cubic primary pass, nearest-sample fallback, merge
//! - mask: polygon rasterization with a bounding-box prefilter
//! - compose: restriction of a field to the mask
//! - sample: samples, station ingestion and extreme-value selection
//! - runner: the full pipeline with events
//!
//! For a rendered walkthrough, see the `land_field_examples` crate.
pub mod compose;
pub mod error;
pub mod events;
pub mod geometry;
pub mod interpolate;
pub mod lattice;
pub mod mask;
pub mod raster;
pub mod runner;
pub mod sample;

/// Convenient re-exports for common types. Import with `use land_field::prelude::*;`.
pub mod prelude {
    pub use crate::compose::compose;
    pub use crate::error::{Error, Result};
    pub use crate::events::{EventSink, FieldEvent, FieldEventKind, FnSink, MultiSink, VecSink};
    pub use crate::geometry::{Boundary, Bounds, MultiPolygon, Polygon};
    pub use crate::interpolate::{
        fallback_pass, interpolate, interpolate_with_report, merge, primary_pass,
        InterpolateOptions, InterpolationMode, InterpolationReport, NearestEstimator,
        ScatterEstimator, TriangulatedEstimator,
    };
    pub use crate::lattice::Lattice;
    pub use crate::mask::{mask, mask_with, MaskOptions, MaskReport};
    pub use crate::raster::{Field, Mask, Raster};
    pub use crate::runner::{run_field, FieldRunner, RunConfig, RunReport, RunResult};
    pub use crate::sample::{
        extremes, plain_samples, retain_valid, samples_from_stations, Extremes, Sample,
        StationReading, StationSample,
    };
}
