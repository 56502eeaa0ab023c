//! Event types and sinks for observing field computations.
//!
//! This module defines [`FieldEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while executing a run via
//! [`crate::runner::FieldRunner`] or the free functions in [`crate::mask`].
use crate::interpolate::{InterpolationMode, InterpolationReport};
use crate::mask::MaskReport;
use crate::runner::RunConfig;

/// Describes events emitted by field computations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum FieldEvent {
    /// Emitted when a run starts.
    RunStarted {
        /// The run configuration used.
        config: RunConfig,
        /// Number of samples supplied.
        sample_count: usize,
    },

    /// Emitted once the lattice exists.
    LatticeBuilt {
        /// `(rows, cols)` of the lattice.
        shape: (usize, usize),
    },

    /// Emitted after the smooth estimator was evaluated on every lattice point.
    PrimaryPassFinished {
        /// Estimator used for the pass.
        mode: InterpolationMode,
        /// Triangles in the sample triangulation.
        triangles: usize,
        /// Cells the primary pass left missing.
        missing: usize,
    },

    /// Emitted after nearest-sample values patched the primary gaps.
    FallbackApplied {
        /// Per-pass cell counts.
        report: InterpolationReport,
    },

    /// Emitted when a polygon's extent misses the lattice and its test is skipped.
    PolygonSkipped {
        /// Index of the polygon in the boundary.
        index: usize,
    },

    /// Emitted after a polygon was rasterized.
    PolygonRasterized {
        /// Index of the polygon in the boundary.
        index: usize,
        /// Cells inside this polygon.
        cells: usize,
    },

    /// Emitted when the land mask is complete.
    MaskBuilt {
        /// Summary of the masking pass.
        report: MaskReport,
    },

    /// Emitted when the run finishes.
    RunFinished {
        /// Cells holding a value in the final field.
        defined_cells: usize,
        /// Total cells in the final field.
        total_cells: usize,
    },

    /// Non-fatal warning generated during a run.
    Warning {
        /// Context string (e.g. stage name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`FieldEvent`], used by sinks to opt out of event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldEventKind {
    RunStarted,
    LatticeBuilt,
    PrimaryPassFinished,
    FallbackApplied,
    PolygonSkipped,
    PolygonRasterized,
    MaskBuilt,
    RunFinished,
    Warning,
}

impl FieldEvent {
    pub fn kind(&self) -> FieldEventKind {
        match self {
            FieldEvent::RunStarted { .. } => FieldEventKind::RunStarted,
            FieldEvent::LatticeBuilt { .. } => FieldEventKind::LatticeBuilt,
            FieldEvent::PrimaryPassFinished { .. } => FieldEventKind::PrimaryPassFinished,
            FieldEvent::FallbackApplied { .. } => FieldEventKind::FallbackApplied,
            FieldEvent::PolygonSkipped { .. } => FieldEventKind::PolygonSkipped,
            FieldEvent::PolygonRasterized { .. } => FieldEventKind::PolygonRasterized,
            FieldEvent::MaskBuilt { .. } => FieldEventKind::MaskBuilt,
            FieldEvent::RunFinished { .. } => FieldEventKind::RunFinished,
            FieldEvent::Warning { .. } => FieldEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`FieldEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: FieldEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: FieldEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: FieldEvent) {}

    #[inline]
    fn wants(&self, _kind: FieldEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(FieldEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(FieldEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(FieldEvent),
{
    #[inline]
    fn send(&mut self, event: FieldEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<FieldEvent>,
    only: Option<Vec<FieldEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collects only the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = FieldEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<FieldEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[FieldEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: FieldEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: FieldEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: FieldEvent) {
        if self.sinks.is_empty() {
            return;
        }
        let last_idx = self.sinks.len() - 1;
        for i in 0..last_idx {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last_idx].send(event);
    }

    fn wants(&self, kind: FieldEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
