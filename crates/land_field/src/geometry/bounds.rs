//! Axis-aligned bounding boxes in lon/lat space.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis-aligned rectangle `{min_x, max_x, min_y, max_y}`.
///
/// Used both as the region a lattice spans and as the extent of a polygon.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds without validation.
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Creates bounds that must be usable as a lattice region.
    pub fn try_new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let bounds = Self::new(min_x, max_x, min_y, max_y);
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks `min < max` on both axes with finite coordinates.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidRegion(format!(
                "non-finite coordinates in {self:?}"
            )));
        }
        if self.min_x >= self.max_x {
            return Err(Error::InvalidRegion(format!(
                "min_x ({}) must be < max_x ({})",
                self.min_x, self.max_x
            )));
        }
        if self.min_y >= self.max_y {
            return Err(Error::InvalidRegion(format!(
                "min_y ({}) must be < max_y ({})",
                self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    /// Smallest bounds enclosing all points, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DVec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first.x, first.x, first.y, first.y);
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn min(&self) -> DVec2 {
        DVec2::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(self.max_x, self.max_y)
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Inclusive overlap test; touching edges count as intersecting.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grows the bounds by `margin` on every side.
    pub fn expand(&self, margin: DVec2) -> Self {
        Self::new(
            self.min_x - margin.x,
            self.max_x + margin.x,
            self.min_y - margin.y,
            self.max_y + margin.y,
        )
    }

    /// Union of two bounds.
    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.max_x.max(other.max_x),
            self.min_y.min(other.min_y),
            self.max_y.max(other.max_y),
        )
    }
}
