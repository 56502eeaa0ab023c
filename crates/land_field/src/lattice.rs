//! Regular evaluation lattice over a rectangular region.
//!
//! This module defines [`Lattice`], the grid every derived raster (interpolated field,
//! mask, final field) is aligned with. Point `(i, j)` sits at
//! `(min_x + i * dx, min_y + j * dy)` with both endpoints included, so `i` walks
//! longitude over `rows` steps and `j` walks latitude over `cols` steps. Linear storage
//! index is `i * cols + j`.
use std::ops::Range;

use glam::DVec2;

use crate::error::{Error, Result};
use crate::geometry::Bounds;

/// Immutable regular grid of `rows x cols` evaluation points spanning a region.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    region: Bounds,
    rows: usize,
    cols: usize,
    dx: f64,
    dy: f64,
}

impl Lattice {
    /// Builds a lattice with uniform spacing and exact endpoints.
    ///
    /// Fails with [`Error::InvalidRegion`] when the region is malformed or either
    /// resolution is below 2.
    pub fn build(region: Bounds, rows: usize, cols: usize) -> Result<Self> {
        region.validate()?;
        if rows < 2 || cols < 2 {
            return Err(Error::InvalidRegion(format!(
                "lattice needs at least 2x2 points, got {rows}x{cols}"
            )));
        }
        Ok(Self {
            region,
            rows,
            cols,
            dx: region.width() / (rows - 1) as f64,
            dy: region.height() / (cols - 1) as f64,
        })
    }

    pub fn region(&self) -> Bounds {
        self.region
    }

    /// Number of points along x.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of points along y.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`, the shape shared by every aligned raster.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always `false`; a valid lattice has at least four points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Spacing on both axes.
    pub fn step(&self) -> DVec2 {
        DVec2::new(self.dx, self.dy)
    }

    /// X coordinate of row `i`. The last row is exactly `max_x`.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        if i + 1 >= self.rows {
            self.region.max_x
        } else {
            self.region.min_x + i as f64 * self.dx
        }
    }

    /// Y coordinate of column `j`. The last column is exactly `max_y`.
    #[inline]
    pub fn y(&self, j: usize) -> f64 {
        if j + 1 >= self.cols {
            self.region.max_y
        } else {
            self.region.min_y + j as f64 * self.dy
        }
    }

    #[inline]
    pub fn point(&self, i: usize, j: usize) -> DVec2 {
        DVec2::new(self.x(i), self.y(j))
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols, "lattice index out of range");
        i * self.cols + j
    }

    /// Inverse of [`Lattice::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.cols, idx % self.cols)
    }

    /// Nearest lattice indices for a world position, or `None` outside the region.
    pub fn world_to_index(&self, p: DVec2) -> Option<(usize, usize)> {
        if !self.region.contains(p) {
            return None;
        }
        let i = ((p.x - self.region.min_x) / self.dx).round() as usize;
        let j = ((p.y - self.region.min_y) / self.dy).round() as usize;
        Some((i.min(self.rows - 1), j.min(self.cols - 1)))
    }

    /// Row indices whose x coordinate may fall inside `[lo, hi]`.
    ///
    /// The window is padded by one step on each side so callers that run an exact test
    /// inside it never miss a point to rounding.
    pub fn x_index_range(&self, lo: f64, hi: f64) -> Range<usize> {
        index_window(lo, hi, self.region.min_x, self.dx, self.rows)
    }

    /// Column indices whose y coordinate may fall inside `[lo, hi]`, padded like
    /// [`Lattice::x_index_range`].
    pub fn y_index_range(&self, lo: f64, hi: f64) -> Range<usize> {
        index_window(lo, hi, self.region.min_y, self.dy, self.cols)
    }

    /// Iterates `(i, j, point)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, DVec2)> + '_ {
        (0..self.rows).flat_map(move |i| (0..self.cols).map(move |j| (i, j, self.point(i, j))))
    }

    /// All points in storage order as interop vectors for rendering collaborators.
    pub fn to_mint_points(&self) -> Vec<mint::Point2<f64>> {
        self.iter()
            .map(|(_, _, p)| mint::Point2 { x: p.x, y: p.y })
            .collect()
    }
}

fn index_window(lo: f64, hi: f64, origin: f64, step: f64, count: usize) -> Range<usize> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return 0..0;
    }
    let first = ((lo - origin) / step).floor() - 1.0;
    let last = ((hi - origin) / step).ceil() + 1.0;
    if last < 0.0 || first > (count - 1) as f64 {
        return 0..0;
    }
    let start = first.max(0.0) as usize;
    let end = (last.min((count - 1) as f64) as usize) + 1;
    start..end
}
