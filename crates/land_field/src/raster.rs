//! Raster storage aligned index-for-index with a [`Lattice`].
//!
//! [`Field`] holds an optional estimate per cell, where `None` means *missing* and is never
//! conflated with zero. [`Mask`] holds one land flag per cell.
use crate::error::{Error, Result};
use crate::lattice::Lattice;

/// A `rows x cols` grid of values in lattice storage order (`i * cols + j`).
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Scalar field with missing cells.
pub type Field = Raster<Option<f64>>;

/// Land mask, `true` inside the landmass union.
pub type Mask = Raster<bool>;

impl<T: Clone> Raster<T> {
    /// Creates a raster shaped like `lattice`, filled with `value`.
    pub fn filled(lattice: &Lattice, value: T) -> Self {
        Self {
            rows: lattice.rows(),
            cols: lattice.cols(),
            data: vec![value; lattice.len()],
        }
    }
}

impl<T> Raster<T> {
    /// Wraps existing data; fails when the length does not match the shape.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidConfig(format!(
                "raster data length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(i, j)`, or `None` when out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get(i * self.cols + j)
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get_mut(i * self.cols + j)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Fails with [`Error::ShapeMismatch`] unless `other` has the same shape.
    pub fn ensure_same_shape<U>(&self, other: &Raster<U>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Fails with [`Error::ShapeMismatch`] unless the raster matches the lattice.
    pub fn ensure_aligned(&self, lattice: &Lattice) -> Result<()> {
        if self.shape() != lattice.shape() {
            return Err(Error::ShapeMismatch {
                expected: lattice.shape(),
                actual: self.shape(),
            });
        }
        Ok(())
    }
}

impl Raster<Option<f64>> {
    /// Number of cells holding an estimate.
    pub fn defined_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.len() - self.defined_count()
    }

    /// `(min, max)` over defined cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Dense copy with `NaN` for missing cells, for renderers that expect plain floats.
    pub fn to_nan_filled(&self) -> Vec<f64> {
        self.data.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

impl Raster<bool> {
    /// Number of `true` cells.
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|v| **v).count()
    }

    /// In-place logical OR with another mask of the same shape.
    pub fn union_with(&mut self, other: &Mask) -> Result<()> {
        self.ensure_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a |= *b;
        }
        Ok(())
    }
}
