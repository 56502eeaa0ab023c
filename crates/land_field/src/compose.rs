//! Restricts an interpolated field to land.
use crate::error::Result;
use crate::raster::{Field, Mask, Raster};

/// Keeps `field` values where `mask` is `true` and marks every other cell missing.
///
/// Fails with [`crate::error::Error::ShapeMismatch`] when the shapes differ.
pub fn compose(field: &Field, mask: &Mask) -> Result<Field> {
    field.ensure_same_shape(mask)?;
    let data = field
        .as_slice()
        .iter()
        .zip(mask.as_slice())
        .map(|(v, land)| if *land { *v } else { None })
        .collect();
    Raster::from_vec(field.rows(), field.cols(), data)
}
