//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed regions, too few samples, empty boundaries, raster shape mismatches,
//! invalid configuration, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// The boundary holds no polygons. Callers treat this as "nothing is land".
    #[error("boundary contains no polygons")]
    EmptyBoundary,

    #[error("raster shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `false` for conditions that yield a degenerate but well-defined result.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::EmptyBoundary)
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
