//! Error types for cube construction and manipulation.

use thiserror::Error;

/// Result type alias using CubeError.
pub type CubeResult<T> = Result<T, CubeError>;

/// Errors raised when a cube would be left in an inconsistent state.
#[derive(Debug, Error)]
pub enum CubeError {
    #[error("Data length {actual} does not match cube shape {shape:?} ({expected} values)")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Coordinate '{name}' references dimension {dim} but the cube has {ndim} dimensions")]
    UnknownDimension { name: String, dim: usize, ndim: usize },

    #[error("Coordinate '{name}' has {actual} values but its dimensions require {expected}")]
    CoordLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Coordinate '{0}' already exists on the cube")]
    DuplicateCoord(String),

    #[error("Coordinate not found: {0}")]
    CoordNotFound(String),

    #[error("Invalid cell method: {0}")]
    InvalidCellMethod(String),
}
