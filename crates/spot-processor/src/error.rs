//! Error types for spot processing.

use thiserror::Error;

use spot_common::CubeError;

/// Errors that can occur while extracting or adjusting spot data.
#[derive(Error, Debug)]
pub enum SpotError {
    /// The named cube has no height coordinate, or one with several values.
    #[error("{0} cube lacks a single valued height coordinate")]
    MissingHeightCoordinate(String),

    /// The neighbour cube does not hold the requested selection method.
    #[error("Requested neighbour_selection_method \"{requested}\" is not available in neighbour cube (available: {})", available.join(", "))]
    MethodNotAvailable {
        requested: String,
        available: Vec<String>,
    },

    /// Grid identity attributes differ between cubes.
    #[error("Cubes do not share the metadata identified by the grid_metadata_identifier ({0})")]
    GridMismatch(String),

    /// The neighbour cube is not laid out as expected.
    #[error("invalid neighbour cube: {0}")]
    InvalidNeighbourCube(String),

    /// Array shapes cannot be combined.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A site's neighbour lies outside the diagnostic grid.
    #[error("neighbour ({x}, {y}) of spot site {site} is outside the {nx}x{ny} grid")]
    IndexOutOfRange {
        site: usize,
        x: usize,
        y: usize,
        nx: usize,
        ny: usize,
    },

    /// Inputs to the lapse rate adjustment are not what it requires.
    #[error("invalid lapse rate input: {0}")]
    InvalidLapseRate(String),

    /// Metadata amendments could not be parsed or applied.
    #[error("invalid metadata amendment: {0}")]
    InvalidMetadata(String),

    /// Cube consistency error.
    #[error(transparent)]
    Cube(#[from] CubeError),

    /// Storage/IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpotError {
    /// Create an InvalidNeighbourCube error.
    pub fn invalid_neighbour_cube(msg: impl Into<String>) -> Self {
        Self::InvalidNeighbourCube(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create an InvalidLapseRate error.
    pub fn invalid_lapse_rate(msg: impl Into<String>) -> Self {
        Self::InvalidLapseRate(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

impl From<serde_json::Error> for SpotError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Result type for spot processing operations.
pub type SpotResult<T> = std::result::Result<T, SpotError>;
