//! Error types for NetCDF cube I/O.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF reading and writing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// The file contents do not form a consistent cube
    #[error("Invalid cube: {0}")]
    InvalidCube(#[from] spot_common::CubeError),

    /// Failure reported by libnetcdf while writing
    #[error("Write failed: {0}")]
    WriteError(String),
}
