//! NetCDF reader and writer for cubes.
//!
//! This crate maps CF-convention NetCDF files onto [`spot_common::Cube`] and
//! back, using the native `netcdf` library (libnetcdf + HDF5).
//!
//! # File layout
//!
//! - One data variable per file. Its `standard_name` (or `long_name`) and
//!   `units` become the cube name and units.
//! - Variables named after a dimension are dimension coordinates. Other
//!   coordinates are listed in the data variable's `coordinates` attribute.
//!   Single-valued coordinates off the data dimensions are scalar coordinates.
//! - Text coordinates (site identifiers, neighbour selection methods) are
//!   NetCDF-4 string variables.
//! - Global attributes carry the cube attributes.

pub mod error;
pub mod native;
pub mod reader;
pub mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use reader::load_cube;
pub use writer::save_cube;
