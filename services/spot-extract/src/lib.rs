//! Spot extraction command-line tool.
//!
//! Reads a neighbour cube and a gridded diagnostic from NetCDF, extracts the
//! diagnostic at every spot site, optionally adjusts temperatures with a
//! lapse rate and amends metadata, then writes the spot cube to NetCDF.

pub mod args;
pub mod logging;
pub mod pipeline;

pub use args::{Args, GridMetadataIdentifier};
pub use pipeline::{run, CubeStore, ExtractRequest, NetCdfStore, RunReport, RunWarning};
