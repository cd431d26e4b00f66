//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use spot_processor::{NeighbourSelection, DEFAULT_GRID_METADATA_IDENTIFIER};

use crate::pipeline::ExtractRequest;

/// Literal accepted on the command line to disable the grid identity check.
pub const NO_IDENTIFIER: &str = "None";

/// Grid metadata identifier, absent when the check is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMetadataIdentifier(pub Option<String>);

fn parse_identifier(value: &str) -> Result<GridMetadataIdentifier, String> {
    match value {
        NO_IDENTIFIER => Ok(GridMetadataIdentifier(None)),
        "" => Err("identifier must not be empty; use None to skip the grid check".to_string()),
        other => Ok(GridMetadataIdentifier(Some(other.to_string()))),
    }
}

/// Extract diagnostic data at spot sites.
#[derive(Parser, Debug)]
#[command(name = "improver-spot-extract")]
#[command(about = "Extract diagnostic data from gridded fields for spot data sites")]
pub struct Args {
    /// Path to a NetCDF file of spot-site neighbours for the diagnostic grid
    #[arg(value_name = "NEIGHBOUR_FILEPATH")]
    pub neighbour_filepath: PathBuf,

    /// Path to a NetCDF file containing the diagnostic data to extract
    #[arg(value_name = "DIAGNOSTIC_FILEPATH")]
    pub diagnostic_filepath: PathBuf,

    /// Output file path for the spot data
    #[arg(value_name = "OUTPUT_FILEPATH")]
    pub output_filepath: PathBuf,

    /// Use the nearest land point to each site
    #[arg(long = "land_constraint")]
    pub land_constraint: bool,

    /// Use the nearby point with the smallest height difference to each site
    #[arg(long = "minimum_dz")]
    pub minimum_dz: bool,

    /// NetCDF file of temperature lapse rates used to adjust extracted
    /// temperatures to the site altitude
    #[arg(long = "temperature_lapse_rate_filepath", value_name = "PATH")]
    pub temperature_lapse_rate_filepath: Option<PathBuf>,

    /// Substring naming the attributes that must match between the neighbour
    /// and diagnostic cubes, or None to skip the check
    #[arg(
        long = "grid_metadata_identifier",
        value_name = "STRING",
        default_value = DEFAULT_GRID_METADATA_IDENTIFIER,
        value_parser = parse_identifier
    )]
    pub grid_metadata_identifier: GridMetadataIdentifier,

    /// JSON file of metadata amendments for the output cube
    #[arg(long = "json_file", value_name = "JSON_FILE")]
    pub json_file: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", env = "SPOT_EXTRACT_LOG")]
    pub log_level: String,
}

impl Args {
    pub fn to_request(&self) -> ExtractRequest {
        ExtractRequest {
            neighbour_path: self.neighbour_filepath.clone(),
            diagnostic_path: self.diagnostic_filepath.clone(),
            output_path: self.output_filepath.clone(),
            selection: NeighbourSelection::new(self.land_constraint, self.minimum_dz),
            lapse_rate_path: self.temperature_lapse_rate_filepath.clone(),
            grid_metadata_identifier: self.grid_metadata_identifier.0.clone(),
            metadata_path: self.json_file.clone(),
        }
    }
}
