//! The extraction run: load, extract, adjust, amend, save.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use netcdf_parser::{load_cube, save_cube};
use spot_common::Cube;
use spot_processor::lapse_rate::HEIGHT;
use spot_processor::{
    amend_metadata, single_height_coord, MetadataAmendments, NeighbourSelection, SpotExtraction,
    SpotLapseRateAdjust, TEMPERATURE,
};
use tracing::{debug, info, warn};

/// Where cubes are read from and written to.
pub trait CubeStore {
    fn load(&self, path: &Path) -> Result<Cube>;
    fn save(&self, cube: &Cube, path: &Path) -> Result<()>;
}

/// Cubes stored as NetCDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetCdfStore;

impl CubeStore for NetCdfStore {
    fn load(&self, path: &Path) -> Result<Cube> {
        Ok(load_cube(path, None)?)
    }

    fn save(&self, cube: &Cube, path: &Path) -> Result<()> {
        Ok(save_cube(cube, path)?)
    }
}

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub neighbour_path: PathBuf,
    pub diagnostic_path: PathBuf,
    pub output_path: PathBuf,
    pub selection: NeighbourSelection,
    pub lapse_rate_path: Option<PathBuf>,
    pub grid_metadata_identifier: Option<String>,
    pub metadata_path: Option<PathBuf>,
}

/// A condition that skipped the lapse rate adjustment without failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    /// A lapse rate was supplied for a diagnostic that is not temperature.
    NotTemperature { diagnostic: String },
    /// The lapse rate and diagnostic heights differ.
    HeightMismatch {
        diagnostic: Option<String>,
        lapse_rate: String,
    },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::NotTemperature { diagnostic } => write!(
                f,
                "A lapse rate cube was provided, but the diagnostic being processed is {} \
                 rather than {}. The lapse rate adjustment has not been applied.",
                diagnostic, TEMPERATURE
            ),
            RunWarning::HeightMismatch {
                diagnostic,
                lapse_rate,
            } => write!(
                f,
                "A lapse rate cube was provided, but the height of the temperature data ({}) \
                 does not match that of the lapse rate data ({}). The lapse rate adjustment \
                 has not been applied.",
                diagnostic.as_deref().unwrap_or("none"),
                lapse_rate
            ),
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub method: String,
    pub lapse_rate_applied: bool,
    pub metadata_amended: bool,
    pub warnings: Vec<RunWarning>,
}

/// Run one spot extraction. The output is written only if every earlier
/// stage succeeds.
pub fn run<S: CubeStore + ?Sized>(store: &S, request: &ExtractRequest) -> Result<RunReport> {
    let neighbour_cube = store
        .load(&request.neighbour_path)
        .with_context(|| format!("loading neighbour cube {}", request.neighbour_path.display()))?;
    let diagnostic_cube = store.load(&request.diagnostic_path).with_context(|| {
        format!(
            "loading diagnostic cube {}",
            request.diagnostic_path.display()
        )
    })?;
    info!(
        diagnostic = %diagnostic_cube.name,
        shape = ?diagnostic_cube.shape(),
        validity_time = ?diagnostic_cube.validity_time().map(|t| t.to_rfc3339()),
        "Loaded input cubes"
    );

    let method = request.selection.method_name();
    let identifier = request.grid_metadata_identifier.clone();
    debug!(method = %method, identifier = ?identifier, "Resolved neighbour selection");

    let mut result = SpotExtraction::new(method.clone(), identifier.clone())
        .process(&neighbour_cube, &diagnostic_cube)?;

    let mut report = RunReport {
        method: method.clone(),
        lapse_rate_applied: false,
        metadata_amended: false,
        warnings: Vec::new(),
    };

    if let Some(lapse_path) = &request.lapse_rate_path {
        if diagnostic_cube.name != TEMPERATURE {
            report.warnings.push(RunWarning::NotTemperature {
                diagnostic: diagnostic_cube.name.clone(),
            });
        } else {
            let lapse_rate_cube = store.load(lapse_path).with_context(|| {
                format!("loading lapse rate cube {}", lapse_path.display())
            })?;
            let lapse_height = single_height_coord(&lapse_rate_cube)?;
            let diagnostic_height = diagnostic_cube.coord(HEIGHT);

            if diagnostic_height.is_some_and(|h| h.same_values(lapse_height)) {
                result = SpotLapseRateAdjust::new(method, identifier)
                    .process(&result, &neighbour_cube, &lapse_rate_cube)?;
                report.lapse_rate_applied = true;
                info!(path = %lapse_path.display(), "Applied temperature lapse rate");
            } else {
                report.warnings.push(RunWarning::HeightMismatch {
                    diagnostic: diagnostic_height.map(describe_height),
                    lapse_rate: describe_height(lapse_height),
                });
            }
        }
    }

    for warning in &report.warnings {
        warn!("{}", warning);
    }

    if let Some(metadata_path) = &request.metadata_path {
        let amendments = MetadataAmendments::from_file(metadata_path).with_context(|| {
            format!("reading metadata amendments {}", metadata_path.display())
        })?;
        amend_metadata(&mut result, &amendments)?;
        report.metadata_amended = true;
    }

    store
        .save(&result, &request.output_path)
        .with_context(|| format!("saving spot cube {}", request.output_path.display()))?;
    info!(
        path = %request.output_path.display(),
        sites = result.dims().last().map(|d| d.len).unwrap_or(0),
        "Saved spot data"
    );

    Ok(report)
}

fn describe_height(coord: &spot_common::Coord) -> String {
    match coord.points() {
        Some(points) => format!("{:?} {}", points, coord.units),
        None => format!("{:?}", coord.values),
    }
}
