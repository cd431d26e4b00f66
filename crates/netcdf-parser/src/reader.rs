//! Reading CF NetCDF files into cubes.

use std::collections::HashSet;
use std::path::Path;

use spot_common::{CellMethod, Coord, CoordValues, Cube, Dimension};
use tracing::{debug, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{from_netcdf_attr, get_f64_attr, get_string_attr, silence_hdf5_errors};

/// Global attributes that describe the file rather than the data.
const FILE_ATTRIBUTES: [&str; 1] = ["Conventions"];

/// Variable attributes whose values name other (non-data) variables.
const REFERENCE_ATTRIBUTES: [&str; 4] =
    ["coordinates", "bounds", "grid_mapping", "ancillary_variables"];

/// Load a single cube from a CF NetCDF file.
///
/// The data variable is `variable` when given. Otherwise it is the only
/// variable that is neither a dimension coordinate nor referenced by another
/// variable; a file holding several such variables is rejected.
pub fn load_cube<P: AsRef<Path>>(path: P, variable: Option<&str>) -> NetCdfResult<Cube> {
    silence_hdf5_errors();

    let path = path.as_ref();
    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open NetCDF {}: {}", path.display(), e))
    })?;

    let data_var = select_data_variable(&file, variable)?;
    let var_name = data_var.name();

    let dims: Vec<Dimension> = data_var
        .dimensions()
        .iter()
        .map(|d| Dimension::new(d.name(), d.len()))
        .collect();

    let raw: Vec<f32> = data_var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", var_name, e)))?;

    // Fill and missing values become NaN
    let fill_value = get_f64_attr(&data_var, "_FillValue").map(|v| v as f32);
    let missing_value = get_f64_attr(&data_var, "missing_value").map(|v| v as f32);
    let data: Vec<f32> = raw
        .into_iter()
        .map(|v| {
            if Some(v) == fill_value || Some(v) == missing_value {
                f32::NAN
            } else {
                v
            }
        })
        .collect();

    let name = get_string_attr(&data_var, "standard_name")
        .or_else(|| get_string_attr(&data_var, "long_name"))
        .unwrap_or_else(|| var_name.clone());
    let units = get_string_attr(&data_var, "units").unwrap_or_else(|| "1".to_string());

    let mut cube = Cube::new(name, units, dims, data)?;

    let mut coord_names: Vec<String> = cube
        .dims()
        .iter()
        .map(|d| d.name.clone())
        .filter(|n| file.variable(n).is_some())
        .collect();
    if let Some(listed) = get_string_attr(&data_var, "coordinates") {
        for name in listed.split_whitespace() {
            if !coord_names.iter().any(|n| n == name) {
                coord_names.push(name.to_string());
            }
        }
    }

    for coord_name in &coord_names {
        let Some(coord_var) = file.variable(coord_name) else {
            warn!(coord = %coord_name, "Listed coordinate variable not found, skipping");
            continue;
        };
        if let Some(coord) = read_coord(&coord_var, &cube)? {
            cube.add_coord(coord)?;
        }
    }

    if let Some(methods) = get_string_attr(&data_var, "cell_methods") {
        match CellMethod::parse_list(&methods) {
            Ok(parsed) => cube.cell_methods = parsed,
            Err(e) => warn!(error = %e, "Ignoring unparseable cell_methods"),
        }
    }

    for attr in file.attributes() {
        let key = attr.name().to_string();
        if FILE_ATTRIBUTES.contains(&key.as_str()) {
            continue;
        }
        match attr.value() {
            Ok(value) => {
                if let Some(value) = from_netcdf_attr(value) {
                    cube.attributes.insert(key, value);
                }
            }
            Err(e) => warn!(attribute = %key, error = %e, "Failed to read global attribute"),
        }
    }

    debug!(
        path = %path.display(),
        name = %cube.name,
        shape = ?cube.shape(),
        coords = cube.coords().len(),
        "Loaded cube"
    );

    Ok(cube)
}

fn select_data_variable<'f>(
    file: &'f netcdf::File,
    requested: Option<&str>,
) -> NetCdfResult<netcdf::Variable<'f>> {
    if let Some(name) = requested {
        return file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)));
    }

    let mut referenced: HashSet<String> = HashSet::new();
    for var in file.variables() {
        for key in REFERENCE_ATTRIBUTES {
            if let Some(names) = get_string_attr(&var, key) {
                referenced.extend(
                    names
                        .split_whitespace()
                        .map(|n| n.trim_end_matches(':').to_string()),
                );
            }
        }
    }

    let mut candidates: Vec<netcdf::Variable<'f>> = file
        .variables()
        .filter(|var| {
            let name = var.name();
            let is_dim_coord =
                var.dimensions().len() == 1 && var.dimensions()[0].name() == name;
            !is_dim_coord && !referenced.contains(&name)
        })
        .collect();

    if candidates.len() > 1 {
        let names: Vec<String> = candidates.iter().map(|v| v.name()).collect();
        return Err(NetCdfError::InvalidFormat(format!(
            "Multiple data variables found: {}",
            names.join(", ")
        )));
    }

    candidates
        .pop()
        .ok_or_else(|| NetCdfError::MissingData("data variable".to_string()))
}

/// Read a coordinate variable, mapping its dimensions onto the cube.
///
/// A single-valued variable on dimensions the cube lacks is a scalar
/// coordinate. Anything else off the cube's dimensions is skipped.
fn read_coord(var: &netcdf::Variable, cube: &Cube) -> NetCdfResult<Option<Coord>> {
    let name = var.name();
    let var_dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let len: usize = var.dimensions().iter().map(|d| d.len()).product();

    let mapped: Option<Vec<usize>> = var_dims.iter().map(|d| cube.dim_index(d)).collect();
    let dims = match mapped {
        Some(dims) => dims,
        None if len == 1 => Vec::new(),
        None => {
            warn!(coord = %name, dims = ?var_dims, "Coordinate spans dimensions not on the data variable, skipping");
            return Ok(None);
        }
    };

    let units = get_string_attr(var, "units").unwrap_or_else(|| "1".to_string());
    let values = read_coord_values(var, &name, var_dims.len(), len)?;

    Ok(Some(Coord {
        name,
        units,
        values,
        dims,
    }))
}

fn read_coord_values(
    var: &netcdf::Variable,
    name: &str,
    ndim: usize,
    len: usize,
) -> NetCdfResult<CoordValues> {
    match var.get_values::<f64, _>(..) {
        Ok(points) => Ok(CoordValues::Numeric(points)),
        Err(numeric_err) => {
            // Not numeric: text labels are stored as NetCDF-4 strings
            if ndim > 1 {
                return Err(NetCdfError::InvalidFormat(format!(
                    "Cannot read multi-dimensional coordinate {}: {}",
                    name, numeric_err
                )));
            }
            let labels = if ndim == 0 {
                vec![var.get_string(..).map_err(|e| {
                    NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e))
                })?]
            } else {
                (0..len)
                    .map(|i| var.get_string((i,)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e))
                    })?
            };
            Ok(CoordValues::Text(labels))
        }
    }
}
