//! Writing cubes to CF NetCDF files.

use std::path::Path;

use spot_common::{CellMethod, Coord, CoordValues, Cube};
use tracing::{debug, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{silence_hdf5_errors, to_netcdf_attr};

/// CF conventions version written to every file.
pub const CONVENTIONS: &str = "CF-1.5";

fn write_err(context: &str, err: netcdf::Error) -> NetCdfError {
    NetCdfError::WriteError(format!("{}: {}", context, err))
}

/// Save a cube as a NetCDF-4 file.
///
/// One NetCDF dimension is written per cube dimension. Coordinates named
/// after their dimension become dimension coordinates, the rest are listed in
/// the data variable's `coordinates` attribute. Cube attributes are written
/// as global attributes.
///
/// The file is written beside `path` under a temporary name and renamed into
/// place once complete, so a failed save leaves no partial file and any
/// existing file at `path` untouched.
pub fn save_cube<P: AsRef<Path>>(cube: &Cube, path: P) -> NetCdfResult<()> {
    silence_hdf5_errors();

    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".")
        .suffix(".nc.tmp")
        .tempfile_in(dir)?
        .into_temp_path();

    write_file(cube, &staging)?;
    staging.persist(path).map_err(|e| NetCdfError::IoError(e.error))?;

    debug!(
        path = %path.display(),
        name = %cube.name,
        shape = ?cube.shape(),
        "Saved cube"
    );

    Ok(())
}

fn write_file(cube: &Cube, path: &Path) -> NetCdfResult<()> {
    let mut file = netcdf::create(path)
        .map_err(|e| write_err(&format!("creating {}", path.display()), e))?;

    for dim in cube.dims() {
        file.add_dimension(&dim.name, dim.len)
            .map_err(|e| write_err(&format!("dimension {}", dim.name), e))?;
    }

    let mut aux_names: Vec<&str> = Vec::new();
    for coord in cube.coords() {
        let is_dim_coord =
            coord.dims.len() == 1 && cube.dims()[coord.dims[0]].name == coord.name;
        if write_coord(&mut file, cube, coord)? && !is_dim_coord {
            aux_names.push(&coord.name);
        }
    }

    let var_name = variable_name(&cube.name);
    let dim_names: Vec<&str> = cube.dims().iter().map(|d| d.name.as_str()).collect();
    {
        let mut var = file
            .add_variable::<f32>(&var_name, &dim_names)
            .map_err(|e| write_err(&format!("variable {}", var_name), e))?;
        var.put_values(cube.data(), ..)
            .map_err(|e| write_err(&format!("writing {}", var_name), e))?;
        var.put_attribute("long_name", cube.name.as_str())
            .map_err(|e| write_err("long_name", e))?;
        var.put_attribute("units", cube.units.as_str())
            .map_err(|e| write_err("units", e))?;
        if !aux_names.is_empty() {
            var.put_attribute("coordinates", aux_names.join(" ").as_str())
                .map_err(|e| write_err("coordinates", e))?;
        }
        if !cube.cell_methods.is_empty() {
            let methods = CellMethod::format_list(&cube.cell_methods);
            var.put_attribute("cell_methods", methods.as_str())
                .map_err(|e| write_err("cell_methods", e))?;
        }
    }

    for (key, value) in &cube.attributes {
        file.add_attribute(key, to_netcdf_attr(value))
            .map_err(|e| write_err(&format!("attribute {}", key), e))?;
    }
    file.add_attribute("Conventions", CONVENTIONS)
        .map_err(|e| write_err("Conventions", e))?;

    // Dropping the handle flushes and closes the file before the rename
    drop(file);
    Ok(())
}

/// Write one coordinate variable. Returns false when it was skipped.
fn write_coord(file: &mut netcdf::FileMut, cube: &Cube, coord: &Coord) -> NetCdfResult<bool> {
    let mut dim_names: Vec<&str> = coord
        .dims
        .iter()
        .map(|&d| cube.dims()[d].name.as_str())
        .collect();

    match &coord.values {
        CoordValues::Numeric(points) => {
            let mut var = file
                .add_variable::<f64>(&coord.name, &dim_names)
                .map_err(|e| write_err(&format!("coordinate {}", coord.name), e))?;
            var.put_values(points, ..)
                .map_err(|e| write_err(&format!("writing {}", coord.name), e))?;
            var.put_attribute("units", coord.units.as_str())
                .map_err(|e| write_err("units", e))?;
        }
        CoordValues::Text(labels) => {
            if dim_names.len() > 1 {
                warn!(coord = %coord.name, "Multi-dimensional text coordinates are not written");
                return Ok(false);
            }
            // Scalar labels get a length-one dimension of their own
            if dim_names.is_empty() {
                file.add_dimension(&coord.name, 1)
                    .map_err(|e| write_err(&format!("dimension {}", coord.name), e))?;
                dim_names.push(&coord.name);
            }
            let mut var = file
                .add_string_variable(&coord.name, &dim_names)
                .map_err(|e| write_err(&format!("coordinate {}", coord.name), e))?;
            for (i, label) in labels.iter().enumerate() {
                var.put_string(label, (i,))
                    .map_err(|e| write_err(&format!("writing {}", coord.name), e))?;
            }
        }
    }

    Ok(true)
}

/// NetCDF variable name for a cube name.
fn variable_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}
