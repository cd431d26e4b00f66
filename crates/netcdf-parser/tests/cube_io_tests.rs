//! Tests for saving cubes to NetCDF and loading them back.

use netcdf_parser::{load_cube, save_cube, NetCdfError};
use spot_common::{AttributeValue, CellMethod, Coord, CoordValues};
use test_utils::{default_sites, neighbour_cube, scratch_dir, temperature_cube, SCREEN_HEIGHT_M};

// ============================================================================
// Gridded cubes
// ============================================================================

#[test]
fn test_gridded_cube_survives_save_and_load() {
    let dir = scratch_dir();
    let path = dir.path().join("temperature.nc");
    let mut cube = temperature_cube();
    cube.cell_methods = vec![CellMethod::new("maximum", vec!["time".to_string()])];

    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();

    assert_eq!(loaded.name, "air_temperature");
    assert_eq!(loaded.units, "K");
    assert_eq!(loaded.shape(), cube.shape());
    assert_eq!(loaded.data(), cube.data());
    assert_eq!(loaded.single_point("height"), Some(SCREEN_HEIGHT_M));
    assert_eq!(loaded.coord("height").unwrap().units, "m");
    assert_eq!(loaded.validity_time(), cube.validity_time());
    assert_eq!(
        loaded.coord("projection_x_coordinate").unwrap().dims,
        vec![1]
    );
    assert_eq!(loaded.cell_methods, cube.cell_methods);
    assert_eq!(
        loaded.attribute("mosg__grid_type"),
        Some(&AttributeValue::Text("standard".to_string()))
    );
    assert!(loaded.attribute("Conventions").is_none());
}

#[test]
fn test_nan_values_are_preserved() {
    let dir = scratch_dir();
    let path = dir.path().join("with_nans.nc");
    let mut cube = temperature_cube();
    let mut data = cube.data().to_vec();
    data[3] = f32::NAN;
    cube.set_data(data).unwrap();

    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();
    assert!(loaded.data()[3].is_nan());
    assert_eq!(loaded.data()[4], cube.data()[4]);
}

// ============================================================================
// Text coordinates
// ============================================================================

#[test]
fn test_neighbour_cube_text_coords() {
    let dir = scratch_dir();
    let path = dir.path().join("neighbours.nc");
    let cube = neighbour_cube(&default_sites());

    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();

    assert_eq!(loaded.name, "grid_neighbours");
    assert_eq!(loaded.data(), cube.data());
    assert_eq!(
        loaded.coord("neighbour_selection_method"),
        cube.coord("neighbour_selection_method")
    );
    assert_eq!(loaded.coord("wmo_id"), cube.coord("wmo_id"));
    assert_eq!(loaded.coord("altitude"), cube.coord("altitude"));
}

#[test]
fn test_scalar_text_coord() {
    let dir = scratch_dir();
    let path = dir.path().join("scalar_text.nc");
    let mut cube = temperature_cube();
    cube.add_coord(Coord::text("model_configuration", vec!["uk_det".to_string()]))
        .unwrap();

    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();
    let coord = loaded.coord("model_configuration").unwrap();
    assert!(coord.is_scalar());
    assert_eq!(coord.values, CoordValues::Text(vec!["uk_det".to_string()]));
}

// ============================================================================
// Saving in place
// ============================================================================

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A cube whose data variable name collides with one of its coordinates.
fn unwritable_cube() -> spot_common::Cube {
    let mut cube = temperature_cube();
    cube.name = "height".to_string();
    cube
}

#[test]
fn test_overwrite_replaces_file_without_leftovers() {
    let dir = scratch_dir();
    let path = dir.path().join("spot.nc");
    save_cube(&temperature_cube(), &path).unwrap();

    let mut warmer = temperature_cube();
    let data: Vec<f32> = warmer.data().iter().map(|t| t + 1.0).collect();
    warmer.set_data(data).unwrap();
    save_cube(&warmer, &path).unwrap();

    assert_eq!(load_cube(&path, None).unwrap().data(), warmer.data());
    assert_eq!(entries(dir.path()), vec!["spot.nc"]);
}

#[test]
fn test_failed_save_leaves_no_file() {
    let dir = scratch_dir();
    let path = dir.path().join("spot.nc");

    assert!(save_cube(&unwritable_cube(), &path).is_err());
    assert!(!path.exists());
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_failed_save_keeps_existing_file() {
    let dir = scratch_dir();
    let path = dir.path().join("spot.nc");
    let original = temperature_cube();
    save_cube(&original, &path).unwrap();

    assert!(save_cube(&unwritable_cube(), &path).is_err());
    assert_eq!(load_cube(&path, None).unwrap().data(), original.data());
    assert_eq!(entries(dir.path()), vec!["spot.nc"]);
}

// ============================================================================
// Error cases
// ============================================================================

#[test]
fn test_missing_file() {
    let dir = scratch_dir();
    let result = load_cube(dir.path().join("absent.nc"), None);
    assert!(matches!(result, Err(NetCdfError::IoError(_))));
}

#[test]
fn test_not_netcdf() {
    let dir = scratch_dir();
    let path = dir.path().join("plain.nc");
    std::fs::write(&path, b"not a netcdf file").unwrap();
    let result = load_cube(&path, None);
    assert!(matches!(result, Err(NetCdfError::InvalidFormat(_))));
}

#[test]
fn test_requested_variable_missing() {
    let dir = scratch_dir();
    let path = dir.path().join("temperature.nc");
    save_cube(&temperature_cube(), &path).unwrap();
    let result = load_cube(&path, Some("wind_speed"));
    assert!(matches!(result, Err(NetCdfError::MissingData(_))));
}
