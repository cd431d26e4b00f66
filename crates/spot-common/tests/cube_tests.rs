//! Tests for Cube construction and coordinate handling.

use spot_common::{AttributeValue, Coord, Cube, CubeError, Dimension};

fn spot_cube() -> Cube {
    Cube::new(
        "air_temperature",
        "K",
        vec![Dimension::new("realization", 2), Dimension::new("spot_index", 3)],
        vec![280.0, 281.0, 282.0, 283.0, 284.0, 285.0],
    )
    .unwrap()
}

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_cube_new() {
    let cube = spot_cube();
    assert_eq!(cube.shape(), vec![2, 3]);
    assert_eq!(cube.ndim(), 2);
    assert_eq!(cube.dim_index("spot_index"), Some(1));
    assert_eq!(cube.data().len(), 6);
}

#[test]
fn test_cube_new_shape_mismatch() {
    let result = Cube::new(
        "air_temperature",
        "K",
        vec![Dimension::new("spot_index", 3)],
        vec![1.0, 2.0],
    );
    assert!(matches!(
        result,
        Err(CubeError::ShapeMismatch {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_set_data_keeps_shape() {
    let mut cube = spot_cube();
    assert!(cube.set_data(vec![0.0; 5]).is_err());
    cube.set_data(vec![1.0; 6]).unwrap();
    assert!(cube.data().iter().all(|&v| v == 1.0));
}

// ============================================================================
// Coordinate tests
// ============================================================================

#[test]
fn test_add_coord_validates_length() {
    let mut cube = spot_cube();
    let result = cube.add_coord(Coord::numeric("altitude", "m", vec![1.0, 2.0]).on_dim(1));
    assert!(matches!(
        result,
        Err(CubeError::CoordLengthMismatch { expected: 3, actual: 2, .. })
    ));
}

#[test]
fn test_add_coord_validates_dimension() {
    let mut cube = spot_cube();
    let result = cube.add_coord(Coord::numeric("altitude", "m", vec![1.0]).on_dim(4));
    assert!(matches!(result, Err(CubeError::UnknownDimension { dim: 4, .. })));
}

#[test]
fn test_add_coord_rejects_duplicates() {
    let mut cube = spot_cube();
    cube.add_coord(Coord::scalar("height", "m", 1.5)).unwrap();
    let result = cube.add_coord(Coord::scalar("height", "m", 10.0));
    assert!(matches!(result, Err(CubeError::DuplicateCoord(_))));
}

#[test]
fn test_replace_coord() {
    let mut cube = spot_cube();
    cube.add_coord(Coord::scalar("height", "m", 1.5)).unwrap();
    cube.replace_coord(Coord::scalar("height", "m", 10.0)).unwrap();
    assert_eq!(cube.single_point("height"), Some(10.0));
    assert_eq!(cube.coords().len(), 1);
}

#[test]
fn test_multi_dimensional_coord() {
    let mut cube = spot_cube();
    let weights = Coord {
        dims: vec![0, 1],
        ..Coord::numeric("weights", "1", vec![0.5; 6])
    };
    cube.add_coord(weights).unwrap();
    assert_eq!(cube.coord("weights").unwrap().dims, vec![0, 1]);
}

#[test]
fn test_remove_coord() {
    let mut cube = spot_cube();
    cube.add_coord(Coord::scalar("height", "m", 1.5)).unwrap();
    assert!(cube.remove_coord("height").is_some());
    assert!(cube.remove_coord("height").is_none());
    assert!(cube.single_point("height").is_none());
}

// ============================================================================
// Attribute tests
// ============================================================================

#[test]
fn test_attributes() {
    let mut cube = spot_cube();
    cube.set_attribute("title", "UKV Model Forecast");
    cube.set_attribute("mosg__grid_version", 1_i64);
    assert_eq!(
        cube.attribute("title").and_then(|v| v.as_str()),
        Some("UKV Model Forecast")
    );
    assert_eq!(
        cube.attribute("mosg__grid_version"),
        Some(&AttributeValue::Int(1))
    );
}
