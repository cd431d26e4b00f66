//! Common test fixtures for spot extraction tests.
//!
//! This module builds small, fully described cubes that mirror the files the
//! spot extraction tool consumes: a neighbour cube, a gridded diagnostic and
//! a temperature lapse rate field, all on the same 2 km grid.

use spot_common::{AttributeValue, Coord, Cube, Dimension};
use tempfile::TempDir;

use crate::generators::{create_constant_grid, create_temperature_grid};

/// Columns in the default fixture grid.
pub const GRID_NX: usize = 5;

/// Rows in the default fixture grid.
pub const GRID_NY: usize = 4;

/// Grid spacing of the fixture grid in metres.
pub const GRID_SPACING_M: f64 = 2000.0;

/// Screen-level height of temperature diagnostics, in metres.
pub const SCREEN_HEIGHT_M: f64 = 1.5;

/// Validity time of the fixture diagnostics (2024-01-15T12:00:00Z).
pub const VALIDITY_TIME: f64 = 1_705_320_000.0;

/// Forecast reference time of the fixture diagnostics (2024-01-15T09:00:00Z).
pub const REFERENCE_TIME: f64 = 1_705_309_200.0;

/// Neighbour selection methods present on the fixture neighbour cube, in order.
pub const NEIGHBOUR_METHODS: [&str; 4] = [
    "nearest",
    "nearest_land",
    "nearest_minimum_dz",
    "nearest_land_minimum_dz",
];

/// Hash identifying the fixture grid on the neighbour cube.
pub const MODEL_GRID_HASH: &str = "7b2f9c6d1e8a4b3c";

/// Attributes that identify the fixture grid.
pub fn grid_attributes() -> Vec<(&'static str, AttributeValue)> {
    vec![
        ("mosg__grid_type", AttributeValue::from("standard")),
        ("mosg__grid_version", AttributeValue::from("1.3.0")),
        ("mosg__grid_domain", AttributeValue::from("uk_extended")),
    ]
}

/// The grid point chosen for a site by one selection method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNeighbour {
    pub x: usize,
    pub y: usize,
    /// Site altitude minus grid point altitude, in metres
    pub dz: f32,
}

impl GridNeighbour {
    pub const fn new(x: usize, y: usize, dz: f32) -> Self {
        Self { x, y, dz }
    }
}

/// A spot site and its neighbour under each of [`NEIGHBOUR_METHODS`].
#[derive(Debug, Clone, PartialEq)]
pub struct SiteNeighbours {
    pub wmo_id: String,
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub neighbours: [GridNeighbour; 4],
}

impl SiteNeighbours {
    /// Neighbour for the named method.
    pub fn neighbour(&self, method: &str) -> Option<GridNeighbour> {
        let index = NEIGHBOUR_METHODS.iter().position(|m| *m == method)?;
        Some(self.neighbours[index])
    }
}

/// Three sites on the default 5x4 grid, with differing neighbours per method.
pub fn default_sites() -> Vec<SiteNeighbours> {
    vec![
        SiteNeighbours {
            wmo_id: "03772".to_string(),
            altitude: 25.0,
            latitude: 51.479,
            longitude: -0.449,
            neighbours: [
                GridNeighbour::new(1, 1, -5.0),
                GridNeighbour::new(1, 2, -2.0),
                GridNeighbour::new(2, 1, 0.5),
                GridNeighbour::new(2, 2, 1.0),
            ],
        },
        SiteNeighbours {
            wmo_id: "03866".to_string(),
            altitude: 150.0,
            latitude: 51.006,
            longitude: -1.372,
            neighbours: [
                GridNeighbour::new(3, 2, 20.0),
                GridNeighbour::new(3, 2, 20.0),
                GridNeighbour::new(4, 3, -3.0),
                GridNeighbour::new(4, 2, 2.5),
            ],
        },
        SiteNeighbours {
            wmo_id: "03953".to_string(),
            altitude: 45.0,
            latitude: 51.939,
            longitude: -10.241,
            neighbours: [
                GridNeighbour::new(0, 0, 0.0),
                GridNeighbour::new(0, 1, 12.0),
                GridNeighbour::new(0, 0, 0.0),
                GridNeighbour::new(1, 0, -7.5),
            ],
        },
    ]
}

/// Build a neighbour cube with dimensions
/// `(neighbour_selection_method, grid_attributes, spot_index)`.
pub fn neighbour_cube(sites: &[SiteNeighbours]) -> Cube {
    let n_methods = NEIGHBOUR_METHODS.len();
    let n_sites = sites.len();
    let mut data = vec![0.0f32; n_methods * 3 * n_sites];
    for (m, _) in NEIGHBOUR_METHODS.iter().enumerate() {
        for (s, site) in sites.iter().enumerate() {
            let n = site.neighbours[m];
            data[(m * 3) * n_sites + s] = n.x as f32;
            data[(m * 3 + 1) * n_sites + s] = n.y as f32;
            data[(m * 3 + 2) * n_sites + s] = n.dz;
        }
    }

    let mut cube = Cube::new(
        "grid_neighbours",
        "1",
        vec![
            Dimension::new("neighbour_selection_method", n_methods),
            Dimension::new("grid_attributes", 3),
            Dimension::new("spot_index", n_sites),
        ],
        data,
    )
    .expect("neighbour fixture shape");

    let coords = vec![
        Coord::text(
            "neighbour_selection_method",
            NEIGHBOUR_METHODS.iter().map(|m| m.to_string()).collect(),
        )
        .on_dim(0),
        Coord::text(
            "grid_attributes",
            vec![
                "x_index".to_string(),
                "y_index".to_string(),
                "vertical_displacement".to_string(),
            ],
        )
        .on_dim(1),
        Coord::numeric("spot_index", "1", (0..n_sites).map(|i| i as f64).collect()).on_dim(2),
        Coord::numeric("altitude", "m", sites.iter().map(|s| s.altitude).collect()).on_dim(2),
        Coord::numeric("latitude", "degrees", sites.iter().map(|s| s.latitude).collect())
            .on_dim(2),
        Coord::numeric("longitude", "degrees", sites.iter().map(|s| s.longitude).collect())
            .on_dim(2),
        Coord::text("wmo_id", sites.iter().map(|s| s.wmo_id.clone()).collect()).on_dim(2),
    ];
    for coord in coords {
        cube.add_coord(coord).expect("neighbour fixture coord");
    }

    for (key, value) in grid_attributes() {
        cube.set_attribute(key, value);
    }
    cube.set_attribute("model_grid_hash", MODEL_GRID_HASH);
    cube
}

/// One method of [`neighbour_cube`] as a `(grid_attributes, spot_index)`
/// cube, the method held as a scalar coordinate.
pub fn single_method_neighbour_cube(sites: &[SiteNeighbours], method: &str) -> Cube {
    let full = neighbour_cube(sites);
    let m = NEIGHBOUR_METHODS
        .iter()
        .position(|n| *n == method)
        .expect("fixture neighbour method");
    let block = 3 * sites.len();
    let mut cube = Cube::new(
        full.name.clone(),
        full.units.clone(),
        full.dims()[1..].to_vec(),
        full.data()[m * block..(m + 1) * block].to_vec(),
    )
    .expect("single method fixture shape");
    cube.attributes = full.attributes.clone();

    cube.add_coord(Coord::text("neighbour_selection_method", vec![method.to_string()]))
        .expect("single method fixture coord");
    for coord in full.coords().iter().filter(|c| c.dims != [0]) {
        cube.add_coord(coord.clone().on_dim(coord.dims[0] - 1))
            .expect("single method fixture coord");
    }
    cube
}

/// Build a cube on the fixture grid with dimensions
/// `(projection_y_coordinate, projection_x_coordinate)`.
pub fn gridded_cube(
    name: &str,
    units: &str,
    width: usize,
    height: usize,
    data: Vec<f32>,
) -> Cube {
    let mut cube = Cube::new(
        name,
        units,
        vec![
            Dimension::new("projection_y_coordinate", height),
            Dimension::new("projection_x_coordinate", width),
        ],
        data,
    )
    .expect("gridded fixture shape");

    cube.add_coord(
        Coord::numeric(
            "projection_y_coordinate",
            "m",
            (0..height).map(|j| j as f64 * GRID_SPACING_M).collect(),
        )
        .on_dim(0),
    )
    .expect("y coordinate");
    cube.add_coord(
        Coord::numeric(
            "projection_x_coordinate",
            "m",
            (0..width).map(|i| i as f64 * GRID_SPACING_M).collect(),
        )
        .on_dim(1),
    )
    .expect("x coordinate");

    for (key, value) in grid_attributes() {
        cube.set_attribute(key, value);
    }
    cube.set_attribute("title", "UKV Model Forecast on UK 2 km Standard Grid");
    cube.set_attribute("institution", "Met Office");
    cube
}

/// Screen temperature on the default grid, with height and time scalar coords.
pub fn temperature_cube() -> Cube {
    let mut cube = gridded_cube(
        "air_temperature",
        "K",
        GRID_NX,
        GRID_NY,
        create_temperature_grid(GRID_NX, GRID_NY),
    );
    add_forecast_coords(&mut cube, SCREEN_HEIGHT_M);
    cube
}

/// A uniform temperature lapse rate on the default grid at `height` metres.
pub fn lapse_rate_cube(rate: f32, height: f64) -> Cube {
    let mut cube = gridded_cube(
        "air_temperature_lapse_rate",
        "K m-1",
        GRID_NX,
        GRID_NY,
        create_constant_grid(GRID_NX, GRID_NY, rate),
    );
    add_forecast_coords(&mut cube, height);
    cube
}

/// Add `height`, `time` and `forecast_reference_time` scalar coordinates.
pub fn add_forecast_coords(cube: &mut Cube, height: f64) {
    cube.add_coord(Coord::scalar("height", "m", height))
        .expect("height coordinate");
    cube.add_coord(Coord::scalar(
        "time",
        "seconds since 1970-01-01 00:00:00",
        VALIDITY_TIME,
    ))
    .expect("time coordinate");
    cube.add_coord(Coord::scalar(
        "forecast_reference_time",
        "seconds since 1970-01-01 00:00:00",
        REFERENCE_TIME,
    ))
    .expect("forecast_reference_time coordinate");
}

/// A scratch directory removed when dropped.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch dir")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbour_cube_layout() {
        let sites = default_sites();
        let cube = neighbour_cube(&sites);
        assert_eq!(cube.shape(), vec![4, 3, 3]);
        // nearest_land x_index of the second site
        let offset = cube.flat_index(&[1, 0, 1]).unwrap();
        assert_eq!(cube.data()[offset], 3.0);
        // nearest_land_minimum_dz vertical displacement of the third site
        let offset = cube.flat_index(&[3, 2, 2]).unwrap();
        assert_eq!(cube.data()[offset], -7.5);
    }

    #[test]
    fn test_site_neighbour_lookup() {
        let sites = default_sites();
        assert_eq!(
            sites[0].neighbour("nearest_minimum_dz"),
            Some(GridNeighbour::new(2, 1, 0.5))
        );
        assert_eq!(sites[0].neighbour("furthest"), None);
    }

    #[test]
    fn test_temperature_cube_coords() {
        let cube = temperature_cube();
        assert_eq!(cube.shape(), vec![GRID_NY, GRID_NX]);
        assert_eq!(cube.single_point("height"), Some(SCREEN_HEIGHT_M));
        assert!(cube.validity_time().is_some());
    }
}
