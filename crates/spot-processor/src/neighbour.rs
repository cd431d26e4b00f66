//! Neighbour selection: which grid point represents each spot site.
//!
//! The neighbour cube is precomputed and has dimensions
//! `(neighbour_selection_method, grid_attributes, spot_index)`. For each
//! method and site it holds the grid `x_index`, `y_index` and the
//! `vertical_displacement` (site altitude minus grid point altitude).

use spot_common::{Coord, Cube};

use crate::error::{SpotError, SpotResult};

/// Coordinate naming the selection method on the neighbour cube.
pub const METHOD_COORD: &str = "neighbour_selection_method";

/// Coordinate naming the grid attributes on the neighbour cube.
pub const GRID_ATTRIBUTES_COORD: &str = "grid_attributes";

/// Dimension indexing spot sites.
pub const SPOT_INDEX: &str = "spot_index";

pub const X_INDEX: &str = "x_index";
pub const Y_INDEX: &str = "y_index";
pub const VERTICAL_DISPLACEMENT: &str = "vertical_displacement";

/// Constraints used to choose a site's grid point.
///
/// Both constraints may be set together; the neighbour cube then needs a
/// method computed with both applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighbourSelection {
    /// Only consider land points
    pub land_constraint: bool,
    /// Prefer the nearby point with the smallest height difference
    pub minimum_dz: bool,
}

impl NeighbourSelection {
    pub fn new(land_constraint: bool, minimum_dz: bool) -> Self {
        Self {
            land_constraint,
            minimum_dz,
        }
    }

    /// Name of the method on the neighbour cube, e.g. `nearest_land_minimum_dz`.
    pub fn method_name(&self) -> String {
        format!(
            "nearest{}{}",
            if self.land_constraint { "_land" } else { "" },
            if self.minimum_dz { "_minimum_dz" } else { "" }
        )
    }
}

/// Read access to one selection method of a neighbour cube.
///
/// A neighbour file holding a single method may carry the method as a
/// scalar coordinate, leaving a `(grid_attributes, spot_index)` cube.
#[derive(Debug)]
pub struct NeighbourLookup<'a> {
    cube: &'a Cube,
    method_index: usize,
    method_dim: Option<usize>,
    attribute_dim: usize,
    spot_dim: usize,
}

impl<'a> NeighbourLookup<'a> {
    /// Validate the neighbour cube layout and locate `method` on it.
    pub fn new(cube: &'a Cube, method: &str) -> SpotResult<Self> {
        let method_coord = cube.coord(METHOD_COORD).ok_or_else(|| {
            SpotError::invalid_neighbour_cube(format!("no {} coordinate", METHOD_COORD))
        })?;
        let method_dim = if method_coord.is_scalar() {
            None
        } else {
            Some(coord_dim(cube, METHOD_COORD)?)
        };
        let attribute_dim = coord_dim(cube, GRID_ATTRIBUTES_COORD)?;
        let spot_dim = cube
            .dim_index(SPOT_INDEX)
            .ok_or_else(|| SpotError::invalid_neighbour_cube("no spot_index dimension"))?;

        let expected_ndim = if method_dim.is_some() { 3 } else { 2 };
        if cube.ndim() != expected_ndim {
            return Err(SpotError::invalid_neighbour_cube(format!(
                "expected {} dimensions, found {}",
                expected_ndim,
                cube.ndim()
            )));
        }
        if method_dim == Some(attribute_dim)
            || method_dim == Some(spot_dim)
            || attribute_dim == spot_dim
        {
            return Err(SpotError::invalid_neighbour_cube(
                "method, grid attributes and spot index must lie on separate dimensions",
            ));
        }

        let methods = method_coord
            .labels()
            .ok_or_else(|| SpotError::invalid_neighbour_cube("method coordinate is not text"))?;
        let method_index = methods.iter().position(|m| m == method).ok_or_else(|| {
            SpotError::MethodNotAvailable {
                requested: method.to_string(),
                available: methods.to_vec(),
            }
        })?;

        Ok(Self {
            cube,
            method_index,
            method_dim,
            attribute_dim,
            spot_dim,
        })
    }

    pub fn n_sites(&self) -> usize {
        self.cube.dims()[self.spot_dim].len
    }

    /// Raw values of one grid attribute for every site.
    pub fn attribute_values(&self, attribute: &str) -> SpotResult<Vec<f32>> {
        let attribute_index = self
            .cube
            .coord(GRID_ATTRIBUTES_COORD)
            .and_then(|c| c.label_index(attribute))
            .ok_or_else(|| {
                SpotError::invalid_neighbour_cube(format!("no '{}' grid attribute", attribute))
            })?;

        let mut index = vec![0; self.cube.ndim()];
        if let Some(dim) = self.method_dim {
            index[dim] = self.method_index;
        }
        index[self.attribute_dim] = attribute_index;
        (0..self.n_sites())
            .map(|site| {
                index[self.spot_dim] = site;
                self.cube
                    .flat_index(&index)
                    .map(|i| self.cube.data()[i])
                    .ok_or_else(|| {
                        SpotError::invalid_neighbour_cube(format!(
                            "{} of spot site {} lies outside the cube",
                            attribute, site
                        ))
                    })
            })
            .collect()
    }

    pub fn x_indices(&self) -> SpotResult<Vec<usize>> {
        self.grid_indices(X_INDEX)
    }

    pub fn y_indices(&self) -> SpotResult<Vec<usize>> {
        self.grid_indices(Y_INDEX)
    }

    pub fn vertical_displacements(&self) -> SpotResult<Vec<f32>> {
        self.attribute_values(VERTICAL_DISPLACEMENT)
    }

    /// Site coordinates (altitude, latitude, wmo_id...) re-attached to `dim`.
    ///
    /// The `spot_index` coordinate itself is included.
    pub fn site_coords(&self, dim: usize) -> Vec<Coord> {
        self.cube
            .coords()
            .iter()
            .filter(|c| c.dims == [self.spot_dim])
            .map(|c| c.clone().on_dim(dim))
            .collect()
    }

    fn grid_indices(&self, attribute: &str) -> SpotResult<Vec<usize>> {
        self.attribute_values(attribute)?
            .into_iter()
            .enumerate()
            .map(|(site, v)| {
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(SpotError::invalid_neighbour_cube(format!(
                        "{} of spot site {} is {}, not a grid index",
                        attribute, site, v
                    )))
                }
            })
            .collect()
    }
}

fn coord_dim(cube: &Cube, name: &str) -> SpotResult<usize> {
    match cube.coord(name).map(|c| c.dims.as_slice()) {
        Some([dim]) => Ok(*dim),
        Some(_) => Err(SpotError::invalid_neighbour_cube(format!(
            "{} coordinate must span exactly one dimension",
            name
        ))),
        None => Err(SpotError::invalid_neighbour_cube(format!(
            "no {} coordinate",
            name
        ))),
    }
}
