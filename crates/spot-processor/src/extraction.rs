//! Spot extraction: sample gridded diagnostics at spot sites.

use spot_common::{Cube, Dimension};
use tracing::debug;

use crate::error::{SpotError, SpotResult};
use crate::grid_match::check_grid_match;
use crate::neighbour::{NeighbourLookup, SPOT_INDEX};

/// Attribute on the neighbour cube identifying the grid it was built for.
pub const MODEL_GRID_HASH: &str = "model_grid_hash";

/// Extracts diagnostic values at spot sites using one neighbour selection
/// method.
///
/// The diagnostic's last two dimensions must be its grid `(y, x)`. Any
/// leading dimensions (realization, percentile, time...) are kept, so a
/// `(realization, y, x)` field becomes `(realization, spot_index)`.
#[derive(Debug, Clone)]
pub struct SpotExtraction {
    pub neighbour_selection_method: String,
    /// Substring selecting grid identity attributes; `None` skips the check.
    pub grid_metadata_identifier: Option<String>,
}

impl SpotExtraction {
    pub fn new(
        neighbour_selection_method: impl Into<String>,
        grid_metadata_identifier: Option<String>,
    ) -> Self {
        Self {
            neighbour_selection_method: neighbour_selection_method.into(),
            grid_metadata_identifier,
        }
    }

    /// Build a spot cube from `diagnostic_cube` at the sites of
    /// `neighbour_cube`.
    ///
    /// The result keeps the diagnostic's name, units, attributes, cell
    /// methods, scalar coordinates and leading dimension coordinates, and
    /// gains the site coordinates of the neighbour cube.
    pub fn process(&self, neighbour_cube: &Cube, diagnostic_cube: &Cube) -> SpotResult<Cube> {
        if let Some(identifier) = &self.grid_metadata_identifier {
            check_grid_match(identifier, &[neighbour_cube, diagnostic_cube])?;
        }

        let lookup = NeighbourLookup::new(neighbour_cube, &self.neighbour_selection_method)?;
        let x_indices = lookup.x_indices()?;
        let y_indices = lookup.y_indices()?;

        let ndim = diagnostic_cube.ndim();
        if ndim < 2 {
            return Err(SpotError::shape_mismatch(format!(
                "{} has {} dimensions; spot extraction needs a (y, x) grid",
                diagnostic_cube.name, ndim
            )));
        }
        let ny = diagnostic_cube.dims()[ndim - 2].len;
        let nx = diagnostic_cube.dims()[ndim - 1].len;

        for (site, (&x, &y)) in x_indices.iter().zip(&y_indices).enumerate() {
            if x >= nx || y >= ny {
                return Err(SpotError::IndexOutOfRange { site, x, y, nx, ny });
            }
        }

        let leading: Vec<Dimension> = diagnostic_cube.dims()[..ndim - 2].to_vec();
        let n_leading: usize = leading.iter().map(|d| d.len).product();
        let n_sites = lookup.n_sites();
        let grid_size = nx * ny;

        let source = diagnostic_cube.data();
        let mut data = Vec::with_capacity(n_leading * n_sites);
        for l in 0..n_leading {
            let field = &source[l * grid_size..(l + 1) * grid_size];
            data.extend(
                x_indices
                    .iter()
                    .zip(&y_indices)
                    .map(|(&x, &y)| field[y * nx + x]),
            );
        }

        let spot_dim = leading.len();
        let mut dims = leading;
        dims.push(Dimension::new(SPOT_INDEX, n_sites));

        let mut spot_cube = Cube::new(
            diagnostic_cube.name.clone(),
            diagnostic_cube.units.clone(),
            dims,
            data,
        )?;

        // Scalar and leading-dimension coordinates carry over unchanged
        for coord in diagnostic_cube.coords() {
            if coord.dims.iter().all(|&d| d < spot_dim) {
                spot_cube.add_coord(coord.clone())?;
            }
        }
        for coord in lookup.site_coords(spot_dim) {
            spot_cube.replace_coord(coord)?;
        }

        spot_cube.attributes = diagnostic_cube.attributes.clone();
        if let Some(hash) = neighbour_cube.attribute(MODEL_GRID_HASH) {
            spot_cube
                .attributes
                .insert(MODEL_GRID_HASH.to_string(), hash.clone());
        }
        spot_cube.cell_methods = diagnostic_cube.cell_methods.clone();

        debug!(
            diagnostic = %spot_cube.name,
            method = %self.neighbour_selection_method,
            sites = n_sites,
            fields = n_leading,
            "Extracted spot data"
        );

        Ok(spot_cube)
    }
}
