//! Lapse rate adjustment of spot temperatures.
//!
//! A grid point's temperature describes the grid point's altitude, not the
//! site's. Applying the local lapse rate over the vertical displacement
//! between the two moves the value to the site altitude:
//!
//! `T_site = T_grid + lapse_rate * (site_altitude - grid_altitude)`

use spot_common::{Coord, Cube};
use tracing::debug;

use crate::error::{SpotError, SpotResult};
use crate::extraction::SpotExtraction;
use crate::neighbour::NeighbourLookup;

pub const TEMPERATURE: &str = "air_temperature";
pub const LAPSE_RATE: &str = "air_temperature_lapse_rate";

pub const HEIGHT: &str = "height";

/// Units accepted for lapse rate cubes.
const LAPSE_RATE_UNITS: [&str; 3] = ["K m-1", "K/m", "K m^-1"];

/// The cube's `height` coordinate, which must hold exactly one value.
///
/// An absent coordinate and a multi-valued one are the same error.
pub fn single_height_coord(cube: &Cube) -> SpotResult<&Coord> {
    cube.coord(HEIGHT)
        .filter(|c| c.len() == 1)
        .ok_or_else(|| SpotError::MissingHeightCoordinate(cube.name.clone()))
}

/// Adjusts spot temperatures using a gridded temperature lapse rate.
#[derive(Debug, Clone)]
pub struct SpotLapseRateAdjust {
    pub neighbour_selection_method: String,
    pub grid_metadata_identifier: Option<String>,
}

impl SpotLapseRateAdjust {
    pub fn new(
        neighbour_selection_method: impl Into<String>,
        grid_metadata_identifier: Option<String>,
    ) -> Self {
        Self {
            neighbour_selection_method: neighbour_selection_method.into(),
            grid_metadata_identifier,
        }
    }

    /// Return a copy of `spot_cube` with each site's temperature moved to
    /// the site altitude.
    ///
    /// Lapse rates are extracted at the sites with the same neighbour
    /// method used for the temperatures. A lapse rate with leading
    /// dimensions must match the spot cube's; one without is applied to
    /// every leading index.
    pub fn process(
        &self,
        spot_cube: &Cube,
        neighbour_cube: &Cube,
        lapse_rate_cube: &Cube,
    ) -> SpotResult<Cube> {
        if spot_cube.name != TEMPERATURE {
            return Err(SpotError::invalid_lapse_rate(format!(
                "spot data cube is {}, not {}",
                spot_cube.name, TEMPERATURE
            )));
        }
        if lapse_rate_cube.name != LAPSE_RATE {
            return Err(SpotError::invalid_lapse_rate(format!(
                "gradient cube is {}, not a temperature lapse rate",
                lapse_rate_cube.name
            )));
        }
        if !LAPSE_RATE_UNITS.contains(&lapse_rate_cube.units.as_str()) {
            return Err(SpotError::invalid_lapse_rate(format!(
                "lapse rate units are {}, expected K m-1",
                lapse_rate_cube.units
            )));
        }

        let extraction = SpotExtraction::new(
            self.neighbour_selection_method.clone(),
            self.grid_metadata_identifier.clone(),
        );
        let lapse_rates = extraction.process(neighbour_cube, lapse_rate_cube)?;
        let displacements =
            NeighbourLookup::new(neighbour_cube, &self.neighbour_selection_method)?
                .vertical_displacements()?;

        let n_sites = displacements.len();
        let temperatures = spot_cube.data();
        if n_sites == 0 || temperatures.len() % n_sites != 0 {
            return Err(SpotError::shape_mismatch(format!(
                "{} spot values cannot be split over {} sites",
                temperatures.len(),
                n_sites
            )));
        }

        let rates = lapse_rates.data();
        let broadcast = if rates.len() == n_sites {
            true
        } else if rates.len() == temperatures.len() {
            false
        } else {
            return Err(SpotError::shape_mismatch(format!(
                "lapse rate shape {:?} does not fit spot data shape {:?}",
                lapse_rates.shape(),
                spot_cube.shape()
            )));
        };

        let adjusted: Vec<f32> = temperatures
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let site = i % n_sites;
                let rate = if broadcast { rates[site] } else { rates[i] };
                t + rate * displacements[site]
            })
            .collect();

        let mut result = spot_cube.clone();
        result.set_data(adjusted)?;

        debug!(
            method = %self.neighbour_selection_method,
            sites = n_sites,
            "Applied lapse rate adjustment"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        assert_approx_eq, default_sites, lapse_rate_cube, neighbour_cube, temperature_cube,
    };

    fn spot_temperatures(method: &str) -> Cube {
        SpotExtraction::new(method, None)
            .process(&neighbour_cube(&default_sites()), &temperature_cube())
            .unwrap()
    }

    #[test]
    fn test_adjustment_uses_vertical_displacement() {
        let neighbours = neighbour_cube(&default_sites());
        let spot = spot_temperatures("nearest");
        let lapse = lapse_rate_cube(-0.0065, 1.5);

        let adjusted = SpotLapseRateAdjust::new("nearest", None)
            .process(&spot, &neighbours, &lapse)
            .unwrap();

        // nearest displacements are -5, 20 and 0 metres
        assert_approx_eq!(adjusted.data()[0], spot.data()[0] + 0.0325, 1e-4);
        assert_approx_eq!(adjusted.data()[1], spot.data()[1] - 0.13, 1e-4);
        assert_eq!(adjusted.data()[2], spot.data()[2]);
        assert_eq!(adjusted.coords(), spot.coords());
    }

    #[test]
    fn test_zero_lapse_rate_leaves_values() {
        let neighbours = neighbour_cube(&default_sites());
        let spot = spot_temperatures("nearest_land");
        let lapse = lapse_rate_cube(0.0, 1.5);

        let adjusted = SpotLapseRateAdjust::new("nearest_land", None)
            .process(&spot, &neighbours, &lapse)
            .unwrap();
        assert_eq!(adjusted.data(), spot.data());
    }

    #[test]
    fn test_rejects_non_temperature() {
        let neighbours = neighbour_cube(&default_sites());
        let mut spot = spot_temperatures("nearest");
        spot.name = "wind_speed".to_string();
        let lapse = lapse_rate_cube(-0.0065, 1.5);

        let result = SpotLapseRateAdjust::new("nearest", None).process(&spot, &neighbours, &lapse);
        assert!(matches!(result, Err(SpotError::InvalidLapseRate(_))));
    }

    #[test]
    fn test_rejects_non_lapse_rate() {
        let neighbours = neighbour_cube(&default_sites());
        let spot = spot_temperatures("nearest");
        let gradient = temperature_cube();

        let result =
            SpotLapseRateAdjust::new("nearest", None).process(&spot, &neighbours, &gradient);
        assert!(matches!(result, Err(SpotError::InvalidLapseRate(_))));
    }

    #[test]
    fn test_single_height_coord() {
        let lapse = lapse_rate_cube(-0.0065, 1.5);
        assert_eq!(single_height_coord(&lapse).unwrap().single_point(), Some(1.5));

        let mut missing = lapse.clone();
        missing.remove_coord(HEIGHT);
        let err = single_height_coord(&missing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "air_temperature_lapse_rate cube lacks a single valued height coordinate"
        );
    }

    #[test]
    fn test_multi_valued_height_rejected() {
        let mut cube = spot_common::Cube::new(
            LAPSE_RATE,
            "K m-1",
            vec![spot_common::Dimension::new(HEIGHT, 2)],
            vec![-0.0065, -0.006],
        )
        .unwrap();
        cube.add_coord(Coord::numeric(HEIGHT, "m", vec![1.5, 10.0]).on_dim(0))
            .unwrap();
        assert!(matches!(
            single_height_coord(&cube),
            Err(SpotError::MissingHeightCoordinate(_))
        ));
    }

    #[test]
    fn test_nan_lapse_rate_propagates() {
        let neighbours = neighbour_cube(&default_sites());
        let spot = spot_temperatures("nearest");
        let lapse = lapse_rate_cube(f32::NAN, 1.5);

        let adjusted = SpotLapseRateAdjust::new("nearest", None)
            .process(&spot, &neighbours, &lapse)
            .unwrap();
        assert!(adjusted.data()[0].is_nan());
    }
}
