//! Grid identity checks between cubes.

use std::collections::BTreeMap;

use spot_common::{AttributeValue, Cube};
use tracing::debug;

use crate::error::{SpotError, SpotResult};

/// Default substring identifying grid metadata attributes.
pub const DEFAULT_GRID_METADATA_IDENTIFIER: &str = "mosg__grid";

/// Attributes of `cube` whose names contain `identifier`.
pub fn grid_metadata<'a>(
    cube: &'a Cube,
    identifier: &str,
) -> BTreeMap<&'a str, &'a AttributeValue> {
    cube.attributes
        .iter()
        .filter(|(key, _)| key.contains(identifier))
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}

/// Check that every cube carries identical grid metadata.
///
/// Cubes are compatible when the attributes selected by `identifier` are the
/// same set, with the same values, on all of them.
pub fn check_grid_match(identifier: &str, cubes: &[&Cube]) -> SpotResult<()> {
    let Some((first, rest)) = cubes.split_first() else {
        return Ok(());
    };
    let reference = grid_metadata(first, identifier);
    for cube in rest {
        if grid_metadata(cube, identifier) != reference {
            debug!(
                identifier,
                reference = %first.name,
                other = %cube.name,
                "Grid metadata mismatch"
            );
            return Err(SpotError::GridMismatch(identifier.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{default_sites, lapse_rate_cube, neighbour_cube, temperature_cube};

    #[test]
    fn test_matching_grids() {
        let neighbours = neighbour_cube(&default_sites());
        let temperature = temperature_cube();
        let lapse = lapse_rate_cube(-0.0065, 1.5);
        check_grid_match(
            DEFAULT_GRID_METADATA_IDENTIFIER,
            &[&neighbours, &temperature, &lapse],
        )
        .unwrap();
    }

    #[test]
    fn test_mismatched_value() {
        let neighbours = neighbour_cube(&default_sites());
        let mut temperature = temperature_cube();
        temperature.set_attribute("mosg__grid_domain", "global");
        let result = check_grid_match(
            DEFAULT_GRID_METADATA_IDENTIFIER,
            &[&neighbours, &temperature],
        );
        assert!(matches!(result, Err(SpotError::GridMismatch(_))));
    }

    #[test]
    fn test_missing_attribute_is_mismatch() {
        let neighbours = neighbour_cube(&default_sites());
        let mut temperature = temperature_cube();
        temperature.attributes.remove("mosg__grid_version");
        let result = check_grid_match(
            DEFAULT_GRID_METADATA_IDENTIFIER,
            &[&neighbours, &temperature],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unrelated_attributes_ignored() {
        let neighbours = neighbour_cube(&default_sites());
        let mut temperature = temperature_cube();
        temperature.set_attribute("title", "Something else");
        check_grid_match(
            DEFAULT_GRID_METADATA_IDENTIFIER,
            &[&neighbours, &temperature],
        )
        .unwrap();
    }

    #[test]
    fn test_custom_identifier() {
        let neighbours = neighbour_cube(&default_sites());
        let temperature = temperature_cube();
        // The title only appears on the gridded cube
        let result = check_grid_match("title", &[&neighbours, &temperature]);
        assert!(result.is_err());
    }
}
