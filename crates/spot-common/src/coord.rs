//! Cube coordinates.

use serde::{Deserialize, Serialize};

/// Values held by a coordinate: numeric points or text labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Numeric(v) => v.len(),
            CoordValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named coordinate attached to zero or more cube dimensions.
///
/// A coordinate spanning no dimension is a scalar coordinate and holds
/// exactly one value. Equality is exact: name, units, spanned dimensions and
/// every value must match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub name: String,
    pub units: String,
    pub values: CoordValues,
    /// Indices of the cube dimensions this coordinate spans, in order.
    pub dims: Vec<usize>,
}

impl Coord {
    /// Create a numeric coordinate that spans no dimensions yet.
    pub fn numeric(name: impl Into<String>, units: impl Into<String>, points: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            values: CoordValues::Numeric(points),
            dims: Vec::new(),
        }
    }

    /// Create a text-labelled coordinate (dimensionless).
    pub fn text(name: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units: "1".to_string(),
            values: CoordValues::Text(labels),
            dims: Vec::new(),
        }
    }

    /// Create a single-valued scalar coordinate.
    pub fn scalar(name: impl Into<String>, units: impl Into<String>, value: f64) -> Self {
        Self::numeric(name, units, vec![value])
    }

    /// Attach the coordinate to a single cube dimension.
    pub fn on_dim(mut self, dim: usize) -> Self {
        self.dims = vec![dim];
        self
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> Option<&[f64]> {
        match &self.values {
            CoordValues::Numeric(v) => Some(v),
            CoordValues::Text(_) => None,
        }
    }

    pub fn labels(&self) -> Option<&[String]> {
        match &self.values {
            CoordValues::Text(v) => Some(v),
            CoordValues::Numeric(_) => None,
        }
    }

    /// The sole numeric point, if this coordinate holds exactly one.
    pub fn single_point(&self) -> Option<f64> {
        match self.points() {
            Some([value]) => Some(*value),
            _ => None,
        }
    }

    /// Exact comparison of name, units and values, ignoring which cube
    /// dimensions the coordinates span.
    ///
    /// A scalar `height` of 1.5 m and a length-one `height` dimension of
    /// 1.5 m describe the same level.
    pub fn same_values(&self, other: &Coord) -> bool {
        self.name == other.name && self.units == other.units && self.values == other.values
    }

    /// Position of a text label within the coordinate.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels()?.iter().position(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point() {
        assert_eq!(Coord::scalar("height", "m", 1.5).single_point(), Some(1.5));
        assert_eq!(
            Coord::numeric("height", "m", vec![1.5, 10.0]).single_point(),
            None
        );
        assert_eq!(
            Coord::text("wmo_id", vec!["03772".to_string()]).single_point(),
            None
        );
    }

    #[test]
    fn test_equality_is_exact() {
        let a = Coord::scalar("height", "m", 1.5);
        let b = Coord::scalar("height", "m", 1.5 + 1e-9);
        assert_ne!(a, b);
        assert_eq!(a, Coord::scalar("height", "m", 1.5));
        assert_ne!(a, Coord::scalar("height", "km", 1.5));
    }

    #[test]
    fn test_same_values_ignores_dims() {
        let scalar = Coord::scalar("height", "m", 1.5);
        let on_dim = Coord::numeric("height", "m", vec![1.5]).on_dim(0);
        assert_ne!(scalar, on_dim);
        assert!(scalar.same_values(&on_dim));
        assert!(!scalar.same_values(&Coord::scalar("height", "m", 1.5 + 1e-9)));
        assert!(!scalar.same_values(&Coord::scalar("height", "km", 1.5)));
        assert!(!scalar.same_values(&Coord::scalar("altitude", "m", 1.5)));
    }

    #[test]
    fn test_label_index() {
        let coord = Coord::text(
            "grid_attributes",
            vec!["x_index".to_string(), "y_index".to_string()],
        );
        assert_eq!(coord.label_index("y_index"), Some(1));
        assert_eq!(coord.label_index("vertical_displacement"), None);
    }
}
