//! The cube: values plus the metadata that describes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{AttributeValue, Coord, CubeError, CubeResult};

/// A named cube dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

/// A CF cell method, e.g. `time: maximum (comment: of hourly values)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMethod {
    pub method: String,
    pub coords: Vec<String>,
    pub comment: Option<String>,
}

impl CellMethod {
    pub fn new(method: impl Into<String>, coords: Vec<String>) -> Self {
        Self {
            method: method.into(),
            coords,
            comment: None,
        }
    }

    /// Parse a CF `cell_methods` attribute string into its methods.
    ///
    /// Supports the `name: [name: ...] method [(comment)]` grammar, e.g.
    /// `"time: maximum area: mean (comment: land only)"`.
    pub fn parse_list(s: &str) -> CubeResult<Vec<CellMethod>> {
        let mut methods = Vec::new();
        let mut coords = Vec::new();
        let mut rest = s.trim();

        while !rest.is_empty() {
            let (token, tail) = match rest.find(char::is_whitespace) {
                Some(pos) => (&rest[..pos], rest[pos..].trim_start()),
                None => (rest, ""),
            };

            if let Some(name) = token.strip_suffix(':') {
                coords.push(name.to_string());
                rest = tail;
                continue;
            }

            if coords.is_empty() {
                return Err(CubeError::InvalidCellMethod(s.to_string()));
            }

            let mut method = CellMethod::new(token, std::mem::take(&mut coords));
            rest = tail;

            if let Some(bracketed) = rest.strip_prefix('(') {
                let end = bracketed
                    .find(')')
                    .ok_or_else(|| CubeError::InvalidCellMethod(s.to_string()))?;
                let inner = bracketed[..end].trim();
                let comment = inner.strip_prefix("comment:").unwrap_or(inner).trim();
                method.comment = Some(comment.to_string());
                rest = bracketed[end + 1..].trim_start();
            }

            methods.push(method);
        }

        if !coords.is_empty() {
            return Err(CubeError::InvalidCellMethod(s.to_string()));
        }

        Ok(methods)
    }

    /// Format a list of methods as a CF `cell_methods` attribute string.
    pub fn format_list(methods: &[CellMethod]) -> String {
        methods
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CellMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for coord in &self.coords {
            write!(f, "{}: ", coord)?;
        }
        write!(f, "{}", self.method)?;
        if let Some(comment) = &self.comment {
            write!(f, " (comment: {})", comment)?;
        }
        Ok(())
    }
}

/// A gridded or point-indexed array of physical values with its metadata.
///
/// Values are stored flat in row-major order over `dims`. Every coordinate
/// is validated against the dimensions it spans when it is added, so a cube
/// can never hold a coordinate whose length disagrees with the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub name: String,
    pub units: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub cell_methods: Vec<CellMethod>,
    dims: Vec<Dimension>,
    data: Vec<f32>,
    coords: Vec<Coord>,
}

impl Cube {
    /// Create a cube, checking that `data` fills `dims` exactly.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        dims: Vec<Dimension>,
        data: Vec<f32>,
    ) -> CubeResult<Self> {
        let shape: Vec<usize> = dims.iter().map(|d| d.len).collect();
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(CubeError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name: name.into(),
            units: units.into(),
            attributes: BTreeMap::new(),
            cell_methods: Vec::new(),
            dims,
            data,
            coords: Vec::new(),
        })
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.len).collect()
    }

    pub fn dim_index(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|d| d.name == name)
    }

    /// Row-major strides for each dimension.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.dims.len()];
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1].len;
        }
        strides
    }

    /// Flat data offset of a multi-dimensional index.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for ((&i, dim), stride) in index.iter().zip(&self.dims).zip(self.strides()) {
            if i >= dim.len {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Replace the data, keeping the shape.
    pub fn set_data(&mut self, data: Vec<f32>) -> CubeResult<()> {
        if data.len() != self.data.len() {
            return Err(CubeError::ShapeMismatch {
                shape: self.shape(),
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        self.data = data;
        Ok(())
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&Coord> {
        self.coords.iter().find(|c| c.name == name)
    }

    /// The sole numeric value of a coordinate, if it exists and has one.
    pub fn single_point(&self, name: &str) -> Option<f64> {
        self.coord(name)?.single_point()
    }

    /// Attach a coordinate after validating it against the cube shape.
    pub fn add_coord(&mut self, coord: Coord) -> CubeResult<()> {
        if self.coord(&coord.name).is_some() {
            return Err(CubeError::DuplicateCoord(coord.name));
        }
        self.validate_coord(&coord)?;
        self.coords.push(coord);
        Ok(())
    }

    /// Attach a coordinate, replacing any existing one of the same name.
    pub fn replace_coord(&mut self, coord: Coord) -> CubeResult<()> {
        self.validate_coord(&coord)?;
        match self.coords.iter_mut().find(|c| c.name == coord.name) {
            Some(existing) => *existing = coord,
            None => self.coords.push(coord),
        }
        Ok(())
    }

    pub fn remove_coord(&mut self, name: &str) -> Option<Coord> {
        let pos = self.coords.iter().position(|c| c.name == name)?;
        Some(self.coords.remove(pos))
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    fn validate_coord(&self, coord: &Coord) -> CubeResult<()> {
        let mut expected = 1;
        for &dim in &coord.dims {
            let d = self.dims.get(dim).ok_or_else(|| CubeError::UnknownDimension {
                name: coord.name.clone(),
                dim,
                ndim: self.dims.len(),
            })?;
            expected *= d.len;
        }
        if coord.len() != expected {
            return Err(CubeError::CoordLengthMismatch {
                name: coord.name.clone(),
                expected,
                actual: coord.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_2x3() -> Cube {
        Cube::new(
            "air_temperature",
            "K",
            vec![Dimension::new("y", 2), Dimension::new("x", 3)],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_strides_and_flat_index() {
        let cube = cube_2x3();
        assert_eq!(cube.strides(), vec![3, 1]);
        assert_eq!(cube.flat_index(&[1, 2]), Some(5));
        assert_eq!(cube.flat_index(&[2, 0]), None);
        assert_eq!(cube.flat_index(&[0]), None);
    }

    #[test]
    fn test_parse_cell_methods() {
        let methods =
            CellMethod::parse_list("time: maximum area: mean (comment: land only)").unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0], CellMethod::new("maximum", vec!["time".to_string()]));
        assert_eq!(methods[1].method, "mean");
        assert_eq!(methods[1].comment.as_deref(), Some("land only"));
        assert_eq!(
            CellMethod::format_list(&methods),
            "time: maximum area: mean (comment: land only)"
        );
    }

    #[test]
    fn test_parse_cell_methods_multiple_coords() {
        let methods = CellMethod::parse_list("lat: lon: mean").unwrap();
        assert_eq!(methods[0].coords, vec!["lat", "lon"]);
    }

    #[test]
    fn test_parse_cell_methods_invalid() {
        assert!(CellMethod::parse_list("mean").is_err());
        assert!(CellMethod::parse_list("time:").is_err());
        assert!(CellMethod::parse_list("time: mean (unterminated").is_err());
    }
}
