//! Metadata amendments loaded from JSON.
//!
//! The JSON document is an object whose keys name the metadata to change:
//!
//! ```json
//! {
//!     "name": "temperature_at_screen_level",
//!     "units": "K",
//!     "attributes": {"source": "IMPROVER", "history": "delete"},
//!     "coordinates": {"height": {"points": [2.0], "units": "m"}},
//!     "cell_methods": [{"action": "add", "method": "mean", "coords": ["time"]}],
//!     "title": "Spot forecast"
//! }
//! ```
//!
//! Any other top-level key with a scalar (or numeric array) value is an
//! attribute edit, so `{"title": "X"}` sets the `title` attribute.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use spot_common::{AttributeValue, CellMethod, CoordValues, Cube};
use tracing::debug;

use crate::error::{SpotError, SpotResult};

/// Value marking an attribute or coordinate for removal.
const DELETE: &str = "delete";

/// Change to a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeEdit {
    Set(AttributeValue),
    Delete,
}

/// Change to a single coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordEdit {
    Update(CoordUpdate),
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordUpdate {
    pub points: Option<Vec<f64>>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellMethodAction {
    Add,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellMethodEdit {
    pub action: CellMethodAction,
    pub method: String,
    #[serde(default)]
    pub coords: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A set of metadata changes to apply to a cube.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataAmendments {
    pub name: Option<String>,
    pub units: Option<String>,
    pub attributes: BTreeMap<String, AttributeEdit>,
    pub coordinates: BTreeMap<String, CoordEdit>,
    pub cell_methods: Vec<CellMethodEdit>,
}

impl MetadataAmendments {
    /// Read amendments from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SpotResult<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    /// Interpret a parsed JSON document.
    pub fn from_json(value: &Value) -> SpotResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SpotError::invalid_metadata("expected a JSON object"))?;

        let mut amendments = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "name" => amendments.name = Some(expect_string(key, value)?),
                "units" => amendments.units = Some(expect_string(key, value)?),
                "attributes" => {
                    let entries = value.as_object().ok_or_else(|| {
                        SpotError::invalid_metadata("attributes must be an object")
                    })?;
                    for (attr, edit) in entries {
                        amendments
                            .attributes
                            .insert(attr.clone(), attribute_edit(attr, edit)?);
                    }
                }
                "coordinates" => {
                    let entries = value.as_object().ok_or_else(|| {
                        SpotError::invalid_metadata("coordinates must be an object")
                    })?;
                    for (coord, edit) in entries {
                        let edit = if edit.as_str() == Some(DELETE) {
                            CoordEdit::Delete
                        } else {
                            CoordEdit::Update(CoordUpdate::deserialize(edit)?)
                        };
                        amendments.coordinates.insert(coord.clone(), edit);
                    }
                }
                "cell_methods" => {
                    amendments.cell_methods = Vec::<CellMethodEdit>::deserialize(value)?;
                }
                _ => {
                    let edit = attribute_edit(key, value)?;
                    amendments.attributes.insert(key.clone(), edit);
                }
            }
        }
        Ok(amendments)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl FromStr for MetadataAmendments {
    type Err = SpotError;

    fn from_str(s: &str) -> SpotResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

fn expect_string(key: &str, value: &Value) -> SpotResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SpotError::invalid_metadata(format!("{} must be a string", key)))
}

fn attribute_edit(key: &str, value: &Value) -> SpotResult<AttributeEdit> {
    if value.as_str() == Some(DELETE) {
        return Ok(AttributeEdit::Delete);
    }
    AttributeValue::from_json(value)
        .map(AttributeEdit::Set)
        .ok_or_else(|| {
            SpotError::invalid_metadata(format!(
                "'{}' is not a recognised metadata field and its value is not an attribute value",
                key
            ))
        })
}

/// Apply `amendments` to `cube` in place.
///
/// Coordinates named by an edit must exist on the cube. New points must
/// keep the coordinate's length. Deleting an absent attribute is a no-op.
pub fn amend_metadata(cube: &mut Cube, amendments: &MetadataAmendments) -> SpotResult<()> {
    if let Some(name) = &amendments.name {
        cube.name = name.clone();
    }
    if let Some(units) = &amendments.units {
        cube.units = units.clone();
    }

    for (key, edit) in &amendments.attributes {
        match edit {
            AttributeEdit::Set(value) => {
                cube.attributes.insert(key.clone(), value.clone());
            }
            AttributeEdit::Delete => {
                cube.attributes.remove(key);
            }
        }
    }

    for (name, edit) in &amendments.coordinates {
        match edit {
            CoordEdit::Delete => {
                cube.remove_coord(name).ok_or_else(|| {
                    SpotError::invalid_metadata(format!("coordinate {} not found", name))
                })?;
            }
            CoordEdit::Update(update) => {
                let mut coord = cube.coord(name).cloned().ok_or_else(|| {
                    SpotError::invalid_metadata(format!("coordinate {} not found", name))
                })?;
                if let Some(points) = &update.points {
                    coord.values = CoordValues::Numeric(points.clone());
                }
                if let Some(units) = &update.units {
                    coord.units = units.clone();
                }
                cube.replace_coord(coord)?;
            }
        }
    }

    for edit in &amendments.cell_methods {
        let mut method = CellMethod::new(edit.method.clone(), edit.coords.clone());
        method.comment = edit.comment.clone();
        match edit.action {
            CellMethodAction::Add => {
                if !cube.cell_methods.contains(&method) {
                    cube.cell_methods.push(method);
                }
            }
            CellMethodAction::Delete => {
                cube.cell_methods
                    .retain(|m| !(m.method == method.method && m.coords == method.coords));
            }
        }
    }

    debug!(
        name = %cube.name,
        attributes = amendments.attributes.len(),
        coordinates = amendments.coordinates.len(),
        cell_methods = amendments.cell_methods.len(),
        "Amended metadata"
    );

    Ok(())
}
