//! Cube attribute values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a cube (or NetCDF global) attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Float(f64),
    Text(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl AttributeValue {
    /// Borrow the value as a string slice if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a scalar JSON value into an attribute value.
    ///
    /// Arrays are accepted when every element is a number. Objects, booleans
    /// and null have no attribute representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Some(AttributeValue::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(AttributeValue::Int)
                .or_else(|| n.as_f64().map(AttributeValue::Float)),
            Value::Array(items) => {
                if items.iter().all(|v| v.is_i64()) {
                    Some(AttributeValue::Ints(
                        items.iter().filter_map(|v| v.as_i64()).collect(),
                    ))
                } else if items.iter().all(|v| v.is_number()) {
                    Some(AttributeValue::Floats(
                        items.iter().filter_map(|v| v.as_f64()).collect(),
                    ))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Ints(v) => write!(f, "{:?}", v),
            AttributeValue::Floats(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}
