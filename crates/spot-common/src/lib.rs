//! Common types shared across the spot extraction workspace.
//!
//! The central type is [`Cube`]: an array of physical values bundled with its
//! dimensions, coordinates, attributes and cell methods.

pub mod attribute;
pub mod coord;
pub mod cube;
pub mod error;
pub mod time;

pub use attribute::AttributeValue;
pub use coord::{Coord, CoordValues};
pub use cube::{CellMethod, Cube, Dimension};
pub use error::{CubeError, CubeResult};
pub use time::TimeUnits;
