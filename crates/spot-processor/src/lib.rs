//! Spot site extraction from gridded diagnostics.
//!
//! A neighbour cube maps each spot site to a grid point under several
//! selection methods. This crate uses it to pull site values out of gridded
//! cubes, to correct temperatures for the height difference between a site
//! and its grid point, and to amend the metadata of the result.
//!
//! # Pipeline
//!
//! ```text
//! NeighbourSelection::method_name()
//!      │
//!      ▼
//! SpotExtraction::process(neighbours, diagnostic)
//!      │
//!      ├─► check_grid_match (unless no identifier)
//!      │
//!      └─► data[..., y_index, x_index] per site
//!               │
//!               ▼
//!     SpotLapseRateAdjust::process (air_temperature only)
//!               │
//!               ▼
//!       amend_metadata (optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use spot_processor::{NeighbourSelection, SpotExtraction};
//!
//! let method = NeighbourSelection::new(true, false).method_name();
//! let spot = SpotExtraction::new(method, Some("mosg__grid".into()))
//!     .process(&neighbour_cube, &diagnostic_cube)?;
//! ```

pub mod error;
pub mod extraction;
pub mod grid_match;
pub mod lapse_rate;
pub mod metadata;
pub mod neighbour;

// Re-export commonly used types at crate root
pub use error::{SpotError, SpotResult};
pub use extraction::{SpotExtraction, MODEL_GRID_HASH};
pub use grid_match::{check_grid_match, grid_metadata, DEFAULT_GRID_METADATA_IDENTIFIER};
pub use lapse_rate::{single_height_coord, SpotLapseRateAdjust, LAPSE_RATE, TEMPERATURE};
pub use metadata::{amend_metadata, MetadataAmendments};
pub use neighbour::{NeighbourLookup, NeighbourSelection};
