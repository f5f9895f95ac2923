//! Tiles per-well microscopy images from a plate run into one labeled plate map.

pub mod config;
pub mod error;
pub mod image_set;
pub mod planner;
pub mod plate;
pub mod render;
pub mod run;

pub use config::{SourceAlignment, TargetRange, TileConfig};
pub use error::TileError;
pub use planner::{CellSize, GridPlan, WellLayout};
pub use plate::{PlateFormat, WellAddress};
pub use run::{TileSummary, prepare, tile_plate};
