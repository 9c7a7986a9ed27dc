//! Grid packer module orchestrator.
//!
//! Downstream code imports packing types from here while the algorithm lives
//! in the private `core` module.

mod core;
pub mod grid;

pub use core::{PackResult, PackedTile, TilePlacement, pack};
pub use grid::{GridPosition, OccupancyMap};
