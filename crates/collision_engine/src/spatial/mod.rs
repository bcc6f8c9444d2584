//! Spatial partitioning data structures
//!
//! Provides the grid index used for broad-phase collision detection and
//! overlap queries in 2D space.

mod grid;

pub use grid::{CellCoord, CellRange, SpatialPartition};
