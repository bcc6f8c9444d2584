//! Debug module for visualization and debugging tools
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 10.2:
//! "Debug Drawing Facilities"
//!
//! The crate does no rendering; it hands out coloured rectangles a renderer
//! can draw on top of the level.

pub mod bounds_overlay;

pub use bounds_overlay::{BoundsOverlay, DebugColors, DebugRect};
