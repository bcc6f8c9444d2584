//! Physics module for collision detection and response
//!
//! Split the way Game Engine Architecture 13.3 splits it: a broad phase
//! (see [`crate::spatial`]) narrows candidates, the swept narrow phase finds
//! the exact contact, and the body loop reacts to contacts through a
//! caller-supplied response policy.

pub mod body;
pub mod collision_box;
pub mod collision_layers;
pub mod error;
pub mod narrow_phase;

#[cfg(test)]
mod tests;

pub use body::{bounce, ignore, resolve_move, slide, MoveReport, ResolveLimits, ResponsePolicy};
pub use collision_box::{BoxKey, CollisionBox};
pub use collision_layers::LayerMask;
pub use error::CollisionError;
pub use narrow_phase::{is_overlapping, sweep, Hit};
