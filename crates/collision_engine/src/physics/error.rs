//! Collision error taxonomy

use thiserror::Error;

use crate::physics::collision_box::BoxKey;

/// Errors raised by the partition, the box constructors and body movement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// The box is already filed in the partition
    #[error("box {0:?} is already registered")]
    DuplicateRegistration(BoxKey),

    /// The box is not filed in the partition (or not spawned in the world)
    #[error("box {0:?} is not registered")]
    NotRegistered(BoxKey),

    /// Zero, negative or non-finite width/height
    #[error("degenerate box: width {width}, height {height}")]
    DegenerateBox {
        /// Rejected width
        width: f32,
        /// Rejected height
        height: f32,
    },

    /// A single move hit the resolution iteration cap
    #[error("movement of {body:?} stopped after {iterations} contact resolutions")]
    ResolutionOverflow {
        /// Body that was moving
        body: BoxKey,
        /// Iterations performed before giving up
        iterations: u32,
    },

    /// The box's bounds would be filed under more partition cells than allowed
    #[error("box {key:?} would cover {cells} partition cells")]
    BoundsTooLarge {
        /// Rejected box
        key: BoxKey,
        /// Cells its bounds cover
        cells: usize,
    },

    /// Partition cell size must be positive and finite
    #[error("invalid partition cell size: {0}")]
    InvalidCellSize(f32),
}
