//! The single box type shared by static geometry, triggers and moving bodies

use slotmap::new_key_type;

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::Vec2;
use crate::physics::collision_layers::{self, LayerMask};
use crate::physics::error::CollisionError;

new_key_type! {
    /// Identity of a box registered in a collision world.
    ///
    /// Two boxes with identical geometry still get distinct keys, and a key
    /// is never handed out again after its box is despawned.
    pub struct BoxKey;
}

/// Axis-aligned collision box
///
/// `origin` is the offset from the box's minimum corner to its `position`,
/// so `bounds.min = position - origin`. With a zero origin the position is
/// the top-left corner.
///
/// The position is private: once a box lives in a `CollisionWorld` it can
/// only move through the world, which keeps the spatial partition in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBox {
    position: Vec2,
    origin: Vec2,
    width: f32,
    height: f32,
    layer: LayerMask,
}

impl CollisionBox {
    /// Create a box with a zero origin
    pub fn new(position: Vec2, width: f32, height: f32, layer: LayerMask) -> Result<Self, CollisionError> {
        Self::with_origin(position, Vec2::zeros(), width, height, layer)
    }

    /// Create a box whose position sits `origin` units inside its top-left corner
    pub fn with_origin(
        position: Vec2,
        origin: Vec2,
        width: f32,
        height: f32,
        layer: LayerMask,
    ) -> Result<Self, CollisionError> {
        // NaN fails both comparisons, so test for the valid range
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(CollisionError::DegenerateBox { width, height });
        }
        Ok(Self {
            position,
            origin,
            width,
            height,
            layer,
        })
    }

    /// Create a box centred on `center`
    pub fn centered(center: Vec2, width: f32, height: f32, layer: LayerMask) -> Result<Self, CollisionError> {
        Self::with_origin(center, Vec2::new(width * 0.5, height * 0.5), width, height, layer)
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Offset from the minimum corner to the position
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Layer mask
    pub fn layer(&self) -> LayerMask {
        self.layer
    }

    /// True when this box blocks bodies
    pub fn is_solid(&self) -> bool {
        collision_layers::is_solid(self.layer)
    }

    /// World-space bounds at the current position
    pub fn bounds(&self) -> Aabb2 {
        self.bounds_at(self.position)
    }

    /// Bounds this box would have at `position`
    pub fn bounds_at(&self, position: Vec2) -> Aabb2 {
        Aabb2::from_min_size(position - self.origin, self.size())
    }

    /// Only the world may move a registered box
    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}
