//! Level data handed over by a content loader
//!
//! A level file lists its static geometry and its bodies. Both TOML and RON
//! work, picked by file extension through [`Config`]:
//!
//! ```toml
//! cell_size = 16.0
//!
//! [[statics]]
//! position = [0.0, 96.0]
//! size = [160.0, 16.0]
//!
//! [[bodies]]
//! position = [16.0, 40.0]
//! size = [12.0, 20.0]
//! velocity = [2.0, 3.0]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec2;
use crate::physics::collision_box::CollisionBox;
use crate::physics::collision_layers::LayerMask;
use crate::physics::error::CollisionError;

/// Errors raised while building a level
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    /// Level or world configuration could not be used
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A box in the level was rejected
    #[error("Collision error: {0}")]
    Collision(#[from] CollisionError),
}

fn solid_layer() -> LayerMask {
    LayerMask::SOLID
}

fn body_layer() -> LayerMask {
    LayerMask::PLAYER
}

fn build_box(
    position: [f32; 2],
    origin: [f32; 2],
    size: [f32; 2],
    layer: LayerMask,
) -> Result<CollisionBox, CollisionError> {
    CollisionBox::with_origin(Vec2::from(position), Vec2::from(origin), size[0], size[1], layer)
}

/// A piece of static level geometry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticBoxDesc {
    /// Position of the box
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Offset from the top-left corner to `position`
    #[serde(default)]
    pub origin: [f32; 2],
    /// Layer bits, solid unless stated
    #[serde(default = "solid_layer")]
    pub layer: LayerMask,
}

impl StaticBoxDesc {
    /// Construct the box this entry describes
    pub fn build(&self) -> Result<CollisionBox, CollisionError> {
        build_box(self.position, self.origin, self.size, self.layer)
    }
}

/// A body placed in the level at load time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyDesc {
    /// Spawn position
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Offset from the top-left corner to `position`
    #[serde(default)]
    pub origin: [f32; 2],
    /// Layer bits, player unless stated
    #[serde(default = "body_layer")]
    pub layer: LayerMask,
    /// Desired per-tick velocity, read by whoever drives the body
    #[serde(default)]
    pub velocity: [f32; 2],
}

impl BodyDesc {
    /// Desired velocity as a vector
    pub fn velocity(&self) -> Vec2 {
        Vec2::from(self.velocity)
    }

    /// Construct the box this entry describes
    pub fn build(&self) -> Result<CollisionBox, CollisionError> {
        build_box(self.position, self.origin, self.size, self.layer)
    }
}

/// Contents of a level file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelDesc {
    /// Partition cell size; falls back to the world config when absent
    pub cell_size: Option<f32>,
    /// Static geometry, registered first
    pub statics: Vec<StaticBoxDesc>,
    /// Bodies, registered after the statics
    pub bodies: Vec<BodyDesc>,
}

impl Config for LevelDesc {}
