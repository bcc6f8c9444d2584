//! # Collision Engine
//!
//! 2D axis-aligned collision detection and movement resolution for
//! tile-based games.
//!
//! ## Features
//!
//! - **Grid Broadphase**: Uniform-cell spatial partition with layer filtering
//! - **Swept Narrowphase**: Continuous AABB sweeps, no tunnelling through thin walls
//! - **Resolved Movement**: Multi-contact body movement with pluggable response policies
//! - **Level Queries**: Grounded, line-of-sight and trigger-overlap checks
//! - **Level Loading**: Static geometry and bodies from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut world = CollisionWorld::new(CollisionConfig::default())?;
//!     world.spawn(CollisionBox::new(Vec2::new(0.0, 32.0), 128.0, 16.0, LayerMask::SOLID)?)?;
//!     let player = world.spawn(CollisionBox::new(Vec2::new(8.0, 0.0), 12.0, 20.0, LayerMask::PLAYER)?)?;
//!
//!     let report = world.move_body(player, Vec2::new(4.0, 24.0), &mut slide)?;
//!     assert!(report.collided());
//!     assert!(world.is_grounded(player)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod foundation;
pub mod level;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError},
        foundation::{
            aabb::Aabb2,
            math::{Vec2, Vec4},
        },
        level::{CollisionWorld, LevelDesc, LevelError, LineOfSight},
        physics::{
            body::{bounce, ignore, slide, MoveReport, ResponsePolicy},
            collision_box::{BoxKey, CollisionBox},
            collision_layers::LayerMask,
            error::CollisionError,
            narrow_phase::Hit,
        },
        spatial::SpatialPartition,
    };
}
