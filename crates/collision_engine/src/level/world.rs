//! Level-scoped collision context
//!
//! A [`CollisionWorld`] is created when a level starts and dropped when it
//! ends. It owns every box of the level, the one spatial partition they are
//! filed in, and the tunables. Nothing here is global.

use log::{debug, info};
use slotmap::SlotMap;

use crate::config::CollisionConfig;
use crate::foundation::aabb::Aabb2;
use crate::foundation::math::Vec2;
use crate::level::desc::{LevelDesc, LevelError};
use crate::physics::body::{self, MoveReport, ResolveLimits, ResponsePolicy};
use crate::physics::collision_box::{BoxKey, CollisionBox};
use crate::physics::collision_layers::LayerMask;
use crate::physics::error::CollisionError;
use crate::spatial::SpatialPartition;

/// Owner of a level's boxes and spatial partition
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    pub(crate) boxes: SlotMap<BoxKey, CollisionBox>,
    pub(crate) partition: SpatialPartition,
    config: CollisionConfig,
}

impl CollisionWorld {
    /// Create an empty world
    pub fn new(config: CollisionConfig) -> Result<Self, LevelError> {
        config.validate()?;
        let partition = SpatialPartition::new(config.cell_size)?;
        Ok(Self {
            boxes: SlotMap::with_key(),
            partition,
            config,
        })
    }

    /// Build a world from level data
    ///
    /// Statics are registered first, then bodies, each in file order. The
    /// level's `cell_size`, when present, overrides the config's. Returns the
    /// world and the keys of the spawned bodies in file order.
    pub fn from_level(desc: &LevelDesc, config: CollisionConfig) -> Result<(Self, Vec<BoxKey>), LevelError> {
        let config = CollisionConfig {
            cell_size: desc.cell_size.unwrap_or(config.cell_size),
            ..config
        };
        let mut world = Self::new(config)?;

        for static_box in &desc.statics {
            world.spawn(static_box.build()?)?;
        }
        let bodies = desc
            .bodies
            .iter()
            .map(|b| world.spawn(b.build()?))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "CollisionWorld: loaded level with {} static box(es) and {} body(ies), cell size {}",
            desc.statics.len(),
            bodies.len(),
            world.config.cell_size
        );
        Ok((world, bodies))
    }

    /// Active tunables
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Read-only view of the partition (debug overlays, diagnostics)
    pub fn partition(&self) -> &SpatialPartition {
        &self.partition
    }

    /// Number of boxes in the world
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True when the world holds no boxes
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// True when `key` names a live box
    pub fn contains(&self, key: BoxKey) -> bool {
        self.boxes.contains_key(key)
    }

    /// Look up a box
    pub fn get(&self, key: BoxKey) -> Option<&CollisionBox> {
        self.boxes.get(key)
    }

    /// Current bounds of a box
    pub fn bounds(&self, key: BoxKey) -> Result<Aabb2, CollisionError> {
        self.boxes
            .get(key)
            .map(CollisionBox::bounds)
            .ok_or(CollisionError::NotRegistered(key))
    }

    /// Iterate every box
    pub fn iter(&self) -> impl Iterator<Item = (BoxKey, &CollisionBox)> {
        self.boxes.iter()
    }

    /// Take ownership of a box and register it in the partition
    pub fn spawn(&mut self, collision_box: CollisionBox) -> Result<BoxKey, CollisionError> {
        let bounds = collision_box.bounds();
        let layer = collision_box.layer();
        let key = self.boxes.insert(collision_box);
        if let Err(err) = self.partition.add(key, &bounds, layer) {
            self.boxes.remove(key);
            return Err(err);
        }
        debug!("CollisionWorld: spawned {key:?} at {:?}", bounds.min);
        Ok(key)
    }

    /// Deregister a box and hand it back
    pub fn despawn(&mut self, key: BoxKey) -> Result<CollisionBox, CollisionError> {
        if !self.boxes.contains_key(key) {
            return Err(CollisionError::NotRegistered(key));
        }
        self.partition.remove(key)?;
        self.boxes.remove(key).ok_or(CollisionError::NotRegistered(key))
    }

    /// Teleport a box, keeping the partition in sync
    ///
    /// No collision checks happen; use [`Self::move_body`] for that.
    pub fn set_position(&mut self, key: BoxKey, position: Vec2) -> Result<(), CollisionError> {
        body::relocate(&mut self.partition, &mut self.boxes, key, position)
    }

    /// Move a body by `velocity`, resolving contacts against solid boxes
    pub fn move_body<P>(&mut self, key: BoxKey, velocity: Vec2, policy: &mut P) -> Result<MoveReport, CollisionError>
    where
        P: ResponsePolicy + ?Sized,
    {
        self.move_body_filtered(key, velocity, LayerMask::SOLID, policy)
    }

    /// Move a body, treating boxes whose layer matches `filter` as obstacles
    pub fn move_body_filtered<P>(
        &mut self,
        key: BoxKey,
        velocity: Vec2,
        filter: LayerMask,
        policy: &mut P,
    ) -> Result<MoveReport, CollisionError>
    where
        P: ResponsePolicy + ?Sized,
    {
        let limits = ResolveLimits {
            max_iterations: self.config.max_resolution_iterations,
            min_velocity: self.config.min_velocity,
        };
        body::resolve_move(&mut self.partition, &mut self.boxes, key, velocity, filter, policy, limits)
    }
}
