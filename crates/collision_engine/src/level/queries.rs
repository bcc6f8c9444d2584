//! Read-only questions gameplay code asks about a level
//!
//! Everything here is a composition of partition queries and box tests; no
//! query keeps state between calls.

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::{constants, Vec2};
use crate::level::world::CollisionWorld;
use crate::physics::collision_box::BoxKey;
use crate::physics::collision_layers::LayerMask;
use crate::physics::error::CollisionError;
use crate::physics::narrow_phase;

/// Result of a line-of-sight check between two boxes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOfSight {
    /// Nothing solid in between
    Visible {
        /// Centre-to-centre distance
        distance: f32,
    },
    /// A solid box cuts the line
    Blocked {
        /// Nearest blocking box
        by: BoxKey,
        /// Distance from the viewer's centre to where the line enters `by`
        distance: f32,
    },
    /// Target is further away than allowed
    OutOfRange {
        /// Centre-to-centre distance
        distance: f32,
    },
}

impl LineOfSight {
    /// True for [`LineOfSight::Visible`]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }
}

impl CollisionWorld {
    /// Boxes whose bounds strictly overlap `rect` and whose layer matches `filter`
    ///
    /// `exclude` skips one box, usually the asker. Results are in
    /// registration order.
    pub fn overlapping_at(&self, rect: &Aabb2, filter: LayerMask, exclude: Option<BoxKey>) -> Vec<BoxKey> {
        self.partition
            .query_bounds(rect, Some(filter))
            .into_iter()
            .filter(|key| Some(*key) != exclude)
            .filter(|key| {
                self.boxes
                    .get(*key)
                    .is_some_and(|b| narrow_phase::is_overlapping(&b.bounds(), rect))
            })
            .collect()
    }

    /// True when `key`'s bounds shifted down by `vertical_offset` overlap a solid box
    ///
    /// A body resting flush on a floor is grounded for any positive offset and
    /// not grounded for an offset of zero.
    pub fn is_grounded_at(&self, key: BoxKey, vertical_offset: f32) -> Result<bool, CollisionError> {
        let probe = self.bounds(key)?.translated(Vec2::new(0.0, vertical_offset));
        Ok(!self.overlapping_at(&probe, LayerMask::SOLID, Some(key)).is_empty())
    }

    /// [`Self::is_grounded_at`] with the configured ground probe
    pub fn is_grounded(&self, key: BoxKey) -> Result<bool, CollisionError> {
        self.is_grounded_at(key, self.config().ground_probe)
    }

    /// Solid boxes crossed by the segment between the centres of `from` and `to`
    ///
    /// Both end boxes are skipped. Each entry carries the distance from
    /// `from`'s centre to the point where the segment enters the box; entries
    /// are sorted nearest first.
    pub fn intervening_solids(&self, from: BoxKey, to: BoxKey) -> Result<Vec<(BoxKey, f32)>, CollisionError> {
        let start = self.bounds(from)?.center();
        let end = self.bounds(to)?.center();
        let delta = end - start;
        let length = delta.norm();

        let region = Aabb2::new(start.inf(&end), start.sup(&end)).inflated(constants::CONTACT_EPSILON);
        let mut crossed: Vec<(BoxKey, f32)> = self
            .partition
            .query_bounds(&region, Some(LayerMask::SOLID))
            .into_iter()
            .filter(|key| *key != from && *key != to)
            .filter_map(|key| {
                let bounds = self.boxes.get(key)?.bounds();
                bounds.intersect_segment(start, delta).map(|t| (key, t * length))
            })
            .collect();

        // Stable, so equal distances keep registration order
        crossed.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(crossed)
    }

    /// Can `from` see `to` within `max_distance`?
    pub fn line_of_sight(&self, from: BoxKey, to: BoxKey, max_distance: f32) -> Result<LineOfSight, CollisionError> {
        let distance = (self.bounds(to)?.center() - self.bounds(from)?.center()).norm();
        if distance > max_distance {
            return Ok(LineOfSight::OutOfRange { distance });
        }

        Ok(match self.intervening_solids(from, to)?.first() {
            Some(&(by, at)) => LineOfSight::Blocked { by, distance: at },
            None => LineOfSight::Visible { distance },
        })
    }

    /// Every box currently overlapping `key`, whatever its layer
    pub fn trigger_overlap(&self, key: BoxKey) -> Result<Vec<BoxKey>, CollisionError> {
        self.trigger_overlap_filtered(key, LayerMask::ALL)
    }

    /// Boxes currently overlapping `key` whose layer matches `filter`
    pub fn trigger_overlap_filtered(&self, key: BoxKey, filter: LayerMask) -> Result<Vec<BoxKey>, CollisionError> {
        let bounds = self.bounds(key)?;
        Ok(self.overlapping_at(&bounds, filter, Some(key)))
    }
}
