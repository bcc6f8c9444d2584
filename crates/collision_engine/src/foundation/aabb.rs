//! Axis-aligned rectangle used for box bounds, sweeps and partition queries

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Axis-Aligned Bounding Box in 2D world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    /// Minimum (top-left) corner
    pub min: Vec2,
    /// Maximum (bottom-right) corner
    pub max: Vec2,
}

impl Aabb2 {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB from its minimum corner and size
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Width of the AABB
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the AABB
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Copy of this AABB moved by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest AABB containing both `self` and `other`
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grow the AABB by `margin` on every side
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        let delta = Vec2::new(margin, margin);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Region covered by this AABB while it travels along `velocity`
    #[must_use]
    pub fn swept(&self, velocity: Vec2) -> Self {
        self.union(&self.translated(velocity))
    }

    /// Check if this AABB contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Strict intersection: the two rectangles share a region of positive area.
    ///
    /// Rectangles that only touch along an edge or corner do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closed intersection: true when the rectangles overlap or touch
    pub fn touches(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Signed overlap on each axis, positive only where the rectangles overlap
    pub fn overlap(&self, other: &Self) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }

    /// Test the segment `start -> start + delta` against this AABB (slab method).
    ///
    /// Returns the entry fraction in `[0, 1]` along the segment, `0.0` when the
    /// segment starts inside the box, or `None` when it misses. Grazing an edge
    /// without entering the interior counts as a miss.
    pub fn intersect_segment(&self, start: Vec2, delta: Vec2) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for axis in 0..2 {
            let origin = start[axis];
            let d = delta[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d == 0.0 {
                if origin <= lo || origin >= hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - origin) * inv;
            let mut t2 = (hi - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min >= t_max {
                return None;
            }
        }

        Some(t_min)
    }
}
