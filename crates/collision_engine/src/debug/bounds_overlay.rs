//! Collision-specific debug visualization
//!
//! Based on Game Engine Architecture 3rd Edition, Section 10.2:
//! "Debug drawing for collision detection typically includes visualizations
//! of bounding volumes, collision shapes, and query results."

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::Vec4;
use crate::level::CollisionWorld;
use crate::physics::collision_box::BoxKey;
use crate::physics::collision_layers::{self, LayerMask};

/// Color scheme for collision visualization
#[derive(Clone, Debug, PartialEq)]
pub struct DebugColors {
    /// Boxes that block movement
    pub solid: Vec4,

    /// Trigger volumes
    pub trigger: Vec4,

    /// Everything else (bodies, pickups, projectiles)
    pub other: Vec4,

    /// Partition cells a box is filed under
    pub cell: Vec4,
}

impl Default for DebugColors {
    fn default() -> Self {
        Self {
            solid: Vec4::new(0.0, 1.0, 0.0, 0.3),   // Green, semi-transparent
            trigger: Vec4::new(1.0, 1.0, 0.0, 0.3), // Yellow, semi-transparent
            other: Vec4::new(1.0, 0.0, 0.0, 0.5),   // Red, semi-transparent
            cell: Vec4::new(0.5, 0.8, 1.0, 0.15),   // Light blue, transparent
        }
    }
}

/// One rectangle for a renderer to draw
#[derive(Clone, Debug, PartialEq)]
pub struct DebugRect {
    /// World-space rectangle
    pub bounds: Aabb2,
    /// RGBA color
    pub color: Vec4,
    /// Box this rectangle belongs to
    pub owner: BoxKey,
}

/// Builds debug rectangles for the boxes of a [`CollisionWorld`]
#[derive(Clone, Debug)]
pub struct BoundsOverlay {
    colors: DebugColors,

    /// Master switch
    pub enabled: bool,

    /// Emit one rectangle per box
    pub show_boxes: bool,

    /// Emit the partition cells each box is filed under
    pub show_cells: bool,
}

impl Default for BoundsOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsOverlay {
    /// Overlay that shows boxes but not cells
    pub fn new() -> Self {
        Self {
            colors: DebugColors::default(),
            enabled: true,
            show_boxes: true,
            show_cells: false,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: DebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Active color scheme
    pub fn colors(&self) -> &DebugColors {
        &self.colors
    }

    /// Color used for a box on `layer`
    pub fn color_for(&self, layer: LayerMask) -> Vec4 {
        if collision_layers::is_solid(layer) {
            self.colors.solid
        } else if layer.contains(LayerMask::TRIGGER) {
            self.colors.trigger
        } else {
            self.colors.other
        }
    }

    /// Rectangles for the current state of `world`
    ///
    /// Box rectangles come first, then cell rectangles. Cells shared by
    /// several boxes are emitted once per box.
    pub fn collect(&self, world: &CollisionWorld) -> Vec<DebugRect> {
        if !self.enabled {
            return Vec::new();
        }

        let mut rects = Vec::new();
        if self.show_boxes {
            rects.extend(world.iter().map(|(key, b)| DebugRect {
                bounds: b.bounds(),
                color: self.color_for(b.layer()),
                owner: key,
            }));
        }

        if self.show_cells {
            let partition = world.partition();
            for (key, _) in world.iter() {
                let Some(range) = partition.cells_of(key) else {
                    continue;
                };
                rects.extend(range.cells().map(|cell| DebugRect {
                    bounds: partition.cell_bounds(cell),
                    color: self.colors.cell,
                    owner: key,
                }));
            }
        }

        rects
    }
}
