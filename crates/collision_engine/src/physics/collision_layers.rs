//! Collision layer system for filtering collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! Every box carries a [`LayerMask`] naming the categories it belongs to.
//! Queries take a second mask as a filter; a box passes when the two share
//! at least one bit.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer bitset
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LayerMask: u32 {
        /// Blocks movement of bodies
        const SOLID = 1 << 0;
        /// Can receive damage
        const DAMAGEABLE = 1 << 1;
        /// Projectiles (bullets, arrows, etc.)
        const PROJECTILE = 1 << 2;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 3;
        /// Pickups and collectibles
        const PICKUP = 1 << 4;
        /// Player character
        const PLAYER = 1 << 5;
        /// Enemy characters
        const ENEMY = 1 << 6;
        /// Spikes, lava and other harmful level geometry
        const HAZARD = 1 << 7;

        // User-defined bits stay representable
        const _ = !0;
    }
}

impl LayerMask {
    /// No collision layer
    pub const NONE: Self = Self::empty();

    /// All collision layers
    pub const ALL: Self = Self::all();
}

/// Union of two masks
pub const fn combine(a: LayerMask, b: LayerMask) -> LayerMask {
    a.union(b)
}

/// True when `mask` shares at least one bit with `filter`
pub const fn matches(mask: LayerMask, filter: LayerMask) -> bool {
    mask.intersects(filter)
}

/// True when `mask` carries the solid bit
pub const fn is_solid(mask: LayerMask) -> bool {
    matches(mask, LayerMask::SOLID)
}

/// Check if two boxes should collide based on their layers and masks
///
/// A's layer must be in B's mask AND B's layer must be in A's mask.
///
/// # Example
/// ```
/// use collision_engine::physics::collision_layers::{should_collide, LayerMask};
///
/// let player = (LayerMask::PLAYER, LayerMask::ENEMY | LayerMask::SOLID);
/// let enemy = (LayerMask::ENEMY, LayerMask::PLAYER | LayerMask::PROJECTILE);
/// assert!(should_collide(player.0, player.1, enemy.0, enemy.1));
/// ```
pub const fn should_collide(
    layer_a: LayerMask,
    mask_a: LayerMask,
    layer_b: LayerMask,
    mask_b: LayerMask,
) -> bool {
    matches(layer_a, mask_b) && matches(layer_b, mask_a)
}

/// Helper to create a mask from multiple layers
pub fn mask(layers: &[LayerMask]) -> LayerMask {
    layers.iter().fold(LayerMask::NONE, |acc, &layer| combine(acc, layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_and_matches() {
        let mask = combine(LayerMask::SOLID, LayerMask::DAMAGEABLE);
        assert!(matches(mask, LayerMask::SOLID));
        assert!(matches(mask, LayerMask::DAMAGEABLE | LayerMask::PICKUP));
        assert!(!matches(mask, LayerMask::PICKUP));
        assert!(!matches(mask, LayerMask::NONE));
    }

    #[test]
    fn test_is_solid() {
        assert!(is_solid(LayerMask::SOLID | LayerMask::HAZARD));
        assert!(!is_solid(LayerMask::TRIGGER));
        assert!(is_solid(LayerMask::ALL));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Player wants the enemy, the enemy only listens to projectiles
        assert!(!should_collide(
            LayerMask::PLAYER,
            LayerMask::ENEMY,
            LayerMask::ENEMY,
            LayerMask::PROJECTILE,
        ));
    }

    #[test]
    fn test_mask_creation() {
        let mask = mask(&[LayerMask::PLAYER, LayerMask::ENEMY, LayerMask::SOLID]);
        assert_eq!(mask, LayerMask::PLAYER | LayerMask::ENEMY | LayerMask::SOLID);
        assert_eq!(super::mask(&[]), LayerMask::NONE);
    }

    #[test]
    fn test_custom_bits_survive() {
        let custom = LayerMask::from_bits_retain(1 << 20);
        assert!(matches(custom | LayerMask::SOLID, custom));
        assert_eq!((custom | LayerMask::SOLID).bits(), (1 << 20) | 1);
    }
}
