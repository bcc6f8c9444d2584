//! Math utilities and types
//!
//! Provides the 2D math types used by the collision engine. World space is
//! screen-like: x grows to the right and y grows downward.

pub use nalgebra::{Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type (used for RGBA debug colours)
pub type Vec4 = Vector4<f32>;

/// Math constants
pub mod constants {
    /// Tolerance used when comparing contact positions and times
    pub const CONTACT_EPSILON: f32 = 1e-4;

    /// Velocities shorter than this are treated as zero by default
    pub const MIN_VELOCITY: f32 = 1e-4;
}

/// Math utility functions
pub mod utils {
    use super::Vec2;

    /// True when `v` has (near) zero length
    pub fn is_near_zero(v: &Vec2, epsilon: f32) -> bool {
        v.norm_squared() <= epsilon * epsilon
    }

    /// Sign of `value` as -1, 0 or 1
    pub fn signum_or_zero(value: f32) -> f32 {
        if value > 0.0 {
            1.0
        } else if value < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    /// Next representable `f32` after `value` in the direction of `direction`'s sign
    ///
    /// Returns `value` unchanged when it is not finite or `direction` is zero.
    pub fn step_toward(value: f32, direction: f32) -> f32 {
        if !value.is_finite() || direction == 0.0 {
            return value;
        }
        if value == 0.0 {
            let smallest = f32::from_bits(1);
            return if direction > 0.0 { smallest } else { -smallest };
        }
        let bits = value.to_bits();
        let grows = (value > 0.0) == (direction > 0.0);
        f32::from_bits(if grows { bits + 1 } else { bits - 1 })
    }
}
