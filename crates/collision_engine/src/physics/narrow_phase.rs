//! Swept AABB narrowphase
//!
//! GEA 13.3.4: "The narrow phase performs detailed shape-to-shape tests."
//!
//! The moving box is swept along its velocity against each stationary
//! candidate. Per axis we compute the fraction of the velocity at which the
//! two intervals start and stop overlapping; the box touches the candidate
//! at the latest entry time, provided that comes before the earliest exit.
//! This is the same as casting the mover's centre against the candidate
//! grown by the mover's half extents.

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::{constants, utils, Vec2};
use crate::physics::collision_box::BoxKey;

/// A contact found by [`sweep`]
///
/// Hits only live for the duration of one response callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Box that was hit
    pub other: BoxKey,
    /// Fraction of the velocity travelled before contact, in `[0, 1]`
    pub time: f32,
    /// Position the moving box occupies at the moment of contact
    pub position: Vec2,
    /// Unit axis normal of the touched face, pointing back at the mover
    pub normal: Vec2,
    /// Velocity that was being applied when the contact happened
    pub velocity: Vec2,
    /// Part of the velocity left after reaching the contact position
    pub remaining: Vec2,
    /// Push-back along the contact axis that cancels the blocked part of
    /// `remaining`; `remaining + penetration_depth` is the tangential motion
    pub penetration_depth: Vec2,
}

impl Hit {
    /// Component of the remaining motion parallel to the contact surface
    pub fn tangent(&self) -> Vec2 {
        self.remaining + self.penetration_depth
    }
}

/// Entry and exit times of the mover's interval against the obstacle's on one axis
///
/// Faces closer than [`constants::CONTACT_EPSILON`] count as touching: a
/// leading face that has crept that far past the obstacle's face still enters
/// at `t = 0`, and a stationary axis needs more than that much overlap.
fn axis_interval(min_a: f32, max_a: f32, min_b: f32, max_b: f32, velocity: f32) -> Option<(f32, f32)> {
    let eps = constants::CONTACT_EPSILON;
    if velocity > 0.0 {
        let gap = min_b - max_a;
        let entry = if (-eps..0.0).contains(&gap) { 0.0 } else { gap / velocity };
        Some((entry, (max_b - min_a) / velocity))
    } else if velocity < 0.0 {
        let gap = min_a - max_b;
        let entry = if (-eps..0.0).contains(&gap) { 0.0 } else { gap / -velocity };
        Some((entry, (min_b - max_a) / velocity))
    } else if min_a < max_b - eps && max_a > min_b + eps {
        // Stationary on this axis and already overlapping: never blocks entry
        Some((f32::NEG_INFINITY, f32::INFINITY))
    } else {
        None
    }
}

/// Time of first contact of `moving` against `obstacle` and the contact normal
///
/// Returns `None` when the sweep misses, only grazes an edge or corner, or
/// when the boxes already overlap at `t = 0` by more than the contact
/// tolerance. On an exact corner hit the horizontal face wins.
pub fn time_of_impact(moving: &Aabb2, velocity: Vec2, obstacle: &Aabb2) -> Option<(f32, Vec2)> {
    if velocity.x == 0.0 && velocity.y == 0.0 {
        return None;
    }

    let (entry_x, exit_x) = axis_interval(moving.min.x, moving.max.x, obstacle.min.x, obstacle.max.x, velocity.x)?;
    let (entry_y, exit_y) = axis_interval(moving.min.y, moving.max.y, obstacle.min.y, obstacle.max.y, velocity.y)?;

    let entry = entry_x.max(entry_y);
    let exit = exit_x.min(exit_y);

    if entry >= exit || !(0.0..=1.0).contains(&entry) {
        return None;
    }

    let normal = if entry_x >= entry_y {
        Vec2::new(-utils::signum_or_zero(velocity.x), 0.0)
    } else {
        Vec2::new(0.0, -utils::signum_or_zero(velocity.y))
    };

    Some((entry, normal))
}

/// Sweep `moving` (currently at `position`) along `velocity` against `candidates`
///
/// The candidate with the smallest entry time wins. When several share the
/// smallest entry time the one yielded first by `candidates` wins; the world
/// feeds candidates in partition registration order, so the box registered
/// first takes precedence.
pub fn sweep<I>(moving: &Aabb2, position: Vec2, velocity: Vec2, candidates: I) -> Option<Hit>
where
    I: IntoIterator<Item = (BoxKey, Aabb2)>,
{
    let mut best: Option<(BoxKey, f32, Vec2, Aabb2)> = None;

    for (key, bounds) in candidates {
        if let Some((time, normal)) = time_of_impact(moving, velocity, &bounds) {
            if best.map_or(true, |(_, best_time, _, _)| time < best_time) {
                best = Some((key, time, normal, bounds));
            }
        }
    }

    best.map(|(other, time, normal, obstacle)| {
        let remaining = velocity * (1.0 - time);
        let into_surface = remaining.dot(&normal);

        // Seat the blocked face on the obstacle's face instead of trusting
        // `velocity * time`, which rounds either side of it
        let mut contact = position + velocity * time;
        let axis = usize::from(normal.x == 0.0);
        contact[axis] = if normal[axis] < 0.0 {
            position[axis] + (obstacle.min[axis] - moving.max[axis])
        } else {
            position[axis] + (obstacle.max[axis] - moving.min[axis])
        };

        Hit {
            other,
            time,
            position: contact,
            normal,
            velocity,
            remaining,
            penetration_depth: normal * -into_surface,
        }
    })
}

/// Static overlap test, distinct from the sweep
///
/// Used for boxes that already intersect before any movement. Touching edges
/// do not count.
pub fn is_overlapping(a: &Aabb2, b: &Aabb2) -> bool {
    a.intersects(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<BoxKey> {
        let mut map: SlotMap<BoxKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn square(x: f32, y: f32) -> Aabb2 {
        Aabb2::from_min_size(Vec2::new(x, y), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_head_on_contact_is_tangent() {
        let k = keys(1);
        let mover = square(0.0, 0.0);
        let wall = square(15.0, 0.0);

        let hit = sweep(&mover, Vec2::zeros(), Vec2::new(20.0, 0.0), [(k[0], wall)]).unwrap();
        assert_eq!(hit.other, k[0]);
        assert_relative_eq!(hit.time, 0.25);
        assert_relative_eq!(hit.position, Vec2::new(5.0, 0.0));
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0));

        let resolved = mover.translated(hit.position);
        assert!(resolved.touches(&wall));
        assert!(!resolved.intersects(&wall));
        assert_relative_eq!(resolved.overlap(&wall).x, 0.0);
    }

    #[test]
    fn test_penetration_depth_cancels_blocked_motion() {
        let k = keys(1);
        let hit = sweep(&square(0.0, 0.0), Vec2::zeros(), Vec2::new(20.0, 8.0), [(k[0], square(15.0, 5.0))]).unwrap();

        assert_relative_eq!(hit.remaining, Vec2::new(15.0, 6.0));
        assert_relative_eq!(hit.penetration_depth, Vec2::new(-15.0, 0.0));
        assert_relative_eq!(hit.tangent(), Vec2::new(0.0, 6.0));
    }

    #[test]
    fn test_vertical_contact_normal() {
        let k = keys(1);
        let floor = Aabb2::from_min_size(Vec2::new(-50.0, 20.0), Vec2::new(100.0, 10.0));
        let hit = sweep(&square(0.0, 0.0), Vec2::zeros(), Vec2::new(0.0, 40.0), [(k[0], floor)]).unwrap();
        assert_relative_eq!(hit.time, 0.25);
        assert_relative_eq!(hit.normal, Vec2::new(0.0, -1.0));
        assert_relative_eq!(hit.position, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn test_zero_velocity_never_contacts() {
        let k = keys(1);
        // Even when already touching
        assert!(sweep(&square(0.0, 0.0), Vec2::zeros(), Vec2::zeros(), [(k[0], square(10.0, 0.0))]).is_none());
    }

    #[test]
    fn test_miss_and_short_sweeps() {
        let k = keys(2);
        let mover = square(0.0, 0.0);
        // Off to the side
        assert!(sweep(&mover, Vec2::zeros(), Vec2::new(20.0, 0.0), [(k[0], square(15.0, 30.0))]).is_none());
        // Not reached this step
        assert!(sweep(&mover, Vec2::zeros(), Vec2::new(4.0, 0.0), [(k[1], square(15.0, 0.0))]).is_none());
    }

    #[test]
    fn test_existing_overlap_is_not_a_sweep_contact() {
        let k = keys(1);
        let mover = square(0.0, 0.0);
        let overlapping = square(5.0, 5.0);
        assert!(is_overlapping(&mover, &overlapping));
        assert!(sweep(&mover, Vec2::zeros(), Vec2::new(10.0, 0.0), [(k[0], overlapping)]).is_none());
    }

    #[test]
    fn test_sliding_along_and_leaving_a_surface() {
        let mover = square(0.0, 0.0);
        let floor = Aabb2::from_min_size(Vec2::new(-50.0, 10.0), Vec2::new(100.0, 10.0));
        // Flush on top of the floor and moving sideways
        assert!(time_of_impact(&mover, Vec2::new(30.0, 0.0), &floor).is_none());
        // Moving away
        assert!(time_of_impact(&mover, Vec2::new(0.0, -5.0), &floor).is_none());
        // Pressing down into it touches immediately
        let (t, normal) = time_of_impact(&mover, Vec2::new(0.0, 5.0), &floor).unwrap();
        assert_eq!(t, 0.0);
        assert_relative_eq!(normal, Vec2::new(0.0, -1.0));
        assert!(!is_overlapping(&mover, &floor));
    }

    #[test]
    fn test_corner_graze_is_not_a_contact() {
        // Leaves the obstacle's rows at the same instant it reaches its
        // columns, so the path only kisses the corner at (20, 10)
        let mover = square(0.0, 0.0);
        let obstacle = Aabb2::from_min_size(Vec2::new(20.0, -10.0), Vec2::new(10.0, 20.0));
        assert!(time_of_impact(&mover, Vec2::new(20.0, 20.0), &obstacle).is_none());
    }

    #[test]
    fn test_exact_corner_hit_prefers_horizontal_face() {
        let mover = square(0.0, 0.0);
        let obstacle = square(20.0, 20.0);
        let (t, normal) = time_of_impact(&mover, Vec2::new(20.0, 20.0), &obstacle).unwrap();
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_contact_position_sits_on_face() {
        let k = keys(1);
        let mover = Aabb2::from_min_size(Vec2::new(3.3, 7.7), Vec2::new(9.1, 13.7));
        let floor = Aabb2::from_min_size(Vec2::new(-50.0, 123.456), Vec2::new(200.0, 10.0));
        let position = mover.min;

        let hit = sweep(&mover, position, Vec2::new(0.37, 211.9), [(k[0], floor)]).unwrap();
        let seated = mover.translated(hit.position - position);
        assert_relative_eq!(seated.max.y, floor.min.y, epsilon = 1e-4);
        assert!(seated.max.y <= floor.min.y + constants::CONTACT_EPSILON);
    }

    #[test]
    fn test_face_slightly_past_obstacle_still_contacts() {
        let mover = square(0.0, 0.0);
        // Bottom face 3e-5 inside the floor, as float rounding can leave it
        let floor = Aabb2::from_min_size(Vec2::new(-50.0, 10.0 - 3.0e-5), Vec2::new(100.0, 10.0));

        let (t, normal) = time_of_impact(&mover, Vec2::new(0.0, 4.0), &floor).unwrap();
        assert_eq!(t, 0.0);
        assert_relative_eq!(normal, Vec2::new(0.0, -1.0));

        // Sliding along it is not a contact with a neighbouring tile either
        let next_tile = Aabb2::from_min_size(Vec2::new(50.0, 10.0 - 3.0e-5), Vec2::new(100.0, 10.0));
        assert!(time_of_impact(&mover, Vec2::new(60.0, 0.0), &next_tile).is_none());
    }

    #[test]
    fn test_earliest_candidate_wins() {
        let k = keys(2);
        let near = square(15.0, 0.0);
        let far = square(25.0, 0.0);
        let hit = sweep(&square(0.0, 0.0), Vec2::zeros(), Vec2::new(40.0, 0.0), [(k[0], far), (k[1], near)]).unwrap();
        assert_eq!(hit.other, k[1]);
    }

    #[test]
    fn test_equal_entry_time_keeps_first_candidate() {
        let k = keys(2);
        let mover = square(0.0, 0.0);
        // Both entered at t = 0.25 on different axes
        let right = square(15.0, 0.0);
        let below = square(0.0, 15.0);
        let velocity = Vec2::new(20.0, 20.0);

        let hit = sweep(&mover, Vec2::zeros(), velocity, [(k[0], right), (k[1], below)]).unwrap();
        assert_eq!(hit.other, k[0]);
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0));

        let hit = sweep(&mover, Vec2::zeros(), velocity, [(k[1], below), (k[0], right)]).unwrap();
        assert_eq!(hit.other, k[1]);
        assert_relative_eq!(hit.normal, Vec2::new(0.0, -1.0));
    }
}
