//! Resolved movement of a body through the partition
//!
//! One call to [`resolve_move`] runs the whole sweep/respond loop for a
//! single body:
//!
//! 1. sweep the body along its velocity against broadphase candidates it
//!    has not touched yet during this call;
//! 2. without contact, apply the velocity and stop;
//! 3. on contact, park the body at the contact position, remember the
//!    obstacle, and ask the response policy for the next velocity;
//! 4. stop on a zero velocity, otherwise go back to 1.
//!
//! Every position change goes through [`relocate`], which refiles the body
//! in the partition.

use std::collections::HashSet;

use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::foundation::aabb::Aabb2;
use crate::foundation::math::{constants, utils, Vec2};
use crate::physics::collision_box::{BoxKey, CollisionBox};
use crate::physics::collision_layers::LayerMask;
use crate::physics::error::CollisionError;
use crate::physics::narrow_phase::{self, Hit};
use crate::spatial::SpatialPartition;

/// Decides how a body continues after a contact
///
/// Any `FnMut(&Hit) -> Vec2` closure or function is a policy.
pub trait ResponsePolicy {
    /// Velocity to continue with; zero ends the movement
    fn respond(&mut self, hit: &Hit) -> Vec2;
}

impl<F> ResponsePolicy for F
where
    F: FnMut(&Hit) -> Vec2,
{
    fn respond(&mut self, hit: &Hit) -> Vec2 {
        self(hit)
    }
}

/// Stop at the first obstruction
pub fn ignore(_hit: &Hit) -> Vec2 {
    Vec2::zeros()
}

/// Keep the remaining motion along the contact surface
pub fn slide(hit: &Hit) -> Vec2 {
    hit.tangent()
}

/// Reflect the remaining motion off the contact surface
pub fn bounce(hit: &Hit) -> Vec2 {
    hit.remaining + hit.penetration_depth * 2.0
}

/// Limits applied to one resolution loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveLimits {
    /// Maximum number of contact resolutions
    pub max_iterations: u32,
    /// Velocities shorter than this end the movement
    pub min_velocity: f32,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            min_velocity: constants::MIN_VELOCITY,
        }
    }
}

/// Outcome of a movement call
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    /// Body that moved
    pub body: BoxKey,
    /// Where the body ended up
    pub position: Vec2,
    /// Obstacles touched, in the order they were hit
    pub contacts: Vec<BoxKey>,
    /// Boxes excluded from further contact: the body and every obstacle hit
    pub visited: HashSet<BoxKey>,
    /// Sweeps performed
    pub iterations: u32,
    /// The iteration cap ended the movement
    pub overflowed: bool,
}

impl MoveReport {
    /// True when at least one contact happened
    pub fn collided(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Turn an overflowed report into [`CollisionError::ResolutionOverflow`]
    pub fn into_result(self) -> Result<Self, CollisionError> {
        if self.overflowed {
            Err(CollisionError::ResolutionOverflow {
                body: self.body,
                iterations: self.iterations,
            })
        } else {
            Ok(self)
        }
    }
}

/// Move a box to `position` and refile it in the partition
///
/// This is the only place a registered box's position changes.
pub fn relocate(
    partition: &mut SpatialPartition,
    boxes: &mut SlotMap<BoxKey, CollisionBox>,
    key: BoxKey,
    position: Vec2,
) -> Result<(), CollisionError> {
    let body = boxes.get_mut(key).ok_or(CollisionError::NotRegistered(key))?;
    let previous = body.bounds();
    let next = body.bounds_at(position);
    partition.update(key, &previous, &next)?;
    body.set_position(position);
    Ok(())
}

/// Push `position` out along `normal` until `body`'s blocked face no longer
/// crosses `obstacle`'s face
///
/// The contact position from the sweep can still land a few ulps inside
/// the obstacle once the body's bounds are recomputed from it.
fn seat_against(body: &CollisionBox, mut position: Vec2, normal: Vec2, obstacle: &Aabb2) -> Vec2 {
    let axis = usize::from(normal.x == 0.0);
    let outward = normal[axis];
    for _ in 0..8 {
        let bounds = body.bounds_at(position);
        let overlap = if outward < 0.0 {
            bounds.max[axis] - obstacle.min[axis]
        } else {
            obstacle.max[axis] - bounds.min[axis]
        };
        if overlap <= 0.0 {
            break;
        }
        position[axis] = utils::step_toward(position[axis] + outward * overlap, outward);
    }
    position
}

/// Run the sweep/respond loop for `key` with initial `velocity`
///
/// Only candidates whose layer matches `filter` can block the body.
pub fn resolve_move<P>(
    partition: &mut SpatialPartition,
    boxes: &mut SlotMap<BoxKey, CollisionBox>,
    key: BoxKey,
    velocity: Vec2,
    filter: LayerMask,
    policy: &mut P,
    limits: ResolveLimits,
) -> Result<MoveReport, CollisionError>
where
    P: ResponsePolicy + ?Sized,
{
    if !partition.contains(key) {
        return Err(CollisionError::NotRegistered(key));
    }

    let mut visited = HashSet::from([key]);
    let mut contacts = Vec::new();
    let mut velocity = velocity;
    let mut iterations = 0;
    let mut overflowed = false;

    loop {
        if utils::is_near_zero(&velocity, limits.min_velocity) {
            break;
        }
        if iterations >= limits.max_iterations {
            warn!(
                "resolve_move: {key:?} hit the resolution cap of {} with velocity {:?} left; \
                 keeping current position",
                limits.max_iterations, velocity
            );
            overflowed = true;
            break;
        }
        iterations += 1;

        let body = boxes.get(key).ok_or(CollisionError::NotRegistered(key))?;
        let position = body.position();
        let bounds = body.bounds();

        // Skin keeps boxes touching the end of the sweep in the candidate set
        let region = bounds.swept(velocity).inflated(constants::CONTACT_EPSILON);
        let candidates = partition.query_bounds_filtered_excluding(&region, filter, &visited);
        trace!(
            "resolve_move: {key:?} iteration {iterations}, velocity {velocity:?}, {} candidate(s)",
            candidates.len()
        );

        let hit = narrow_phase::sweep(
            &bounds,
            position,
            velocity,
            candidates
                .iter()
                .filter_map(|candidate| boxes.get(*candidate).map(|b| (*candidate, b.bounds()))),
        );

        match hit {
            None => {
                relocate(partition, boxes, key, position + velocity)?;
                break;
            }
            Some(mut hit) => {
                if let Some(obstacle) = boxes.get(hit.other).map(CollisionBox::bounds) {
                    hit.position = seat_against(body, hit.position, hit.normal, &obstacle);
                }
                debug!(
                    "resolve_move: {key:?} contacted {:?} at t={:.4}, normal {:?}",
                    hit.other, hit.time, hit.normal
                );
                relocate(partition, boxes, key, hit.position)?;
                visited.insert(hit.other);
                contacts.push(hit.other);
                velocity = policy.respond(&hit);
            }
        }
    }

    let position = boxes.get(key).ok_or(CollisionError::NotRegistered(key))?.position();
    Ok(MoveReport {
        body: key,
        position,
        contacts,
        visited,
        iterations,
        overflowed,
    })
}
