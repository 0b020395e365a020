// src/apis/physics_world.rs

use log::debug;
use crate::errors::PhysicsError;
use crate::interactions::{apply_contact_impulse, BodyId, CollisionDetector, CollisionManifold, CollisionPair, Octree};
use crate::models::{Aabb, RigidBody};
use crate::utils::{PhysicsConstants, DEFAULT_PHYSICS_CONSTANTS};

/// One colliding pair found during a tick.
///
/// The manifold normal points from `pair.first` towards `pair.second`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub pair: CollisionPair,
    pub manifold: CollisionManifold,
}

/// A simplified interface for running a rigid-body simulation.
///
/// `PhysicsWorld` owns its bodies and hands out [`BodyId`] handles. Each tick it
/// rebuilds the octree from the bodies' current AABBs, runs the narrow-phase on
/// every candidate pair and integrates every body. Contact response is left to a
/// caller-supplied resolver.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use rs_rigid_body::apis::{resolve_with_impulses, PhysicsWorld};
/// use rs_rigid_body::models::{Aabb, RigidBody, Shape3D, Vector3};
///
/// let bounds = Aabb::new(Vector3::new(-50.0, -50.0, -50.0), Vector3::new(50.0, 50.0, 50.0)).unwrap();
/// let mut world = PhysicsWorld::new(bounds).unwrap();
/// let ball = Rc::new(Shape3D::new_sphere(0.5).unwrap());
///
/// let id = world.add_body(RigidBody::with_shape(1.0, Vector3::new(0.0, 10.0, 0.0), ball).unwrap());
/// for _ in 0..10 {
///     world.step(0.01, resolve_with_impulses).unwrap();
/// }
/// assert!(world.body(id).unwrap().position().y < 10.0);
/// ```
#[derive(Debug)]
pub struct PhysicsWorld {
    constants: PhysicsConstants,
    bodies: Vec<Option<RigidBody>>,
    live: usize,
    octree: Octree,
    detector: CollisionDetector,
}

impl PhysicsWorld {
    /// Creates an empty world over `bounds` with the default constants.
    pub fn new(bounds: Aabb) -> Result<Self, PhysicsError> {
        Self::with_constants(bounds, DEFAULT_PHYSICS_CONSTANTS)
    }

    /// Creates an empty world with custom constants.
    ///
    /// # Errors
    /// * `PhysicsError::InvalidConfiguration` when `constants` fails validation
    /// * `PhysicsError::InvalidBounds` for degenerate world bounds
    pub fn with_constants(bounds: Aabb, constants: PhysicsConstants) -> Result<Self, PhysicsError> {
        constants.validate()?;
        Ok(Self {
            constants,
            bodies: Vec::new(),
            live: 0,
            octree: Octree::with_constants(bounds, &constants)?,
            detector: CollisionDetector::new(),
        })
    }

    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Takes ownership of `body`. Handles are never reused, even after removal.
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.octree.insert_body(id, &body);
        self.bodies.push(Some(body));
        self.live += 1;
        id
    }

    /// Removes a body and returns it to the caller.
    ///
    /// # Errors
    /// `PhysicsError::BodyNotFound` if `id` was never issued or is already removed.
    pub fn remove_body(&mut self, id: BodyId) -> Result<RigidBody, PhysicsError> {
        let body = self
            .bodies
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(PhysicsError::BodyNotFound(id.0))?;
        self.octree.remove(id);
        self.live -= 1;
        Ok(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0).and_then(Option::as_ref)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live bodies in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|body| (BodyId(i), body)))
    }

    /// Mutable access to two distinct bodies at once.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut RigidBody, &mut RigidBody)> {
        if a == b || a.0 >= self.bodies.len() || b.0 >= self.bodies.len() {
            return None;
        }
        let (low, high) = (a.0.min(b.0), a.0.max(b.0));
        let (head, tail) = self.bodies.split_at_mut(high);
        let low_body = head[low].as_mut()?;
        let high_body = tail[0].as_mut()?;
        if a.0 < b.0 {
            Some((low_body, high_body))
        } else {
            Some((high_body, low_body))
        }
    }

    /// Accumulates the weight of every body for the next integration.
    pub fn apply_gravity(&mut self) {
        for body in self.bodies.iter_mut().flatten() {
            if let Ok(weight) = self.constants.gravity_force(body.mass()) {
                body.apply_force(weight);
            }
        }
    }

    /// Re-inserts every body with its current AABB.
    pub fn update_broad_phase(&mut self) {
        let objects: Vec<_> = self.bodies().map(|(id, body)| (id, body.get_aabb())).collect();
        self.octree.rebuild(objects);
    }

    /// Broad-phase then narrow-phase over the current body poses.
    pub fn detect_collisions(&mut self) -> Vec<CollisionEvent> {
        self.update_broad_phase();
        let candidates = self.octree.get_potential_collisions();
        let mut events = Vec::new();
        for pair in &candidates {
            let (Some(a), Some(b)) = (self.body(pair.first), self.body(pair.second)) else {
                continue;
            };
            if let Some(manifold) = self.detector.detect_manifold(a, b) {
                events.push(CollisionEvent { pair: *pair, manifold });
            }
        }
        debug!("{} candidate pairs, {} collisions", candidates.len(), events.len());
        events
    }

    /// Advances every body by `dt`.
    ///
    /// # Errors
    /// `PhysicsError::InvalidTime` for a negative or non-finite `dt`; no body is
    /// touched in that case.
    pub fn integrate(&mut self, dt: f64) -> Result<(), PhysicsError> {
        check_time_step(dt)?;
        for body in self.bodies.iter_mut().flatten() {
            body.integrate(dt)?;
        }
        Ok(())
    }

    /// Runs one full tick: gravity, broad-phase, narrow-phase, `resolver` on every
    /// collision, then integration. Returns the collisions of this tick.
    ///
    /// Forces the caller applied before `step` are integrated along with gravity.
    pub fn step<F>(&mut self, dt: f64, mut resolver: F) -> Result<Vec<CollisionEvent>, PhysicsError>
    where
        F: FnMut(&mut RigidBody, &mut RigidBody, &CollisionEvent),
    {
        check_time_step(dt)?;
        self.apply_gravity();
        let events = self.detect_collisions();
        for event in &events {
            if let Some((a, b)) = self.pair_mut(event.pair.first, event.pair.second) {
                resolver(a, b, event);
            }
        }
        self.integrate(dt)?;
        debug!("Stepped {} bodies by {}s", self.live, dt);
        Ok(events)
    }
}

/// Resolver for [`PhysicsWorld::step`] that applies one contact impulse per
/// manifold point.
pub fn resolve_with_impulses(a: &mut RigidBody, b: &mut RigidBody, event: &CollisionEvent) {
    for contact in &event.manifold.contacts {
        apply_contact_impulse(a, b, contact);
    }
}

fn check_time_step(dt: f64) -> Result<(), PhysicsError> {
    if dt >= 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::InvalidTime)
    }
}
