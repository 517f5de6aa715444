//! Narrow interfaces to the physics and navigation backend.
//!
//! The AI never owns geometry. A host implements these traits (the arena
//! crate does it for headless runs, tests use scripted fakes) and passes
//! them into every decision function.

use glam::Vec3;
use skirmish_core::types::{ActorId, ColliderId, Layers};

/// One intersection reported by a ray or line cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance from the cast origin.
    pub distance: f32,
    pub collider: ColliderId,
    pub layer: Layers,
    /// Actor owning the collider, if any.
    pub owner: Option<ActorId>,
}

/// Ray and line casts against the static world and actor hit volumes.
pub trait SpatialQuery {
    /// Every hit along `direction` (normalized) up to `max_distance` on
    /// `layers`. Order is unspecified.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: Layers,
    ) -> Vec<RayHit>;

    /// Closest hit on the segment `from -> to` on `layers`, skipping
    /// colliders owned by `ignore`.
    fn linecast(&self, from: Vec3, to: Vec3, layers: Layers, ignore: Option<ActorId>)
        -> Option<RayHit>;
}

/// Result of advancing a navigation agent by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavStep {
    pub position: Vec3,
    /// The step ended inside an off-mesh link.
    pub on_off_mesh_link: bool,
    /// The destination was reached.
    pub reached: bool,
}

/// Navigation mesh access.
pub trait NavigationQuery {
    /// Closest walkable point within `max_distance` of `point`.
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Advance from `from` towards `to` by at most `max_step`.
    fn steer(&self, from: Vec3, to: Vec3, max_step: f32) -> NavStep;
}

/// Registration of actor hit volumes with the spatial backend.
pub trait ActorColliders {
    /// Insert or move the capsule-like volume of an actor standing at `base`.
    fn upsert_actor(&mut self, id: ActorId, base: Vec3, radius: f32, height: f32);

    fn remove_actor(&mut self, id: ActorId);
}

/// Everything the simulation needs from its host world.
pub trait Environment: SpatialQuery + NavigationQuery + ActorColliders {}

impl<T: SpatialQuery + NavigationQuery + ActorColliders> Environment for T {}
