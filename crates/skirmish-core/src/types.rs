//! Fundamental identifiers, geometric helpers and simulation time.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identity of an actor. Persists across death and respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Team identifier. Actors with differing affiliation are mutually hostile.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Affiliation(pub u32);

/// Identifier of a collider registered with the spatial query backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

bitflags! {
    /// Collision layers used to filter ray and line casts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Layers: u32 {
        /// Walkable surfaces.
        const GROUND   = 1 << 0;
        /// Walls and solid blockers.
        const OBSTACLE = 1 << 1;
        /// Actor hit volumes.
        const ACTOR    = 1 << 2;
        /// Thin geometry such as railings and fences.
        const PROP     = 1 << 3;
        /// Non-solid volumes (pickups, zones).
        const TRIGGER  = 1 << 4;
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of frames simulated so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
}

impl SimTime {
    /// Advance by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Unsigned angle in degrees between two directions.
///
/// Returns 0 when either vector is degenerate.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Planar forward direction for a yaw angle (radians, 0 = +Z, clockwise seen from above).
pub fn yaw_to_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw angle of the planar projection of `direction`, or None if it is vertical.
pub fn forward_to_yaw(direction: Vec3) -> Option<f32> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1e-8 {
        return None;
    }
    Some(flat.x.atan2(flat.z))
}

/// Right-hand planar direction for a yaw angle.
pub fn yaw_to_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}
