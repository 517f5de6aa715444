//! Navigation Bridge queries: obstacle jumps, ground checks and turning.

use glam::Vec3;
use skirmish_core::components::JumpState;
use skirmish_core::config::NavigationConfig;
use skirmish_core::constants::{GROUND_CAST_LAYERS, SURFACE_UNDER_CAST_DEPTH};
use skirmish_core::types::{forward_to_yaw, yaw_to_forward};

use crate::query::{RayHit, SpatialQuery};

/// Take-off speed that reaches `height` under `gravity`.
pub fn jump_velocity(gravity: f32, height: f32) -> f32 {
    (2.0 * gravity * height).max(0.0).sqrt()
}

/// Short cast straight ahead at knee height against ground and obstacles.
pub fn forward_obstacle(
    cfg: &NavigationConfig,
    position: Vec3,
    yaw: f32,
    spatial: &impl SpatialQuery,
) -> Option<RayHit> {
    let lift = Vec3::Y * cfg.obstacle_offset_y;
    let from = position + lift;
    let to = position + yaw_to_forward(yaw) * cfg.obstacle_cast_length + lift;
    spatial.linecast(from, to, GROUND_CAST_LAYERS, None)
}

/// Whether there is floor a few steps ahead of the body.
pub fn surface_ahead(
    cfg: &NavigationConfig,
    position: Vec3,
    yaw: f32,
    spatial: &impl SpatialQuery,
) -> bool {
    let ahead = position + yaw_to_forward(yaw) * cfg.surface_under_cast_length;
    let from = ahead + Vec3::Y * cfg.obstacle_offset_y;
    let to = ahead - Vec3::Y * SURFACE_UNDER_CAST_DEPTH;
    spatial
        .linecast(from, to, GROUND_CAST_LAYERS, None)
        .is_some()
}

/// Walkable surface under `position`, searched from `cast_up` above it down
/// to `cast_down` below it.
pub fn ground_below(
    position: Vec3,
    cast_up: f32,
    cast_down: f32,
    spatial: &impl SpatialQuery,
) -> Option<RayHit> {
    let from = position + Vec3::Y * cast_up;
    let to = position - Vec3::Y * cast_down;
    spatial.linecast(from, to, GROUND_CAST_LAYERS, None)
}

/// Outcome of [`evaluate_jump`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpDecision {
    /// Nothing to do.
    Idle,
    /// No obstacle ahead; the link is walked.
    Cancel,
    /// Obstacle ahead but the link entry is too far behind.
    Hold { normal: Vec3 },
    /// Take off.
    Jump { normal: Vec3 },
}

/// Decide whether a grounded body should jump the off-mesh link it entered.
pub fn evaluate_jump(
    cfg: &NavigationConfig,
    jump: &JumpState,
    position: Vec3,
    yaw: f32,
    spatial: &impl SpatialQuery,
) -> JumpDecision {
    if !jump.pending_link || !jump.armed {
        return JumpDecision::Idle;
    }
    let Some(hit) = forward_obstacle(cfg, position, yaw, spatial) else {
        return JumpDecision::Cancel;
    };
    if jump.link_position.distance(position) < cfg.off_mesh_link_radius {
        JumpDecision::Jump { normal: hit.normal }
    } else {
        JumpDecision::Hold { normal: hit.normal }
    }
}

/// Turn `yaw` towards `target_yaw` along the short way, by a fraction
/// `speed * dt` of the remaining angle.
pub fn orient_towards(yaw: f32, target_yaw: f32, speed: f32, dt: f32) -> f32 {
    let t = (speed * dt).clamp(0.0, 1.0);
    let delta = wrap_angle(target_yaw - yaw);
    wrap_angle(yaw + delta * t)
}

/// Yaw facing `point` from `position`, or None if it is straight above or below.
pub fn yaw_towards(position: Vec3, point: Vec3) -> Option<f32> {
    forward_to_yaw(point - position)
}

/// Yaw facing away from an obstacle normal, used while jumping over it.
pub fn yaw_against(normal: Vec3) -> Option<f32> {
    forward_to_yaw(-normal)
}

/// Wrap to [-PI, PI).
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}
