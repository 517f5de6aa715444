//! Aim Resolution: find an unobstructed line from the weapon to a hostile.

use glam::Vec3;
use rand::Rng;
use skirmish_core::config::CombatConfig;
use skirmish_core::constants::WEAPON_CAST_LAYERS;
use skirmish_core::types::angle_between;
use tracing::trace;

use crate::query::{RayHit, SpatialQuery};
use crate::roster::{Observer, Roster, RosterEntry};

/// Result of [`resolve_aim_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimResolution {
    /// Hit point on a hostile, if any sample resolved.
    pub point: Option<Vec3>,
    /// Degrees between body forward and the target direction.
    pub angle: f32,
    /// Casts performed. Zero when the angle gate rejected the target.
    pub attempts: u32,
}

/// World-space pose of the weapon muzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Muzzle {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Muzzle pose for an observer whose weapon points at `look_at`.
///
/// `offset` is in body space (right, up, forward) relative to the aim point.
pub fn muzzle_pose(observer: &Observer, offset: Vec3, look_at: Vec3) -> Muzzle {
    let position = observer.aim_point
        + observer.right() * offset.x
        + Vec3::Y * offset.y
        + observer.forward() * offset.z;
    let forward = (look_at - position)
        .try_normalize()
        .unwrap_or_else(|| observer.forward());
    Muzzle { position, forward }
}

/// Point on a hostile actor hit by `hit`, if it hit one.
pub fn hostile_impact(hit: Option<RayHit>, observer: &Observer, roster: &Roster) -> Option<Vec3> {
    let hit = hit?;
    let owner = roster.get(hit.owner?)?;
    observer.is_hostile(owner.affiliation).then_some(hit.point)
}

/// Cast from the observer's aim point to the target's aim point.
///
/// Targets outside `aim_max_angle` are rejected without casting. Otherwise up
/// to `muzzle_max_cast_attempts` line casts are made; every retry nudges the
/// end point by a random offset in the target's right/up plane so partial
/// cover (a railing in front of the torso) does not block the shot forever.
/// The first sample that lands on a hostile wins.
pub fn resolve_aim_point(
    cfg: &CombatConfig,
    observer: &Observer,
    target: &RosterEntry,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    rng: &mut impl Rng,
) -> AimResolution {
    let angle = angle_between(observer.forward(), target.aim_point - observer.aim_point);
    if angle > cfg.aim_max_angle {
        return AimResolution {
            point: None,
            angle,
            attempts: 0,
        };
    }

    let right = target.right();
    let jitter = cfg.aim_jitter;
    let mut end = target.aim_point;

    for attempt in 1..=cfg.muzzle_max_cast_attempts {
        let hit = spatial.linecast(observer.aim_point, end, WEAPON_CAST_LAYERS, Some(observer.id));
        if let Some(point) = hostile_impact(hit, observer, roster) {
            trace!(actor = observer.id.0, attempt, "aim resolved");
            return AimResolution {
                point: Some(point),
                angle,
                attempts: attempt,
            };
        }
        if attempt < cfg.muzzle_max_cast_attempts {
            let dx = rng.gen_range(-jitter..=jitter);
            let dy = rng.gen_range(-jitter..=jitter);
            end = target.aim_point + right * dx + Vec3::Y * dy;
        }
    }

    trace!(actor = observer.id.0, "aim unresolved");
    AimResolution {
        point: None,
        angle,
        attempts: cfg.muzzle_max_cast_attempts,
    }
}

/// Cast along the muzzle direction out to `attack_range`.
///
/// Valid only when the cast lands on a hostile.
pub fn resolve_weapon_point(
    observer: &Observer,
    muzzle: &Muzzle,
    attack_range: f32,
    roster: &Roster,
    spatial: &impl SpatialQuery,
) -> Option<Vec3> {
    let end = muzzle.position + muzzle.forward * attack_range;
    let hit = spatial.linecast(observer.aim_point, end, WEAPON_CAST_LAYERS, Some(observer.id));
    hostile_impact(hit, observer, roster)
}

/// Move the weapon look-at point towards `point`.
///
/// Points outside `weapon_max_look_angle` of the body forward are ignored.
pub fn weapon_look_at(
    cfg: &CombatConfig,
    observer: &Observer,
    current: Vec3,
    point: Vec3,
    dt: f32,
) -> Vec3 {
    let angle = angle_between(observer.forward(), point - observer.aim_point);
    if angle > cfg.weapon_max_look_angle {
        return current;
    }
    current.lerp(point, (cfg.weapon_rotation_speed * dt).clamp(0.0, 1.0))
}
