//! Per-frame roster snapshot and observer views.

use glam::Vec3;
use hecs::World;

use skirmish_ai::roster::{Observer, Roster, RosterEntry};
use skirmish_core::components::{ActorInfo, Body, Health};
use skirmish_core::constants::{AIM_POINT_HEIGHT, EYE_HEIGHT};

/// Snapshot every actor, dead ones included, before perception runs.
pub fn build(world: &World) -> Roster {
    let mut query = world.query::<(&ActorInfo, &Body, &Health)>();
    let entries = query
        .iter()
        .map(|(_, (info, body, health))| RosterEntry {
            id: info.id,
            affiliation: info.affiliation,
            position: body.position,
            yaw: body.yaw,
            aim_point: aim_point(body.position),
            alive: !health.dead,
        })
        .collect();
    Roster::new(entries)
}

/// How an actor sees the world from its current body pose.
pub fn observer_of<'a>(info: &'a ActorInfo, body: &Body) -> Observer<'a> {
    Observer {
        id: info.id,
        affiliation: info.affiliation,
        hostile_affiliations: &info.hostile_affiliations,
        position: body.position,
        yaw: body.yaw,
        aim_point: aim_point(body.position),
        eye_point: body.position + Vec3::Y * EYE_HEIGHT,
    }
}

pub fn aim_point(position: Vec3) -> Vec3 {
    position + Vec3::Y * AIM_POINT_HEIGHT
}
