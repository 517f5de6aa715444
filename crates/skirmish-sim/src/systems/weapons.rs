//! Weapon system: shot cadence and hitscan.

use hecs::World;
use tracing::trace;

use skirmish_ai::aim::muzzle_pose;
use skirmish_ai::query::SpatialQuery;
use skirmish_ai::roster::Roster;
use skirmish_core::components::{ActorInfo, Body, CombatState, WeaponBinding, WeaponRuntime};
use skirmish_core::constants::WEAPON_CAST_LAYERS;
use skirmish_core::events::SimEvent;
use skirmish_core::types::ActorId;

use super::combat::FireRequest;
use super::roster::observer_of;

/// Extra cast length past the aim point so the cast reaches the surface it sits on.
const SHOT_OVERSHOOT: f32 = 0.5;

/// Damage to apply once every shot of the frame has been traced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotHit {
    pub target: ActorId,
    pub source: ActorId,
    pub amount: f32,
}

/// Whether a shot may be released now. Records the shot if so.
pub fn try_fire(runtime: &mut WeaponRuntime, weapon: &WeaponBinding, now: f32) -> bool {
    if now < runtime.equipped_at + weapon.swap_delay {
        return false;
    }
    if runtime
        .last_shot_at
        .is_some_and(|t| now - t < weapon.shot_interval)
    {
        return false;
    }
    runtime.last_shot_at = Some(now);
    true
}

/// Release the requested shots. Only hits on hostile actors deal damage.
pub fn run(
    world: &mut World,
    requests: Vec<FireRequest>,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    now: f32,
    events: &mut Vec<SimEvent>,
) -> Vec<ShotHit> {
    let mut hits = Vec::new();

    for request in requests {
        let Ok(mut query) = world.query_one::<(
            &ActorInfo,
            &Body,
            &CombatState,
            &WeaponBinding,
            &mut WeaponRuntime,
        )>(request.entity) else {
            continue;
        };
        let Some((info, body, combat, weapon, runtime)) = query.get() else {
            continue;
        };
        if !try_fire(runtime, weapon, now) {
            continue;
        }

        let observer = observer_of(info, body);
        let muzzle = muzzle_pose(&observer, weapon.muzzle_offset, combat.weapon_look_at);
        let Some(direction) = (request.at - muzzle.position).try_normalize() else {
            continue;
        };
        let end = request.at + direction * SHOT_OVERSHOOT;
        let hit = spatial
            .linecast(muzzle.position, end, WEAPON_CAST_LAYERS, Some(info.id))
            .and_then(|hit| hit.owner);

        events.push(SimEvent::ShotFired {
            actor: info.id,
            origin: muzzle.position,
            direction,
            hit,
        });
        trace!(actor = info.id.0, ?hit, "shot released");

        let hostile = hit
            .and_then(|id| roster.get(id))
            .filter(|e| e.alive && observer.is_hostile(e.affiliation));
        if let Some(target) = hostile {
            hits.push(ShotHit {
                target: target.id,
                source: info.id,
                amount: weapon.damage,
            });
        }
    }

    hits
}
