//! Build the per-frame `SimSnapshot` from ECS state.

use hecs::World;

use skirmish_core::components::{ActorInfo, Body, CombatState, DetectionState, Health};
use skirmish_core::enums::SimPhase;
use skirmish_core::state::{ActorView, SimSnapshot};
use skirmish_core::types::SimTime;

/// Read-only view of every actor, sorted by id.
pub fn build_snapshot(world: &World, time: &SimTime, phase: SimPhase) -> SimSnapshot {
    let mut query = world.query::<(
        &ActorInfo,
        &Body,
        &Health,
        Option<&CombatState>,
        Option<&DetectionState>,
    )>();
    let mut actors: Vec<ActorView> = query
        .iter()
        .map(|(_, (info, body, health, combat, detection))| ActorView {
            id: info.id,
            name: info.name.clone(),
            kind: info.kind,
            affiliation: info.affiliation,
            position: body.position,
            yaw: body.yaw,
            health: health.current,
            dead: health.dead,
            kills: info.kills,
            ai_state: combat.map(|c| c.ai_state),
            known_target: detection.and_then(|d| d.known_target),
            is_seeing_target: detection.is_some_and(|d| d.is_seeing_target),
        })
        .collect();
    actors.sort_by_key(|a| a.id);

    SimSnapshot {
        time: *time,
        phase,
        actors,
    }
}
