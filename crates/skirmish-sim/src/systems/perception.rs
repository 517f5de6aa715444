//! Perception system: one detection scan per bot per frame.
//!
//! Calls the Perception Engine from skirmish-ai and hands the resulting edge
//! events to the combat system, which runs next in the same frame.

use hecs::{Entity, World};

use skirmish_ai::perception::{
    acquire_initial_target, apply_damage_reaction, update_detection, PerceptionEvent,
};
use skirmish_ai::query::SpatialQuery;
use skirmish_ai::roster::Roster;
use skirmish_core::components::{ActorInfo, Body, Bot, CombatState, DetectionState};
use skirmish_core::config::AiConfig;
use skirmish_core::types::ActorId;

use super::roster::observer_of;

/// Run the perception system. Returns the edge events of this frame.
pub fn run(
    world: &mut World,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    now: f32,
) -> Vec<(Entity, PerceptionEvent)> {
    let mut events = Vec::new();

    let mut query = world.query::<(&Bot, &ActorInfo, &Body, &AiConfig, &CombatState, &mut DetectionState)>();
    for (entity, (_bot, info, body, config, combat, detection)) in query.iter() {
        if !body.controller_enabled {
            continue;
        }
        let observer = observer_of(info, body);
        let event = update_detection(
            &config.detection,
            &observer,
            detection,
            combat.dynamic_attack_range,
            roster,
            spatial,
            now,
        );
        if let Some(event) = event {
            events.push((entity, event));
        }
    }

    events
}

/// Deferred damage reaction fired: maybe retarget the bot to its attacker.
pub fn react_to_attacker(world: &mut World, entity: Entity, attacker: ActorId, roster: &Roster, now: f32) {
    let Ok(mut query) = world.query_one::<(&ActorInfo, &Body, &mut DetectionState)>(entity) else {
        return;
    };
    if let Some((info, body, detection)) = query.get() {
        let observer = observer_of(info, body);
        apply_damage_reaction(&observer, detection, attacker, roster, now);
    }
}

/// Start-of-life target pick for bots in auto-random-target mode.
pub fn acquire_target(world: &mut World, entity: Entity, roster: &Roster, now: f32) {
    let Ok(mut query) = world.query_one::<(&ActorInfo, &Body, &AiConfig, &mut DetectionState)>(entity) else {
        return;
    };
    if let Some((info, body, config, detection)) = query.get() {
        let observer = observer_of(info, body);
        acquire_initial_target(&config.detection, &observer, detection, roster, now);
    }
}

/// Toggle the unlimited detection range on every bot.
pub fn set_ignore_detection_range(world: &mut World, enabled: bool) {
    for (_entity, (config, detection)) in world.query_mut::<(&mut AiConfig, &mut DetectionState)>() {
        config.detection.ignore_detection_range = enabled;
        detection.detection_range = config.detection.effective_range();
    }
}
