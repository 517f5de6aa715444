//! Combat system: feeds perception events to the state machine, evaluates it
//! for every bot and applies the decision.
//!
//! Navigation goals go to the agent (skipped while it is disabled), facing is
//! applied to the body and shot requests are returned for the weapon system.

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use tracing::debug;

use skirmish_ai::fsm::{evaluate, on_perception_event, CombatContext, Facing};
use skirmish_ai::locomotion::{orient_towards, yaw_against, yaw_towards};
use skirmish_ai::perception::PerceptionEvent;
use skirmish_ai::query::{NavigationQuery, SpatialQuery};
use skirmish_ai::roster::Roster;
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::events::SimEvent;

use super::roster::observer_of;
use crate::timers::{TimerAction, TimerQueue};

/// A bot wants to release a shot at `at`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    pub entity: Entity,
    pub at: Vec3,
}

/// Apply this frame's perception edge events.
pub fn apply_perception_events(
    world: &mut World,
    perception_events: Vec<(Entity, PerceptionEvent)>,
    events: &mut Vec<SimEvent>,
) {
    for (entity, event) in perception_events {
        let Ok(mut query) = world.query_one::<(&ActorInfo, &mut CombatState)>(entity) else {
            continue;
        };
        let Some((info, combat)) = query.get() else {
            continue;
        };
        events.push(match event {
            PerceptionEvent::Detected(target) => SimEvent::TargetDetected {
                actor: info.id,
                target,
            },
            PerceptionEvent::Lost => SimEvent::TargetLost { actor: info.id },
        });
        if let Some((from, to)) = on_perception_event(combat, event) {
            debug!(actor = info.id.0, ?from, ?to, "combat state changed");
            events.push(SimEvent::StateChanged {
                actor: info.id,
                from,
                to,
            });
        }
    }
}

/// Run the combat system. Returns the shots requested this frame.
#[allow(clippy::too_many_arguments)]
pub fn run<E: SpatialQuery + NavigationQuery>(
    world: &mut World,
    roster: &Roster,
    env: &E,
    rng: &mut impl Rng,
    timers: &mut TimerQueue,
    now: f32,
    dt: f32,
    events: &mut Vec<SimEvent>,
) -> Vec<FireRequest> {
    let mut requests = Vec::new();

    let mut query = world.query::<(
        &Bot,
        &ActorInfo,
        &mut Body,
        &AiConfig,
        &DetectionState,
        &mut CombatState,
        &WeaponBinding,
        &mut PatrolRoute,
        &mut NavAgentState,
        &JumpState,
        &Life,
    )>();
    for (entity, (_bot, info, body, config, detection, combat, weapon, route, nav, jump, life)) in
        query.iter()
    {
        // Dead or otherwise disabled: skip the whole tick
        if !body.controller_enabled {
            continue;
        }

        let observer = observer_of(info, body);
        let target = detection.known_target.and_then(|id| roster.get(id));
        let ctx = CombatContext {
            combat_cfg: &config.combat,
            nav_cfg: &config.navigation,
            observer: &observer,
            target,
            muzzle_offset: weapon.muzzle_offset,
            agent_moving: nav.is_moving,
            now,
            dt,
        };
        let decision = evaluate(&ctx, combat, Some(route), roster, env, env, rng);

        if let Some(goal) = decision.nav_goal {
            if nav.enabled {
                nav.destination = Some(goal);
                combat.pending_nav_goal = Some(goal);
            }
        }

        let desired_yaw = match decision.facing {
            Facing::Keep => None,
            Facing::Agent if jump.jumping_link && body.airborne => yaw_against(jump.obstacle_normal),
            Facing::Agent => nav.is_moving.then_some(nav.heading),
            Facing::Toward(point) => yaw_towards(body.position, point),
        };
        if let Some(yaw) = desired_yaw {
            body.yaw = orient_towards(body.yaw, yaw, config.navigation.orientation_speed, dt);
        }

        if decision.settle_engaged {
            timers.schedule(
                now + config.combat.settle_interval,
                entity,
                life.generation,
                TimerAction::SettleRelease,
            );
        }

        if let Some((from, to)) = decision.transition {
            events.push(SimEvent::StateChanged {
                actor: info.id,
                from,
                to,
            });
        }

        if let Some(at) = decision.fire_at {
            requests.push(FireRequest { entity, at });
        }
    }

    requests
}
