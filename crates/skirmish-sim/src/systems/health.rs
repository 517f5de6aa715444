//! Damage, death, respawn and the per-life vitals timers.

use glam::Vec3;
use hecs::{Entity, World};
use tracing::info;

use skirmish_ai::fsm::new_combat_state;
use skirmish_ai::perception::{new_detection_state, on_damaged, reset_detection};
use skirmish_ai::waypoint::closest_node_index;
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::constants::INVULNERABLE_DAMAGE;
use skirmish_core::enums::{AiState, DeathCause};
use skirmish_core::events::SimEvent;
use skirmish_core::types::ActorId;

use super::roster::observer_of;
use crate::timers::{TimerAction, TimerQueue};
use crate::world_setup::new_jump_state;

/// Schedule the timers every life starts with.
pub fn schedule_life_timers(
    timers: &mut TimerQueue,
    entity: Entity,
    generation: u32,
    config: &AiConfig,
    is_bot: bool,
    now: f32,
) {
    let vitals = &config.vitals;
    timers.schedule(
        now + vitals.kill_height_poll_interval,
        entity,
        generation,
        TimerAction::KillHeightPoll,
    );
    if vitals.passive_heal_amount > 0.0 {
        timers.schedule(
            now + vitals.passive_heal_interval,
            entity,
            generation,
            TimerAction::PassiveHeal,
        );
    }
    if is_bot && config.detection.auto_random_target {
        timers.schedule(now, entity, generation, TimerAction::AcquireTarget);
    }
}

/// Apply damage to `entity`. Kills it when health runs out.
///
/// Damage from another actor refreshes the bot's sighting clock and may
/// schedule the deferred damage reaction.
pub fn apply_damage(
    world: &mut World,
    entity: Entity,
    source: Option<ActorId>,
    amount: f32,
    now: f32,
    timers: &mut TimerQueue,
    events: &mut Vec<SimEvent>,
) {
    let died = {
        let Ok(mut query) = world.query_one::<(
            &ActorInfo,
            &mut Health,
            &Life,
            &AiConfig,
            Option<&mut DetectionState>,
        )>(entity) else {
            return;
        };
        let Some((info, health, life, config, detection)) = query.get() else {
            return;
        };
        if health.dead {
            return;
        }

        let amount = if health.invulnerable {
            INVULNERABLE_DAMAGE
        } else {
            amount.max(0.0)
        };
        health.current = (health.current - amount).max(0.0);
        events.push(SimEvent::Damaged {
            target: info.id,
            source,
            amount,
            remaining: health.current,
        });

        let attacker = source.filter(|s| *s != info.id);
        if let (Some(attacker), Some(detection)) = (attacker, detection) {
            if on_damaged(detection, now) {
                timers.schedule(
                    now + config.detection.known_target_timeout,
                    entity,
                    life.generation,
                    TimerAction::DamageReaction { attacker },
                );
            }
        }

        health.current <= 0.0
    };

    if died {
        let cause = if source.is_some() {
            DeathCause::Actor
        } else {
            DeathCause::Environment
        };
        kill(world, entity, source, cause, now, timers, events);
    }
}

/// Kill `entity` outright.
///
/// Clears perception and combat memory, disables the body and schedules the
/// respawn. Bumping the life generation invalidates every pending timer of
/// the old life.
pub fn kill(
    world: &mut World,
    entity: Entity,
    killer: Option<ActorId>,
    cause: DeathCause,
    now: f32,
    timers: &mut TimerQueue,
    events: &mut Vec<SimEvent>,
) {
    let (victim, generation, respawn_delay) = {
        let Ok(mut query) = world.query_one::<(
            &ActorInfo,
            &mut Health,
            &mut Body,
            &mut Life,
            &AiConfig,
            Option<&mut DetectionState>,
            Option<&mut CombatState>,
            Option<&mut NavAgentState>,
        )>(entity) else {
            return;
        };
        let Some((info, health, body, life, config, detection, combat, nav)) = query.get() else {
            return;
        };
        if health.dead {
            return;
        }

        health.current = 0.0;
        health.dead = true;
        body.controller_enabled = false;
        body.velocity = Vec3::ZERO;
        if let Some(detection) = detection {
            reset_detection(detection);
        }
        if let Some(combat) = combat {
            combat.ai_state = AiState::Patrol;
            combat.pending_nav_goal = None;
            combat.force_waypoint_resample = false;
            combat.settle = SettleLatch::default();
        }
        if let Some(nav) = nav {
            *nav = NavAgentState {
                heading: nav.heading,
                ..NavAgentState::default()
            };
        }
        life.generation += 1;

        (info.id, life.generation, config.vitals.respawn_delay)
    };

    let killer = killer.filter(|k| *k != victim);
    if let Some(killer) = killer {
        credit_kill(world, killer);
    }

    info!(victim = victim.0, killer = ?killer.map(|k| k.0), ?cause, "actor killed");
    events.push(SimEvent::Killed {
        victim,
        killer,
        cause,
    });
    timers.schedule(now + respawn_delay, entity, generation, TimerAction::Respawn);
}

fn credit_kill(world: &mut World, killer: ActorId) {
    for (_entity, info) in world.query_mut::<&mut ActorInfo>() {
        if info.id == killer {
            info.kills += 1;
            return;
        }
    }
}

/// Bring a dead actor back at its spawn point with fresh combat memory.
pub fn respawn(
    world: &mut World,
    entity: Entity,
    now: f32,
    timers: &mut TimerQueue,
    events: &mut Vec<SimEvent>,
) {
    let (actor, position, generation, config, is_bot) = {
        let Ok(mut query) = world.query_one::<(
            &ActorInfo,
            &mut Health,
            &mut Body,
            &SpawnPoint,
            &Life,
            &AiConfig,
            &WeaponBinding,
            Option<&mut DetectionState>,
            Option<&mut CombatState>,
            Option<&mut PatrolRoute>,
            Option<&mut NavAgentState>,
            Option<&mut JumpState>,
        )>(entity) else {
            return;
        };
        let Some((info, health, body, spawn, life, config, weapon, detection, combat, route, nav, jump)) =
            query.get()
        else {
            return;
        };
        if !health.dead {
            return;
        }

        *body = Body {
            position: spawn.position,
            yaw: spawn.yaw,
            velocity: Vec3::ZERO,
            grounded: true,
            airborne: false,
            controller_enabled: true,
        };
        *health = Health {
            current: health.max,
            max: health.max,
            dead: false,
            invulnerable: true,
        };

        let is_bot = detection.is_some();
        if let Some(detection) = detection {
            *detection = new_detection_state(&config.detection);
        }
        if let Some(combat) = combat {
            *combat = new_combat_state(weapon, &observer_of(info, body));
        }
        if let Some(route) = route {
            route.index = closest_node_index(&route.nodes, body.position);
        }
        if let Some(nav) = nav {
            *nav = NavAgentState {
                enabled: true,
                heading: body.yaw,
                ..NavAgentState::default()
            };
        }
        if let Some(jump) = jump {
            *jump = new_jump_state();
        }

        (info.id, body.position, life.generation, config.clone(), is_bot)
    };

    timers.schedule(
        now + config.vitals.invulnerable_time,
        entity,
        generation,
        TimerAction::InvulnerabilityEnd,
    );
    schedule_life_timers(timers, entity, generation, &config, is_bot, now);

    info!(actor = actor.0, "actor respawned");
    events.push(SimEvent::Respawned { actor, position });
}

/// Periodic check: kill the actor if it fell out of the world, else poll again.
pub fn poll_kill_height(
    world: &mut World,
    entity: Entity,
    now: f32,
    timers: &mut TimerQueue,
    events: &mut Vec<SimEvent>,
) {
    let (fell, generation, interval) = {
        let Ok(mut query) = world.query_one::<(&Body, &Life, &AiConfig)>(entity) else {
            return;
        };
        let Some((body, life, config)) = query.get() else {
            return;
        };
        (
            body.position.y < config.vitals.kill_height,
            life.generation,
            config.vitals.kill_height_poll_interval,
        )
    };

    if fell {
        kill(world, entity, None, DeathCause::Environment, now, timers, events);
    } else {
        timers.schedule(now + interval, entity, generation, TimerAction::KillHeightPoll);
    }
}

/// Passive regeneration tick.
pub fn passive_heal(world: &mut World, entity: Entity, now: f32, timers: &mut TimerQueue) {
    let Ok(mut query) = world.query_one::<(&mut Health, &Life, &AiConfig)>(entity) else {
        return;
    };
    let Some((health, life, config)) = query.get() else {
        return;
    };
    health.current = (health.current + config.vitals.passive_heal_amount).min(health.max);
    timers.schedule(
        now + config.vitals.passive_heal_interval,
        entity,
        life.generation,
        TimerAction::PassiveHeal,
    );
}

pub fn end_invulnerability(world: &mut World, entity: Entity) {
    if let Ok(mut health) = world.get::<&mut Health>(entity) {
        health.invulnerable = false;
    }
}
