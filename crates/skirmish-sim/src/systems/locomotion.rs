//! Fixed-step movement: walking, obstacle jumps, gravity and landing.

use glam::Vec3;
use hecs::World;

use skirmish_ai::locomotion::{evaluate_jump, ground_below, jump_velocity, JumpDecision};
use skirmish_ai::query::SpatialQuery;
use skirmish_core::components::{ActorInfo, Body, Bot, JumpState, Life, NavAgentState};
use skirmish_core::config::{AiConfig, NavigationConfig};
use skirmish_core::constants::{ACTOR_RADIUS, GROUND_CAST_LAYERS, RETURN_FORCE, STEP_DOWN};
use skirmish_core::events::SimEvent;
use skirmish_core::types::yaw_to_forward;

use crate::timers::{TimerAction, TimerQueue};

/// Start of the landing ray above the body while falling.
const LANDING_RAY_UP: f32 = 0.05;

/// Run one physics step for every bot.
pub fn step(
    world: &mut World,
    spatial: &impl SpatialQuery,
    timers: &mut TimerQueue,
    now: f32,
    dt: f32,
    events: &mut Vec<SimEvent>,
) {
    let mut query = world.query::<(&Bot, &ActorInfo, &AiConfig, &mut Body, &NavAgentState, &mut JumpState, &Life)>();
    for (entity, (_bot, info, config, body, nav, jump, life)) in query.iter() {
        if !body.controller_enabled {
            continue;
        }
        let cfg = &config.navigation;

        if body.airborne {
            air_step(cfg, body, jump, spatial, dt);
            continue;
        }

        match evaluate_jump(cfg, jump, body.position, body.yaw, spatial) {
            JumpDecision::Jump { normal } => {
                take_off(cfg, body, nav, jump, normal);
                timers.schedule(
                    now + cfg.delay_obstacle_check,
                    entity,
                    life.generation,
                    TimerAction::ObstacleCheck,
                );
                timers.schedule(
                    now + cfg.delay_obstacle_check + cfg.jump_cooldown,
                    entity,
                    life.generation,
                    TimerAction::JumpRearm,
                );
                events.push(SimEvent::Jumped {
                    actor: info.id,
                    position: body.position,
                });
                continue;
            }
            JumpDecision::Cancel => jump.pending_link = false,
            JumpDecision::Hold { normal } => jump.obstacle_normal = normal,
            JumpDecision::Idle => {}
        }

        walk_step(cfg, body, nav, spatial, dt);
    }
}

fn take_off(cfg: &NavigationConfig, body: &mut Body, nav: &NavAgentState, jump: &mut JumpState, normal: Vec3) {
    let planar = if nav.velocity.length_squared() > 0.0 {
        nav.velocity
    } else {
        yaw_to_forward(body.yaw) * cfg.ground_speed
    };
    body.velocity = planar * cfg.jump_damp + Vec3::Y * jump_velocity(cfg.gravity, cfg.jump_height);
    body.airborne = true;
    body.grounded = false;

    jump.obstacle_normal = normal;
    jump.pending_link = false;
    jump.jumping_link = true;
    jump.armed = false;
    jump.obstacle_check = false;
    jump.bounced = false;
}

fn walk_step(cfg: &NavigationConfig, body: &mut Body, nav: &NavAgentState, spatial: &impl SpatialQuery, dt: f32) {
    let step = nav.velocity * dt;
    if let Some(direction) = step.try_normalize() {
        let knee = body.position + Vec3::Y * cfg.obstacle_offset_y;
        let reach = knee + step + direction * ACTOR_RADIUS;
        if spatial.linecast(knee, reach, GROUND_CAST_LAYERS, None).is_none() {
            body.position += step;
        }
    }

    match ground_below(body.position, cfg.obstacle_offset_y, STEP_DOWN, spatial) {
        Some(hit) => {
            body.position.y = hit.point.y;
            body.grounded = true;
        }
        None => {
            // Walked off an edge
            body.grounded = false;
            body.airborne = true;
            body.velocity = nav.velocity;
        }
    }
}

fn air_step(cfg: &NavigationConfig, body: &mut Body, jump: &mut JumpState, spatial: &impl SpatialQuery, dt: f32) {
    body.velocity.y -= cfg.gravity * dt;

    if !jump.bounced {
        let planar = Vec3::new(body.velocity.x, 0.0, body.velocity.z);
        let steer = yaw_to_forward(body.yaw) * cfg.ground_speed * cfg.air_control / 100.0;
        let steered = (planar + steer).clamp_length_max(cfg.ground_speed.max(planar.length()));
        body.velocity.x = steered.x;
        body.velocity.z = steered.z;
    }

    if jump.obstacle_check && !jump.bounced {
        let planar = Vec3::new(body.velocity.x, 0.0, body.velocity.z);
        if let Some(direction) = planar.try_normalize() {
            let knee = body.position + Vec3::Y * cfg.obstacle_offset_y;
            let reach = knee + direction * (ACTOR_RADIUS + planar.length() * dt);
            if let Some(hit) = spatial.linecast(knee, reach, GROUND_CAST_LAYERS, None) {
                let push = Vec3::new(hit.normal.x, 0.0, hit.normal.z) * RETURN_FORCE;
                body.velocity.x = push.x;
                body.velocity.z = push.z;
                jump.bounced = true;
            }
        }
    }

    let next = body.position + body.velocity * dt;
    if body.velocity.y <= 0.0 {
        let drop = (body.position.y - next.y).max(0.0);
        if let Some(hit) = ground_below(next, drop + LANDING_RAY_UP, STEP_DOWN, spatial) {
            body.position = Vec3::new(next.x, hit.point.y, next.z);
            body.velocity = Vec3::ZERO;
            body.airborne = false;
            body.grounded = true;
            jump.obstacle_check = false;
            jump.bounced = false;
            jump.jumping_link = false;
            return;
        }
    }
    body.position = next;
}
