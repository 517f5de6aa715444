//! Navigation system: drive each bot's agent towards its goal.
//!
//! The agent only plans. The body is moved by the locomotion step.

use glam::Vec3;
use hecs::World;

use skirmish_ai::query::NavigationQuery;
use skirmish_core::components::{Body, Bot, JumpState, NavAgentState};
use skirmish_core::config::AiConfig;
use skirmish_core::types::forward_to_yaw;

/// The agent is usable only while the body stands on the ground and is alive.
pub fn sync_agents(world: &mut World) {
    for (_entity, (body, nav)) in world.query_mut::<(&Body, &mut NavAgentState)>() {
        nav.enabled = body.grounded && !body.airborne && body.controller_enabled;
    }
}

/// Steer every enabled agent one frame towards its destination.
pub fn run(world: &mut World, nav_query: &impl NavigationQuery, dt: f32) {
    let mut query = world.query::<(&Bot, &AiConfig, &Body, &mut NavAgentState, &mut JumpState)>();
    for (_entity, (_bot, config, body, nav, jump)) in query.iter() {
        let destination = nav.destination.filter(|_| nav.enabled && dt > 0.0);
        let Some(destination) = destination else {
            nav.velocity = Vec3::ZERO;
            nav.is_moving = false;
            continue;
        };

        let cfg = &config.navigation;
        let step = nav_query.steer(body.position, destination, cfg.ground_speed * dt);
        let delta = step.position - body.position;
        nav.velocity = Vec3::new(delta.x, 0.0, delta.z) / dt;
        nav.is_moving = nav.velocity.length() >= cfg.agent_velocity_magnitude;
        if let Some(heading) = forward_to_yaw(nav.velocity) {
            nav.heading = heading;
        }

        if step.on_off_mesh_link && !nav.on_off_mesh_link && !jump.pending_link {
            jump.pending_link = true;
            jump.link_position = body.position;
        }
        nav.on_off_mesh_link = step.on_off_mesh_link;
    }
}
