//! Throttled navigation waypoint near the target and patrol path stepping.

use glam::Vec3;
use rand::Rng;
use skirmish_core::components::{CombatState, PatrolRoute};
use skirmish_core::config::CombatConfig;
use skirmish_core::enums::PatrolDirection;

use crate::query::NavigationQuery;

/// Whether the last-known-target waypoint is stale enough to resample.
///
/// `drift` is the distance from the live target to the current waypoint.
pub fn should_resample(cfg: &CombatConfig, drift: f32, agent_moving: bool) -> bool {
    drift > cfg.waypoint_drift_threshold
        && (drift >= cfg.waypoint_search_radius || !agent_moving)
}

/// Resample the waypoint if forced or stale. Returns true if it moved.
pub fn update_waypoint(
    cfg: &CombatConfig,
    combat: &mut CombatState,
    target: Vec3,
    agent_moving: bool,
    nav: &impl NavigationQuery,
    rng: &mut impl Rng,
) -> bool {
    let force = std::mem::take(&mut combat.force_waypoint_resample);
    let drift = target.distance(combat.last_known_target_position);
    if !force && !should_resample(cfg, drift, agent_moving) {
        return false;
    }
    resample_waypoint(cfg, combat, target, cfg.waypoint_search_radius, nav, rng)
}

/// Pick a walkable point in a sphere of `radius` around `around`.
///
/// Leaves the waypoint alone if the navmesh has nothing near the sample.
pub fn resample_waypoint(
    cfg: &CombatConfig,
    combat: &mut CombatState,
    around: Vec3,
    radius: f32,
    nav: &impl NavigationQuery,
    rng: &mut impl Rng,
) -> bool {
    let point = around + random_in_unit_sphere(rng) * radius;
    match nav.sample_position(point, cfg.waypoint_sample_distance) {
        Some(position) => {
            combat.last_known_target_position = position;
            true
        }
        None => false,
    }
}

fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// Index of the node closest to `position`, or 0 for an empty path.
pub fn closest_node_index(nodes: &[Vec3], position: Vec3) -> usize {
    nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.distance_squared(position)
                .total_cmp(&b.distance_squared(position))
        })
        .map_or(0, |(i, _)| i)
}

/// Step to the next node once the current one is within `reaching_radius`.
///
/// Returns the node to walk towards, or None for an empty path.
pub fn advance_patrol(route: &mut PatrolRoute, position: Vec3, reaching_radius: f32) -> Option<Vec3> {
    let len = route.nodes.len();
    if len == 0 {
        return None;
    }
    route.index %= len;
    if route.nodes[route.index].distance(position) <= reaching_radius {
        route.index = match route.direction {
            PatrolDirection::Forward => (route.index + 1) % len,
            PatrolDirection::Reverse => (route.index + len - 1) % len,
        };
    }
    Some(route.nodes[route.index])
}
