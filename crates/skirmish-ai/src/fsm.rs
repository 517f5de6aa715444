//! Combat State Machine: Patrol, Follow and Attack.
//!
//! Pure functions over plain data. The simulation feeds perception events
//! through [`on_perception_event`] and then calls [`evaluate`] once per frame;
//! the returned [`CombatDecision`] is what the navigation bridge and the
//! weapon act on.

use glam::Vec3;
use rand::Rng;
use skirmish_core::components::{CombatState, PatrolRoute, SettleLatch, WeaponBinding};
use skirmish_core::config::{CombatConfig, NavigationConfig};
use skirmish_core::constants::SETTLE_RESAMPLE_RADIUS;
use skirmish_core::enums::AiState;
use tracing::debug;

use crate::aim::{muzzle_pose, resolve_aim_point, resolve_weapon_point, weapon_look_at};
use crate::locomotion::surface_ahead;
use crate::perception::PerceptionEvent;
use crate::query::{NavigationQuery, SpatialQuery};
use crate::roster::{Observer, Roster, RosterEntry};
use crate::waypoint::{advance_patrol, resample_waypoint, update_waypoint};

/// A state change, `(from, to)`.
pub type Transition = (AiState, AiState);

/// Fresh combat memory for a new life.
pub fn new_combat_state(weapon: &WeaponBinding, observer: &Observer) -> CombatState {
    CombatState {
        ai_state: AiState::Patrol,
        last_known_target_position: observer.position,
        force_waypoint_resample: false,
        dynamic_attack_range: weapon.attack_range,
        dynamic_stop_attack_range: weapon.stop_range,
        pending_nav_goal: None,
        aim_angle: 0.0,
        weapon_look_at: observer.forward_point(),
        settle: SettleLatch::default(),
    }
}

/// Pick up the ranges of a newly equipped weapon.
pub fn on_weapon_switched(combat: &mut CombatState, weapon: &WeaponBinding) {
    combat.dynamic_attack_range = weapon.attack_range;
    combat.dynamic_stop_attack_range = weapon.stop_range;
}

/// Apply a perception edge event.
pub fn on_perception_event(combat: &mut CombatState, event: PerceptionEvent) -> Option<Transition> {
    let from = combat.ai_state;
    let to = match (from, event) {
        (AiState::Patrol, PerceptionEvent::Detected(_)) => {
            combat.force_waypoint_resample = true;
            AiState::Follow
        }
        (AiState::Follow | AiState::Attack, PerceptionEvent::Lost) => AiState::Patrol,
        _ => return None,
    };
    combat.ai_state = to;
    Some((from, to))
}

/// Distance-driven Follow/Attack transitions.
///
/// `target_distance` is None when there is no known target; nothing changes then.
pub fn evaluate_transition(combat: &mut CombatState, target_distance: Option<f32>) -> Option<Transition> {
    let distance = target_distance?;
    let from = combat.ai_state;
    let to = match from {
        AiState::Follow if distance < combat.dynamic_attack_range => AiState::Attack,
        AiState::Attack if distance >= combat.dynamic_attack_range => AiState::Follow,
        _ => return None,
    };
    combat.ai_state = to;
    Some((from, to))
}

/// The settle latch timer elapsed.
pub fn release_settle(combat: &mut CombatState) {
    combat.settle.latched = false;
}

/// How the body should turn this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Facing {
    /// Leave the yaw alone.
    #[default]
    Keep,
    /// Follow the navigation agent's heading.
    Agent,
    /// Turn towards a world point.
    Toward(Vec3),
}

/// Everything one combat evaluation decided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatDecision {
    /// Destination for the navigation agent.
    pub nav_goal: Option<Vec3>,
    pub facing: Facing,
    /// Release a shot at this point, subject to weapon cadence.
    pub fire_at: Option<Vec3>,
    pub transition: Option<Transition>,
    /// The settle latch engaged; the caller schedules its release.
    pub settle_engaged: bool,
}

/// Per-frame inputs that are not owned by the state machine.
pub struct CombatContext<'a> {
    pub combat_cfg: &'a CombatConfig,
    pub nav_cfg: &'a NavigationConfig,
    pub observer: &'a Observer<'a>,
    pub target: Option<&'a RosterEntry>,
    pub muzzle_offset: Vec3,
    pub agent_moving: bool,
    pub now: f32,
    pub dt: f32,
}

/// Run one state machine evaluation.
pub fn evaluate(
    ctx: &CombatContext,
    combat: &mut CombatState,
    route: Option<&mut PatrolRoute>,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    nav: &impl NavigationQuery,
    rng: &mut impl Rng,
) -> CombatDecision {
    let mut decision = CombatDecision::default();
    let observer = ctx.observer;

    let target_distance = ctx.target.map(|t| t.aim_point.distance(observer.aim_point));
    if let Some(target) = ctx.target {
        update_waypoint(
            ctx.combat_cfg,
            combat,
            target.aim_point,
            ctx.agent_moving,
            nav,
            rng,
        );
    }
    decision.transition = evaluate_transition(combat, target_distance);

    match combat.ai_state {
        AiState::Patrol => evaluate_patrol(ctx, combat, route, &mut decision),
        AiState::Follow => {
            if ctx.target.is_some() {
                look_weapon(ctx, combat, observer.forward_point());
                decision.facing = Facing::Agent;
                decision.nav_goal = Some(combat.last_known_target_position);
            }
        }
        AiState::Attack => {
            if let (Some(target), Some(distance)) = (ctx.target, target_distance) {
                evaluate_attack(ctx, combat, target, distance, roster, spatial, nav, rng, &mut decision);
            }
        }
    }

    if let Some((from, to)) = decision.transition {
        debug!(actor = observer.id.0, ?from, ?to, "combat state changed");
    }
    decision
}

fn evaluate_patrol(
    ctx: &CombatContext,
    combat: &mut CombatState,
    route: Option<&mut PatrolRoute>,
    decision: &mut CombatDecision,
) {
    let observer = ctx.observer;
    let node = route.and_then(|r| advance_patrol(r, observer.position, ctx.combat_cfg.path_reaching_radius));

    let Some(node) = node else {
        // No path yet: stand still and re-evaluate as Follow
        combat.last_known_target_position = observer.position;
        decision.nav_goal = Some(observer.position);
        combat.ai_state = AiState::Follow;
        decision.transition = Some((AiState::Patrol, AiState::Follow));
        return;
    };

    look_weapon(ctx, combat, observer.forward_point());
    decision.facing = Facing::Agent;
    decision.nav_goal = Some(node);
}

#[allow(clippy::too_many_arguments)]
fn evaluate_attack(
    ctx: &CombatContext,
    combat: &mut CombatState,
    target: &RosterEntry,
    distance: f32,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    nav: &impl NavigationQuery,
    rng: &mut impl Rng,
    decision: &mut CombatDecision,
) {
    let cfg = ctx.combat_cfg;
    let observer = ctx.observer;

    let aim = resolve_aim_point(cfg, observer, target, roster, spatial, rng);
    combat.aim_angle = aim.angle;

    let muzzle = muzzle_pose(observer, ctx.muzzle_offset, combat.weapon_look_at);
    let weapon = resolve_weapon_point(observer, &muzzle, combat.dynamic_attack_range, roster, spatial);

    let required = weapon
        .or(aim.point)
        .unwrap_or_else(|| observer.forward_point());

    let aim_shootable = aim.point.is_some() && aim.angle <= cfg.weapon_max_shoot_angle;
    if aim_shootable || weapon.is_some() {
        let height_ok = target.aim_point.y < observer.aim_point.y
            || distance > target.aim_point.y - observer.aim_point.y;
        let outside_stop = distance > combat.dynamic_stop_attack_range;
        let keep_moving = height_ok
            && outside_stop
            && cfg.move_while_shoot
            && surface_ahead(ctx.nav_cfg, observer.position, observer.yaw, spatial);

        look_weapon(ctx, combat, required);
        decision.nav_goal = Some(if keep_moving {
            combat.last_known_target_position
        } else {
            observer.position
        });
        decision.fire_at = aim.point.or(weapon);
        return;
    }

    // No shot: stop and turn towards the target, at most once per settle interval
    if let Some(aim_point) = aim.point {
        let settle = combat.settle;
        let may_settle = settle.latched
            || settle
                .latched_at
                .map_or(true, |t| ctx.now > t + cfg.settle_interval);
        if may_settle {
            if !settle.latched {
                combat.settle = SettleLatch {
                    latched: true,
                    latched_at: Some(ctx.now),
                };
                decision.settle_engaged = true;
                resample_waypoint(cfg, combat, aim_point, SETTLE_RESAMPLE_RADIUS, nav, rng);
            }
            look_weapon(ctx, combat, required);
            decision.facing = Facing::Toward(aim_point);
            decision.nav_goal = Some(observer.position);
        }
    }

    if combat.settle.latched {
        return;
    }

    look_weapon(ctx, combat, required);
    decision.facing = Facing::Agent;
    decision.nav_goal = Some(combat.last_known_target_position);
}

fn look_weapon(ctx: &CombatContext, combat: &mut CombatState, point: Vec3) {
    combat.weapon_look_at = weapon_look_at(
        ctx.combat_cfg,
        ctx.observer,
        combat.weapon_look_at,
        point,
        ctx.dt,
    );
}
