//! Perception Engine: line-of-sight target acquisition with timed memory.
//!
//! [`update_detection`] runs once per frame per bot. It is the only writer
//! of [`DetectionState`] apart from the spawn, death and damage hooks below,
//! and its returned [`PerceptionEvent`] is the only way the combat state
//! machine learns about acquisitions and losses.

use glam::Vec3;
use skirmish_core::components::DetectionState;
use skirmish_core::config::DetectionConfig;
use skirmish_core::types::{angle_between, ActorId};
use tracing::debug;

use crate::error::{AiError, Result};
use crate::query::SpatialQuery;
use crate::roster::{Observer, Roster, RosterEntry};

/// Edge-triggered perception change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptionEvent {
    /// A target became known this tick.
    Detected(ActorId),
    /// The known target was forgotten this tick.
    Lost,
}

/// Fresh perception memory for a new life.
pub fn new_detection_state(cfg: &DetectionConfig) -> DetectionState {
    DetectionState {
        known_target: None,
        is_seeing_target: false,
        had_known_target_last_tick: false,
        time_last_seen: None,
        detection_range: cfg.effective_range(),
        is_target_in_attack_range: false,
        damage_reaction_pending: false,
    }
}

/// Run one perception scan.
///
/// `attack_range` is the observer's current dynamic attack range and only
/// feeds `is_target_in_attack_range`.
pub fn update_detection(
    cfg: &DetectionConfig,
    observer: &Observer,
    state: &mut DetectionState,
    attack_range: f32,
    roster: &Roster,
    spatial: &impl SpatialQuery,
    now: f32,
) -> Option<PerceptionEvent> {
    // Expiry uses last tick's visibility
    if let Some(target) = state.known_target {
        let dead = roster.get(target).map_or(true, |e| !e.alive);
        let timed_out = !cfg.auto_random_target
            && !state.is_seeing_target
            && state
                .time_last_seen
                .map_or(true, |t| now - t > cfg.known_target_timeout);
        if dead || timed_out {
            state.known_target = None;
        }
    }

    state.is_seeing_target = false;

    let range = state.detection_range;
    let range_sq = range * range;
    let mut closest_sq = f32::INFINITY;

    for candidate in roster.hostiles_of(observer) {
        let sq = candidate.position.distance_squared(observer.eye_point);
        if sq >= range_sq || sq >= closest_sq {
            continue;
        }

        let Some(direction) = (candidate.aim_point - observer.eye_point).try_normalize() else {
            continue;
        };

        let closest_hit = spatial
            .raycast_all(observer.eye_point, direction, range, !cfg.ignore_layers)
            .into_iter()
            .filter(|hit| hit.owner != Some(observer.id))
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        let seen = match closest_hit {
            Some(hit) => hit.owner,
            None if cfg.see_through_walls => roster
                .hostiles_of(observer)
                .min_by(|a, b| {
                    a.position
                        .distance_squared(candidate.position)
                        .total_cmp(&b.position.distance_squared(candidate.position))
                })
                .map(|e| e.id),
            None => None,
        };

        if seen == Some(candidate.id) {
            state.is_seeing_target = true;
            state.time_last_seen = Some(now);
            state.known_target = Some(candidate.id);
            closest_sq = sq;
        }
    }

    state.is_target_in_attack_range = state
        .known_target
        .and_then(|id| roster.get(id))
        .is_some_and(|t| t.aim_point.distance(observer.aim_point) <= attack_range);

    let event = match (state.had_known_target_last_tick, state.known_target) {
        (false, Some(target)) => {
            debug!(actor = observer.id.0, target = target.0, "target detected");
            Some(PerceptionEvent::Detected(target))
        }
        (true, None) => {
            debug!(actor = observer.id.0, "target lost");
            Some(PerceptionEvent::Lost)
        }
        _ => None,
    };

    state.had_known_target_last_tick = state.known_target.is_some();
    event
}

/// Auto-random-target mode: adopt the nearest hostile as soon as a life starts.
///
/// The edge event for it fires on the next [`update_detection`].
pub fn acquire_initial_target(
    cfg: &DetectionConfig,
    observer: &Observer,
    state: &mut DetectionState,
    roster: &Roster,
    now: f32,
) -> Option<ActorId> {
    if !cfg.auto_random_target {
        return None;
    }
    let target = nearest_actor(observer.eye_point, roster.hostiles_of(observer))
        .ok()?
        .id;
    state.known_target = Some(target);
    state.is_seeing_target = true;
    state.time_last_seen = Some(now);
    Some(target)
}

/// Forget everything. Called when the owner dies.
pub fn reset_detection(state: &mut DetectionState) {
    state.known_target = None;
    state.had_known_target_last_tick = false;
    state.is_seeing_target = false;
    state.is_target_in_attack_range = false;
    state.time_last_seen = None;
    state.damage_reaction_pending = false;
}

/// Damage from another actor was taken.
///
/// Refreshes the sighting clock. Returns true if the caller should schedule
/// the deferred "investigate attacker" reaction; repeat calls while one is
/// pending return false.
pub fn on_damaged(state: &mut DetectionState, now: f32) -> bool {
    state.time_last_seen = Some(now);
    if state.damage_reaction_pending {
        return false;
    }
    state.damage_reaction_pending = true;
    true
}

/// Deferred half of [`on_damaged`]: point the bot at its attacker.
///
/// Applies only if there is no known target, the known target already is the
/// attacker, or the attacker is closer than the known target. Returns whether
/// the override was applied.
pub fn apply_damage_reaction(
    observer: &Observer,
    state: &mut DetectionState,
    attacker: ActorId,
    roster: &Roster,
    now: f32,
) -> bool {
    state.damage_reaction_pending = false;

    let Some(attacker_entry) = roster.get(attacker) else {
        return false;
    };
    if !attacker_entry.alive || !observer.is_hostile(attacker_entry.affiliation) {
        return false;
    }

    let closer = match state.known_target.and_then(|id| roster.get(id)) {
        None => true,
        Some(known) if known.id == attacker => true,
        Some(known) => {
            attacker_entry.aim_point.distance_squared(observer.eye_point)
                < known.aim_point.distance_squared(observer.eye_point)
        }
    };
    if !closer {
        debug!(
            actor = observer.id.0,
            attacker = attacker.0,
            "damage reaction skipped, closer target known"
        );
        return false;
    }

    state.known_target = Some(attacker);
    state.time_last_seen = Some(now);
    true
}

/// Actor whose aim point is nearest to `source`.
pub fn nearest_actor<'a>(
    source: Vec3,
    candidates: impl IntoIterator<Item = &'a RosterEntry>,
) -> Result<&'a RosterEntry> {
    candidates
        .into_iter()
        .min_by(|a, b| {
            a.aim_point
                .distance_squared(source)
                .total_cmp(&b.aim_point.distance_squared(source))
        })
        .ok_or(AiError::EmptyRoster)
}

/// Distance to the nearest living teammate within `max_angle` degrees of the
/// observer's forward direction.
pub fn nearest_forward_friend_distance(
    observer: &Observer,
    roster: &Roster,
    max_angle: f32,
) -> Result<f32> {
    let forward = observer.forward();
    let ahead = roster.friends_of(observer).filter(|friend| {
        angle_between(forward, friend.aim_point - observer.eye_point) <= max_angle
    });
    let nearest = nearest_actor(observer.eye_point, ahead)?;
    Ok(nearest.aim_point.distance(observer.eye_point))
}
