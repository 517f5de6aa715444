//! Simulation constants and tuning defaults.
//!
//! Per-actor values here are only defaults; the live numbers come from
//! each actor's `AiConfig`, supplied at spawn time.

use crate::types::Layers;

/// Physics step rate (Hz).
pub const PHYSICS_RATE: u32 = 50;

/// Seconds per physics step.
pub const FIXED_DT: f32 = 1.0 / PHYSICS_RATE as f32;

/// Upper bound on physics steps run for a single frame (spiral-of-death guard).
pub const MAX_PHYSICS_STEPS_PER_FRAME: u32 = 8;

// --- Teams ---

/// Default number of teams in a match.
pub const DEFAULT_TEAM_COUNT: u32 = 2;

// --- Actor geometry ---

/// Height of an actor's hit volume (meters).
pub const ACTOR_HEIGHT: f32 = 1.8;

/// Half-width of an actor's hit volume (meters).
pub const ACTOR_RADIUS: f32 = 0.35;

/// Height of the aim point above the actor root.
pub const AIM_POINT_HEIGHT: f32 = 1.4;

/// Height of the detection source (eyes) above the actor root.
pub const EYE_HEIGHT: f32 = 1.6;

/// Muzzle offset from the aim point in actor-local space (right, up, forward).
pub const DEFAULT_MUZZLE_OFFSET: [f32; 3] = [0.25, -0.1, 0.6];

/// Distance of the "look forward" point in front of the body.
pub const FORWARD_LOOK_DISTANCE: f32 = 20.0;

// --- Detection ---

/// Max distance at which a bot can see targets.
pub const DETECTION_RANGE: f32 = 100.0;

/// Detection range used when the range limit is ignored.
pub const UNLIMITED_DETECTION_RANGE: f32 = 1000.0;

/// Seconds before a bot abandons a known target it can no longer see.
pub const KNOWN_TARGET_TIMEOUT: f32 = 4.0;

// --- Aim and weapon look ---

/// Max angle (degrees) between body forward and the target for aim sampling.
pub const AIM_MAX_ANGLE: f32 = 80.0;

/// Max angle (degrees) at which an aim sample may be fired upon.
pub const WEAPON_MAX_SHOOT_ANGLE: f32 = 10.0;

/// Max angle (degrees) the weapon may be turned away from body forward.
pub const WEAPON_MAX_LOOK_ANGLE: f32 = 60.0;

/// Weapon look-at interpolation speed (per second).
pub const WEAPON_ROTATION_SPEED: f32 = 15.0;

/// Number of line casts per aim resolution.
pub const MUZZLE_MAX_CAST_ATTEMPTS: u32 = 5;

/// Half-extent of the random aim jitter applied between samples (meters).
pub const AIM_JITTER: f32 = 0.2;

// --- Combat movement ---

/// Distance at which a patrol node counts as reached.
pub const PATH_REACHING_RADIUS: f32 = 2.0;

/// Radius of the random waypoint search around the target.
pub const WAYPOINT_SEARCH_RADIUS: f32 = 10.0;

/// Minimum drift between target and waypoint before a resample is considered.
pub const WAYPOINT_DRIFT_THRESHOLD: f32 = 2.0;

/// Max distance between a sampled point and the walkable surface.
pub const NAV_SAMPLE_DISTANCE: f32 = 1.0;

/// Radius used when resampling the waypoint around the aim point on settle.
pub const SETTLE_RESAMPLE_RADIUS: f32 = 1.0;

/// Debounce window between stopping to aim and resuming pursuit (seconds).
pub const SETTLE_INTERVAL: f32 = 3.0;

// --- Navigation and jumping ---

/// Body turn speed (slerp factor per second).
pub const ORIENTATION_SPEED: f32 = 30.0;

/// Agent speed above which the agent counts as moving.
pub const AGENT_VELOCITY_MAGNITUDE: f32 = 4.0;

/// Walking speed of a bot (m/s).
pub const GROUND_SPEED: f32 = 6.0;

/// Downward acceleration while airborne (m/s²).
pub const GRAVITY: f32 = 20.0;

/// Apex height of an obstacle jump (meters).
pub const JUMP_HEIGHT: f32 = 2.0;

/// Delay after take-off before mid-air obstacle checks start (seconds).
pub const DELAY_OBSTACLE_CHECK: f32 = 0.2;

/// Cooldown between obstacle jumps (seconds).
pub const JUMP_COOLDOWN: f32 = 1.25;

/// Height above the root at which obstacle rays start.
pub const OBSTACLE_OFFSET_Y: f32 = 0.75;

/// Length of the forward obstacle ray.
pub const OBSTACLE_CAST_LENGTH: f32 = 3.0;

/// Distance from the off-mesh link entry within which a jump may start.
pub const OFF_MESH_LINK_RADIUS: f32 = 5.0;

/// Forward distance of the "surface ahead" ray.
pub const SURFACE_UNDER_CAST_LENGTH: f32 = 3.0;

/// Depth below the root of the "surface ahead" ray.
pub const SURFACE_UNDER_CAST_DEPTH: f32 = 3.0;

/// Mid-air steering strength (percent of input per step).
pub const AIR_CONTROL: f32 = 2.5;

/// Fraction of ground velocity carried into a jump.
pub const JUMP_DAMP: f32 = 0.5;

/// Push-back speed after bumping an obstacle mid-air.
pub const RETURN_FORCE: f32 = 2.0;

/// Ground ray depth below the root while grounded.
pub const STEP_DOWN: f32 = 0.1;

// --- Vitals ---

/// Default maximum health.
pub const MAX_HEALTH: f32 = 100.0;

/// Height below which an actor dies instantly.
pub const KILL_HEIGHT: f32 = -50.0;

/// Interval of the kill-height poll (seconds).
pub const KILL_HEIGHT_POLL_INTERVAL: f32 = 0.25;

/// Delay between death and respawn (seconds).
pub const RESPAWN_DELAY: f32 = 3.0;

/// Invulnerability window after respawn (seconds).
pub const INVULNERABLE_TIME: f32 = 2.0;

/// Damage taken while invulnerable.
pub const INVULNERABLE_DAMAGE: f32 = 0.01;

/// Health regained per passive regeneration tick.
pub const PASSIVE_HEAL_AMOUNT: f32 = 5.0;

/// Interval between passive regeneration ticks (seconds).
pub const PASSIVE_HEAL_INTERVAL: f32 = 1.0;

// --- Weapons ---

/// Attack range used before any weapon is equipped.
pub const DEFAULT_ATTACK_RANGE: f32 = 50.0;

/// Stop range used before any weapon is equipped.
pub const DEFAULT_STOP_ATTACK_RANGE: f32 = 10.0;

/// Shot interval used before any weapon is equipped.
pub const DEFAULT_SHOT_INTERVAL: f32 = 0.2;

/// Damage per shot of the default weapon.
pub const DEFAULT_SHOT_DAMAGE: f32 = 10.0;

// --- Cast layers ---

/// Layers seen by the perception scan (everything but triggers).
pub const DETECTION_IGNORE_LAYERS: Layers = Layers::TRIGGER;

/// Layers hit by weapon and aim casts.
pub const WEAPON_CAST_LAYERS: Layers = Layers::GROUND
    .union(Layers::OBSTACLE)
    .union(Layers::ACTOR)
    .union(Layers::PROP);

/// Layers hit by ground and obstacle rays.
pub const GROUND_CAST_LAYERS: Layers = Layers::GROUND.union(Layers::OBSTACLE);
