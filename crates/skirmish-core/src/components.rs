//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in the AI crate and in simulation systems, not here.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ActorId, Affiliation};

/// Identity and team of a combatant.
///
/// `affiliation` and `hostile_affiliations` are set once at spawn and never
/// change for the lifetime of the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorInfo {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub affiliation: Affiliation,
    /// Teams this actor treats as hostile.
    pub hostile_affiliations: Vec<Affiliation>,
    /// Kills credited to this actor. Survives respawn.
    pub kills: u32,
}

/// Hit points of an actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// Latched on the first tick health reaches zero; cleared on respawn.
    pub dead: bool,
    /// Incoming damage is reduced to a token amount while set.
    pub invulnerable: bool,
}

/// Physical body of an actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Root position (feet).
    pub position: Vec3,
    /// Facing around +Y in radians (0 = +Z).
    pub yaw: f32,
    /// Velocity while airborne.
    pub velocity: Vec3,
    pub grounded: bool,
    /// In a jump or a fall.
    pub airborne: bool,
    /// False while dead; all combat and movement logic is skipped.
    pub controller_enabled: bool,
}

/// Where this actor comes back after dying.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub yaw: f32,
}

/// Life counter used to invalidate deferred actions scheduled in a previous life.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Life {
    pub generation: u32,
}

/// Perception memory of a bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionState {
    pub known_target: Option<ActorId>,
    /// True only if this tick's scan found an unobstructed hostile.
    pub is_seeing_target: bool,
    pub had_known_target_last_tick: bool,
    /// Time of the last sighting; None means never.
    pub time_last_seen: Option<f32>,
    pub detection_range: f32,
    pub is_target_in_attack_range: bool,
    /// A deferred "investigate attacker" action is scheduled.
    pub damage_reaction_pending: bool,
}

/// Latch that keeps a bot standing still while it turns to aim.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SettleLatch {
    pub latched: bool,
    /// Time the latch last engaged; None means never.
    pub latched_at: Option<f32>,
}

/// Combat state machine memory of a mobile bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub ai_state: AiState,
    /// Throttled navigation waypoint near the target.
    pub last_known_target_position: Vec3,
    /// Resample the waypoint on the next evaluation regardless of throttling.
    pub force_waypoint_resample: bool,
    pub dynamic_attack_range: f32,
    pub dynamic_stop_attack_range: f32,
    /// Goal most recently submitted to the navigation agent.
    pub pending_nav_goal: Option<Vec3>,
    /// Angle (degrees) between body forward and the target at the last aim resolution.
    pub aim_angle: f32,
    /// Where the weapon is currently pointed.
    pub weapon_look_at: Vec3,
    pub settle: SettleLatch,
}

/// Immutable snapshot of the equipped weapon, replaced on weapon switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponBinding {
    pub name: String,
    pub attack_range: f32,
    pub stop_range: f32,
    /// Minimum seconds between released shots.
    pub shot_interval: f32,
    pub damage: f32,
    /// Muzzle offset from the aim point in actor-local space (right, up, forward).
    pub muzzle_offset: Vec3,
    /// Seconds after equipping before the first shot may be released.
    pub swap_delay: f32,
}

/// Mutable firing bookkeeping for the equipped weapon.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeaponRuntime {
    pub last_shot_at: Option<f32>,
    pub equipped_at: f32,
}

/// Patrol path assigned to a bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolRoute {
    pub nodes: Vec<Vec3>,
    /// Index of the node currently walked towards.
    pub index: usize,
    pub direction: PatrolDirection,
}

/// Navigation agent driving a bot's body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NavAgentState {
    pub destination: Option<Vec3>,
    /// Planar velocity requested by the agent.
    pub velocity: Vec3,
    /// Disabled while the body is not grounded.
    pub enabled: bool,
    pub on_off_mesh_link: bool,
    /// Heading of the agent's path (radians).
    pub heading: f32,
    pub is_moving: bool,
}

/// Obstacle-jump sub-machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JumpState {
    /// Jumps are allowed (cooldown elapsed).
    pub armed: bool,
    /// The agent entered an off-mesh link and a jump is being considered.
    pub pending_link: bool,
    /// Where the agent was when it entered the link.
    pub link_position: Vec3,
    /// Normal of the obstacle found by the last forward ray.
    pub obstacle_normal: Vec3,
    /// Mid-air obstacle bumps are checked.
    pub obstacle_check: bool,
    /// Already bounced off an obstacle during this jump.
    pub bounced: bool,
    /// Mid-air over an off-mesh link obstacle; cleared on landing.
    pub jumping_link: bool,
}

/// Marks an entity as AI-controlled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bot;

/// Marks an entity as externally driven.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;
