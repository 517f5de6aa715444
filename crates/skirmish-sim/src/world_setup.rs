//! Actor spawning.
//!
//! Builds the component set for a bot or a player and inserts it into the
//! world. Timers for the new life are scheduled by the engine.

use glam::Vec3;
use hecs::{Entity, World};
use tracing::info;

use skirmish_ai::fsm::new_combat_state;
use skirmish_ai::perception::new_detection_state;
use skirmish_ai::waypoint::closest_node_index;
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::constants::*;
use skirmish_core::enums::{ActorKind, PatrolDirection};
use skirmish_core::types::{ActorId, Affiliation};

use crate::error::{Result, SimError};
use crate::systems::roster::observer_of;

/// Everything needed to bring an actor into the world.
#[derive(Debug, Clone)]
pub struct ActorSpec {
    pub name: String,
    pub kind: ActorKind,
    pub team: Affiliation,
    pub position: Vec3,
    pub yaw: f32,
    /// Falls back to the engine's default profile.
    pub config: Option<AiConfig>,
    /// Falls back to [`default_weapon`].
    pub weapon: Option<WeaponBinding>,
    pub patrol: Vec<Vec3>,
}

impl ActorSpec {
    pub fn bot(name: impl Into<String>, team: u32, position: Vec3) -> Self {
        Self::new(name, ActorKind::Bot, team, position)
    }

    pub fn player(name: impl Into<String>, team: u32, position: Vec3) -> Self {
        Self::new(name, ActorKind::Player, team, position)
    }

    fn new(name: impl Into<String>, kind: ActorKind, team: u32, position: Vec3) -> Self {
        Self {
            name: name.into(),
            kind,
            team: Affiliation(team),
            position,
            yaw: 0.0,
            config: None,
            weapon: None,
            patrol: Vec::new(),
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_config(mut self, config: AiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponBinding) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_patrol(mut self, nodes: Vec<Vec3>) -> Self {
        self.patrol = nodes;
        self
    }
}

/// Weapon every actor carries until something else is equipped.
pub fn default_weapon() -> WeaponBinding {
    WeaponBinding {
        name: "rifle".into(),
        attack_range: DEFAULT_ATTACK_RANGE,
        stop_range: DEFAULT_STOP_ATTACK_RANGE,
        shot_interval: DEFAULT_SHOT_INTERVAL,
        damage: DEFAULT_SHOT_DAMAGE,
        muzzle_offset: Vec3::from(DEFAULT_MUZZLE_OFFSET),
        swap_delay: 0.0,
    }
}

/// Every team other than `team`.
pub fn hostile_affiliations(team: Affiliation, team_count: u32) -> Vec<Affiliation> {
    (0..team_count)
        .map(Affiliation)
        .filter(|a| *a != team)
        .collect()
}

/// Spawn an actor. Bots additionally get perception, combat and navigation state.
pub fn spawn_actor(
    world: &mut World,
    id: ActorId,
    spec: ActorSpec,
    team_count: u32,
    default_ai: &AiConfig,
    now: f32,
) -> Result<Entity> {
    if spec.team.0 >= team_count {
        return Err(SimError::InvalidTeam {
            team: spec.team,
            team_count,
        });
    }
    let config = match spec.config {
        Some(config) => {
            config.validate()?;
            config
        }
        None => default_ai.clone(),
    };
    let weapon = spec.weapon.unwrap_or_else(default_weapon);

    let info = ActorInfo {
        id,
        name: spec.name,
        kind: spec.kind,
        affiliation: spec.team,
        hostile_affiliations: hostile_affiliations(spec.team, team_count),
        kills: 0,
    };
    let body = Body {
        position: spec.position,
        yaw: spec.yaw,
        velocity: Vec3::ZERO,
        grounded: true,
        airborne: false,
        controller_enabled: true,
    };
    let health = Health {
        current: config.vitals.max_health,
        max: config.vitals.max_health,
        dead: false,
        invulnerable: false,
    };
    let spawn = SpawnPoint {
        position: spec.position,
        yaw: spec.yaw,
    };
    let runtime = WeaponRuntime {
        last_shot_at: None,
        equipped_at: now,
    };

    info!(actor = id.0, name = %info.name, kind = ?info.kind, team = info.affiliation.0, "actor spawned");

    let entity = match spec.kind {
        ActorKind::Player => world.spawn((Player, info, body, health, spawn, Life::default(), weapon, runtime, config)),
        ActorKind::Bot => {
            let detection = new_detection_state(&config.detection);
            let combat = new_combat_state(&weapon, &observer_of(&info, &body));
            let route = patrol_route(spec.patrol, config.combat.patrol_direction, spec.position);
            let agent = NavAgentState {
                enabled: true,
                heading: spec.yaw,
                ..NavAgentState::default()
            };
            world.spawn((
                Bot,
                info,
                body,
                health,
                spawn,
                Life::default(),
                weapon,
                runtime,
                config,
                detection,
                combat,
                route,
                agent,
                new_jump_state(),
            ))
        }
    };
    Ok(entity)
}

/// Patrol route starting at the node closest to `position`.
pub fn patrol_route(nodes: Vec<Vec3>, direction: PatrolDirection, position: Vec3) -> PatrolRoute {
    let index = closest_node_index(&nodes, position);
    PatrolRoute {
        nodes,
        index,
        direction,
    }
}

pub fn new_jump_state() -> JumpState {
    JumpState {
        armed: true,
        pending_link: false,
        link_position: Vec3::ZERO,
        obstacle_normal: Vec3::ZERO,
        obstacle_check: false,
        bounced: false,
        jumping_link: false,
    }
}

