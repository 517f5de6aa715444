//! Commands sent from the host to the simulation.
//!
//! Commands are queued and processed at the start of the next frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::WeaponBinding;
use crate::enums::PatrolDirection;
use crate::types::ActorId;

/// All possible host actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Simulation control ---
    /// Freeze all per-frame and physics logic.
    Pause,
    Resume,

    // --- Perception ---
    /// Toggle unlimited detection range for every bot.
    SetIgnoreDetectionRange { enabled: bool },

    // --- Actor control ---
    /// Replace a bot's patrol path.
    AssignPatrolPath {
        actor: ActorId,
        nodes: Vec<Vec3>,
        direction: PatrolDirection,
    },
    /// Switch an actor's weapon.
    EquipWeapon {
        actor: ActorId,
        weapon: WeaponBinding,
    },
    /// Apply damage from an optional source.
    Damage {
        target: ActorId,
        source: Option<ActorId>,
        amount: f32,
    },
    /// Teleport an actor (used to drive players).
    MoveActor {
        actor: ActorId,
        position: Vec3,
        yaw: f32,
    },
}
