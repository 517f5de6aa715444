//! Events emitted by the simulation for hosts, logs and tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::ActorId;

/// Something observable that happened during a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A bot acquired a target it did not have the previous tick.
    TargetDetected { actor: ActorId, target: ActorId },
    /// A bot forgot its target.
    TargetLost { actor: ActorId },
    /// Combat state transition.
    StateChanged {
        actor: ActorId,
        from: AiState,
        to: AiState,
    },
    /// A shot was released.
    ShotFired {
        actor: ActorId,
        origin: Vec3,
        direction: Vec3,
        hit: Option<ActorId>,
    },
    /// Health went down.
    Damaged {
        target: ActorId,
        source: Option<ActorId>,
        amount: f32,
        remaining: f32,
    },
    Killed {
        victim: ActorId,
        killer: Option<ActorId>,
        cause: DeathCause,
    },
    Respawned { actor: ActorId, position: Vec3 },
    /// An obstacle jump started.
    Jumped { actor: ActorId, position: Vec3 },
}
