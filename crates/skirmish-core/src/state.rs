//! Simulation snapshot returned after each frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ActorId, Affiliation, SimTime};

/// Complete visible state of the simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    /// Sorted by actor id.
    pub actors: Vec<ActorView>,
}

/// One actor as seen by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub affiliation: Affiliation,
    pub position: Vec3,
    pub yaw: f32,
    pub health: f32,
    pub dead: bool,
    pub kills: u32,
    /// Bots only.
    pub ai_state: Option<AiState>,
    pub known_target: Option<ActorId>,
    pub is_seeing_target: bool,
}
