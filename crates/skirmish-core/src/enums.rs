//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Combat state of a mobile bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Walking the assigned patrol path (or idling until one is assigned).
    #[default]
    Patrol,
    /// Closing in on a known target.
    Follow,
    /// Target within weapon range: aiming and firing.
    Attack,
}

/// Order in which patrol nodes are visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolDirection {
    #[default]
    Forward,
    Reverse,
}

/// Global run state of the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Running,
    /// All per-frame and physics logic is skipped.
    Paused,
}

/// Who drives an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    /// AI-controlled combatant.
    Bot,
    /// Externally driven combatant (the host moves it).
    Player,
}

/// What killed an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Damage from another actor (or self-damage).
    Actor,
    /// Fell below the kill height or similar world hazard.
    Environment,
}
