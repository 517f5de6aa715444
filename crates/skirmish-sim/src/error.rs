//! Simulation errors.

use skirmish_core::error::ConfigError;
use skirmish_core::types::{ActorId, Affiliation};
use thiserror::Error;

/// Errors from the fallible setup APIs. Nothing in the per-frame path fails.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("team {team:?} is outside the {team_count} configured teams")]
    InvalidTeam { team: Affiliation, team_count: u32 },

    #[error("unknown actor {0:?}")]
    UnknownActor(ActorId),
}

pub type Result<T> = std::result::Result<T, SimError>;
