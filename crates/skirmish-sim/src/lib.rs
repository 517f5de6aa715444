//! Simulation engine for SKIRMISH.
//!
//! Owns the hecs ECS world of combatants, runs the perception, combat,
//! weapon and navigation systems every frame and the movement physics at a
//! fixed rate, and produces `SimSnapshot`s. Completely headless.

pub mod engine;
pub mod error;
pub mod systems;
pub mod timers;
pub mod world_setup;

pub use engine::{ArenaSimulation, SimConfig, SimulationEngine};
pub use skirmish_core as core;
pub use world_setup::ActorSpec;

#[cfg(test)]
mod tests;
