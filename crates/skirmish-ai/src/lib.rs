//! Combat AI for SKIRMISH.
//!
//! Perception, the Patrol/Follow/Attack state machine, aim resolution and
//! the navigation-bridge decisions. Everything here is a pure function over
//! plain data plus the injected [`query`] traits. No ECS dependency.

pub mod aim;
pub mod error;
pub mod fsm;
pub mod locomotion;
pub mod perception;
pub mod query;
pub mod roster;
pub mod waypoint;

pub use skirmish_core as core;
