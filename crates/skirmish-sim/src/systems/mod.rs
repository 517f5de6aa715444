//! ECS systems that operate on the simulation world each frame.
//!
//! Systems are free functions that take `&mut World` (or `&World` for
//! read-only). They own no state; everything lives in components, the
//! timer queue or the environment passed in.

pub mod colliders;
pub mod combat;
pub mod health;
pub mod locomotion;
pub mod navigation;
pub mod perception;
pub mod roster;
pub mod snapshot;
pub mod weapons;
