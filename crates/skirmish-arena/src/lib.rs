//! Headless arena geometry for SKIRMISH.
//!
//! A static world of axis-aligned boxes (floors, walls, props), actor hit
//! volumes and off-mesh link volumes. Implements the AI crate's spatial and
//! navigation query traits so the simulation can run without a game engine.

pub mod arena;
pub mod shapes;

pub use arena::{Arena, ArenaLayout};
pub use shapes::Aabb;
