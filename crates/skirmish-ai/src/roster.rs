//! Per-tick snapshot of every actor, and the observer view of one bot.
//!
//! The simulation builds a [`Roster`] once per frame before perception runs.
//! Decision functions only ever read it, so spawns and deaths during a
//! frame cannot change what a scan sees.

use glam::Vec3;
use skirmish_core::constants::FORWARD_LOOK_DISTANCE;
use skirmish_core::types::{yaw_to_forward, yaw_to_right, ActorId, Affiliation};

/// One actor as seen by everybody else this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: ActorId,
    pub affiliation: Affiliation,
    /// Root (feet) position.
    pub position: Vec3,
    pub yaw: f32,
    /// Universal targeting anchor.
    pub aim_point: Vec3,
    pub alive: bool,
}

impl RosterEntry {
    pub fn right(&self) -> Vec3 {
        yaw_to_right(self.yaw)
    }
}

/// Immutable list of actors sorted by id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(mut entries: Vec<RosterEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        Self { entries }
    }

    pub fn get(&self, id: ActorId) -> Option<&RosterEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Living actors the observer treats as hostile.
    pub fn hostiles_of<'a>(
        &'a self,
        observer: &'a Observer<'a>,
    ) -> impl Iterator<Item = &'a RosterEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.alive && observer.is_hostile(e.affiliation))
    }

    /// Living teammates of the observer, excluding itself.
    pub fn friends_of<'a>(
        &'a self,
        observer: &'a Observer<'a>,
    ) -> impl Iterator<Item = &'a RosterEntry> + 'a {
        self.entries.iter().filter(move |e| {
            e.alive && e.id != observer.id && e.affiliation == observer.affiliation
        })
    }
}

/// The bot running a decision, with its body frame.
#[derive(Debug, Clone, Copy)]
pub struct Observer<'a> {
    pub id: ActorId,
    pub affiliation: Affiliation,
    pub hostile_affiliations: &'a [Affiliation],
    /// Root (feet) position.
    pub position: Vec3,
    pub yaw: f32,
    pub aim_point: Vec3,
    /// Origin of detection casts.
    pub eye_point: Vec3,
}

impl Observer<'_> {
    pub fn is_hostile(&self, affiliation: Affiliation) -> bool {
        affiliation != self.affiliation && self.hostile_affiliations.contains(&affiliation)
    }

    pub fn forward(&self) -> Vec3 {
        yaw_to_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        yaw_to_right(self.yaw)
    }

    /// Point straight ahead of the body, used when there is nothing to point at.
    pub fn forward_point(&self) -> Vec3 {
        self.position + Vec3::Y + self.forward() * FORWARD_LOOK_DISTANCE
    }
}
