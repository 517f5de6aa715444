//! The arena world: static boxes, actor volumes and navigation.
//!
//! Navigation is simple: the walkable surface is the top face of
//! every `GROUND` box, and agents steer in a straight line. Off-mesh links are
//! marked volumes; an agent stepping into one reports it so the jump logic can
//! take over.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_ai::query::{ActorColliders, NavStep, NavigationQuery, RayHit, SpatialQuery};
use skirmish_core::types::{ActorId, ColliderId, Layers};

use crate::shapes::Aabb;

/// Actor collider ids start here so they never clash with static ids.
const ACTOR_COLLIDER_BASE: u32 = 1_000_000;

/// Static floor slabs are this thick.
const FLOOR_THICKNESS: f32 = 1.0;

/// A box that never moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticCollider {
    pub id: ColliderId,
    pub bounds: Aabb,
    pub layer: Layers,
}

/// Serializable description of an arena.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Walkable slabs given by their top face corners.
    pub floors: Vec<(Vec3, Vec3)>,
    pub walls: Vec<Aabb>,
    pub props: Vec<Aabb>,
    pub links: Vec<Aabb>,
}

#[derive(Debug, Clone, Default)]
pub struct Arena {
    statics: Vec<StaticCollider>,
    actors: BTreeMap<ActorId, Aabb>,
    links: Vec<Aabb>,
    next_collider: u32,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layout(layout: &ArenaLayout) -> Self {
        let mut arena = Self::new();
        for (a, b) in &layout.floors {
            arena.add_floor(*a, *b);
        }
        for wall in &layout.walls {
            arena.add_box(*wall, Layers::OBSTACLE);
        }
        for prop in &layout.props {
            arena.add_box(*prop, Layers::PROP);
        }
        for link in &layout.links {
            arena.add_link(*link);
        }
        arena
    }

    /// Flat square arena of half-width `half_size` at height 0.
    pub fn flat(half_size: f32) -> Self {
        let mut arena = Self::new();
        arena.add_floor(
            Vec3::new(-half_size, 0.0, -half_size),
            Vec3::new(half_size, 0.0, half_size),
        );
        arena
    }

    pub fn add_box(&mut self, bounds: Aabb, layer: Layers) -> ColliderId {
        let id = ColliderId(self.next_collider);
        self.next_collider += 1;
        self.statics.push(StaticCollider { id, bounds, layer });
        id
    }

    /// Walkable slab whose top face spans the two corners (their y must match).
    pub fn add_floor(&mut self, a: Vec3, b: Vec3) -> ColliderId {
        let top = a.y.max(b.y);
        let min = Vec3::new(a.x.min(b.x), top - FLOOR_THICKNESS, a.z.min(b.z));
        let max = Vec3::new(a.x.max(b.x), top, a.z.max(b.z));
        self.add_box(Aabb::new(min, max), Layers::GROUND)
    }

    pub fn add_wall(&mut self, bounds: Aabb) -> ColliderId {
        self.add_box(bounds, Layers::OBSTACLE)
    }

    /// Mark a volume agents can only cross by jumping.
    pub fn add_link(&mut self, bounds: Aabb) {
        self.links.push(bounds);
    }

    pub fn statics(&self) -> &[StaticCollider] {
        &self.statics
    }

    pub fn actor_bounds(&self, id: ActorId) -> Option<&Aabb> {
        self.actors.get(&id)
    }

    fn all_hits(&self, origin: Vec3, direction: Vec3, max: f32, layers: Layers) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for collider in &self.statics {
            if !layers.intersects(collider.layer) {
                continue;
            }
            if let Some((distance, normal)) = collider.bounds.ray_entry(origin, direction, max) {
                hits.push(RayHit {
                    point: origin + direction * distance,
                    normal,
                    distance,
                    collider: collider.id,
                    layer: collider.layer,
                    owner: None,
                });
            }
        }
        if layers.contains(Layers::ACTOR) {
            for (id, bounds) in &self.actors {
                if let Some((distance, normal)) = bounds.ray_entry(origin, direction, max) {
                    hits.push(RayHit {
                        point: origin + direction * distance,
                        normal,
                        distance,
                        collider: ColliderId(ACTOR_COLLIDER_BASE + id.0),
                        layer: Layers::ACTOR,
                        owner: Some(*id),
                    });
                }
            }
        }
        hits
    }

    fn blocked_at(&self, point: Vec3) -> bool {
        self.statics
            .iter()
            .any(|c| c.layer.intersects(Layers::OBSTACLE) && c.bounds.contains(point))
    }

    fn link_at(&self, point: Vec3) -> bool {
        self.links.iter().any(|l| l.contains(point))
    }
}

impl SpatialQuery for Arena {
    fn raycast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: Layers) -> Vec<RayHit> {
        match direction.try_normalize() {
            Some(dir) => self.all_hits(origin, dir, max_distance, layers),
            None => Vec::new(),
        }
    }

    fn linecast(&self, from: Vec3, to: Vec3, layers: Layers, ignore: Option<ActorId>) -> Option<RayHit> {
        let segment = to - from;
        let length = segment.length();
        let dir = segment.try_normalize()?;
        self.all_hits(from, dir, length, layers)
            .into_iter()
            .filter(|hit| ignore.is_none() || hit.owner != ignore)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl NavigationQuery for Arena {
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.statics
            .iter()
            .filter(|c| c.layer.contains(Layers::GROUND))
            .map(|c| c.bounds.closest_on_top(point))
            .filter(|p| p.distance(point) <= max_distance)
            .filter(|p| !self.blocked_at(*p + Vec3::Y * 0.05))
            .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
    }

    fn steer(&self, from: Vec3, to: Vec3, max_step: f32) -> NavStep {
        let delta = to - from;
        let reached = delta.length() <= max_step;
        let position = if reached {
            to
        } else {
            from + delta.normalize() * max_step
        };
        NavStep {
            position,
            on_off_mesh_link: self.link_at(position + Vec3::Y * 0.05),
            reached,
        }
    }
}

impl ActorColliders for Arena {
    fn upsert_actor(&mut self, id: ActorId, base: Vec3, radius: f32, height: f32) {
        let bounds = Aabb::new(
            base - Vec3::new(radius, 0.0, radius),
            base + Vec3::new(radius, height, radius),
        );
        self.actors.insert(id, bounds);
    }

    fn remove_actor(&mut self, id: ActorId) {
        self.actors.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_wall() -> Arena {
        let mut arena = Arena::flat(50.0);
        arena.add_wall(Aabb::new(Vec3::new(-5.0, 0.0, 9.0), Vec3::new(5.0, 4.0, 10.0)));
        arena
    }

    #[test]
    fn test_raycast_all_collects_every_layer_hit() {
        let mut arena = arena_with_wall();
        arena.upsert_actor(ActorId(7), Vec3::new(0.0, 0.0, 20.0), 0.35, 1.8);

        let hits = arena.raycast_all(Vec3::new(0.0, 1.4, 0.0), Vec3::Z, 100.0, Layers::all());
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|h| h.owner == Some(ActorId(7))));
        assert!(hits.iter().any(|h| h.layer == Layers::OBSTACLE));

        // Filter out obstacles
        let hits = arena.raycast_all(Vec3::new(0.0, 1.4, 0.0), Vec3::Z, 100.0, !Layers::OBSTACLE);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].owner, Some(ActorId(7)));
    }

    #[test]
    fn test_linecast_closest_and_ignore() {
        let mut arena = Arena::flat(50.0);
        arena.upsert_actor(ActorId(1), Vec3::ZERO, 0.35, 1.8);
        arena.upsert_actor(ActorId(2), Vec3::new(0.0, 0.0, 10.0), 0.35, 1.8);

        // Cast from inside actor 1 never reports it
        let hit = arena
            .linecast(Vec3::new(0.0, 1.4, 0.0), Vec3::new(0.0, 1.4, 10.0), Layers::ACTOR, Some(ActorId(1)))
            .unwrap();
        assert_eq!(hit.owner, Some(ActorId(2)));
        assert!((hit.distance - 9.65).abs() < 1e-4);

        // Segment stopping short of actor 2
        assert!(arena
            .linecast(Vec3::new(0.0, 1.4, 1.0), Vec3::new(0.0, 1.4, 5.0), Layers::ACTOR, None)
            .is_none());

        arena.remove_actor(ActorId(2));
        assert!(arena
            .linecast(Vec3::new(0.0, 1.4, 0.0), Vec3::new(0.0, 1.4, 20.0), Layers::ACTOR, Some(ActorId(1)))
            .is_none());
    }

    #[test]
    fn test_ground_cast_hits_floor() {
        let arena = Arena::flat(10.0);
        let hit = arena
            .linecast(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, -2.0, 1.0), Layers::GROUND, None)
            .unwrap();
        assert!((hit.point.y).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);

        // Past the edge there is nothing
        assert!(arena
            .linecast(Vec3::new(15.0, 1.0, 0.0), Vec3::new(15.0, -2.0, 0.0), Layers::GROUND, None)
            .is_none());
    }

    #[test]
    fn test_sample_position() {
        let arena = arena_with_wall();
        let p = arena.sample_position(Vec3::new(3.0, 0.5, 3.0), 1.0).unwrap();
        assert_eq!(p, Vec3::new(3.0, 0.0, 3.0));

        // Too high above the floor
        assert!(arena.sample_position(Vec3::new(3.0, 5.0, 3.0), 1.0).is_none());
        // Inside the wall footprint
        assert!(arena.sample_position(Vec3::new(0.0, 0.2, 9.5), 1.0).is_none());
    }

    #[test]
    fn test_steer_and_links() {
        let mut arena = Arena::flat(50.0);
        arena.add_link(Aabb::new(Vec3::new(-1.0, 0.0, 4.0), Vec3::new(1.0, 2.0, 6.0)));

        let step = arena.steer(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), 4.5);
        assert_eq!(step.position, Vec3::new(0.0, 0.0, 4.5));
        assert!(step.on_off_mesh_link);
        assert!(!step.reached);

        let step = arena.steer(Vec3::new(0.0, 0.0, 9.0), Vec3::new(0.0, 0.0, 10.0), 4.5);
        assert!(step.reached);
        assert!(!step.on_off_mesh_link);
    }

    #[test]
    fn test_arena_from_layout() {
        let layout = ArenaLayout {
            floors: vec![(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 0.0, 10.0))],
            walls: vec![Aabb::new(Vec3::new(-1.0, 0.0, 4.0), Vec3::new(1.0, 3.0, 5.0))],
            props: vec![],
            links: vec![],
        };
        let arena = Arena::from_layout(&layout);
        assert_eq!(arena.statics().len(), 2);
        assert_eq!(arena.statics()[1].layer, Layers::OBSTACLE);
    }
}
