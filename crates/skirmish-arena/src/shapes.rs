//! Axis-aligned boxes and ray intersection.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Below this a direction component is treated as parallel to the slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning two corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Whether the vertical column through `p` crosses the box.
    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Closest point of the top face to `p`.
    pub fn closest_on_top(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min.x, self.max.x),
            self.max.y,
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Distance along a normalized ray to where it enters the box, and the
    /// normal of the face it enters through.
    ///
    /// Rays starting inside the box do not hit it.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (near, far) = {
                let t1 = (lo - o) * inv;
                let t2 = (hi - o) * inv;
                if t1 <= t2 {
                    (t1, t2)
                } else {
                    (t2, t1)
                }
            };

            if near > t_enter {
                t_enter = near;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(far);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 || t_enter > max_distance {
            return None;
        }
        Some((t_enter, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(z: f32) -> Aabb {
        Aabb::from_center(Vec3::new(0.0, 0.0, z), Vec3::splat(0.5))
    }

    #[test]
    fn test_ray_hits_front_face() {
        let b = unit_box_at(10.0);
        let (t, n) = b.ray_entry(Vec3::ZERO, Vec3::Z, 100.0).unwrap();
        assert!((t - 9.5).abs() < 1e-5);
        assert_eq!(n, -Vec3::Z);
    }

    #[test]
    fn test_ray_misses_and_range() {
        let b = unit_box_at(10.0);
        assert!(b.ray_entry(Vec3::ZERO, Vec3::X, 100.0).is_none());
        assert!(b.ray_entry(Vec3::ZERO, -Vec3::Z, 100.0).is_none());
        assert!(b.ray_entry(Vec3::ZERO, Vec3::Z, 5.0).is_none());
        // Parallel ray outside the slab
        assert!(b.ray_entry(Vec3::new(2.0, 0.0, 0.0), Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn test_ray_from_inside_ignored() {
        let b = unit_box_at(0.0);
        assert!(b.ray_entry(Vec3::ZERO, Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn test_diagonal_entry_normal() {
        let b = Aabb::new(Vec3::new(-1.0, -10.0, 5.0), Vec3::new(1.0, 0.0, 6.0));
        let dir = Vec3::new(0.0, -1.0, 1.0).normalize();
        // Enters through the top first when starting high
        let (_, n) = b.ray_entry(Vec3::new(0.0, 5.5, 0.0), dir, 100.0).unwrap();
        assert_eq!(n, Vec3::Y);
    }

    #[test]
    fn test_contains_and_top() {
        let b = unit_box_at(0.0);
        assert!(b.contains(Vec3::ZERO));
        assert!(!b.contains(Vec3::new(0.0, 1.0, 0.0)));
        assert!(b.contains_xz(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(
            b.closest_on_top(Vec3::new(3.0, 2.0, 0.2)),
            Vec3::new(0.5, 0.5, 0.2)
        );
    }
}
