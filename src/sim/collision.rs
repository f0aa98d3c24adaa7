//! Collision detection between the player car and road obstacles
//!
//! Everything on the road is an axis-aligned box, so a collision is three
//! interval overlaps. The test shrinks the combined extents so that a graze
//! along an edge does not count as a hit.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box described by its center and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    /// Full width/height/depth
    pub size: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    /// Overlap test with both boxes scaled toward their centers by `shrink`
    ///
    /// `shrink` of 1.0 is an exact overlap test. Touching faces never overlap.
    pub fn overlaps_shrunk(&self, other: &Aabb, shrink: f32) -> bool {
        let dist = (self.center - other.center).abs();
        let reach = (self.half_extents() + other.half_extents()) * shrink;
        dist.x < reach.x && dist.y < reach.y && dist.z < reach.z
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_shrunk(other, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Vec3::new(x, y, z), Vec3::ONE)
    }

    #[test]
    fn test_overlap_requires_all_axes() {
        let a = unit_at(0.0, 0.0, 0.0);
        assert!(a.overlaps(&unit_at(0.5, 0.5, 0.5)));
        // Overlapping on x and y but separated on z
        assert!(!a.overlaps(&unit_at(0.5, 0.5, 2.0)));
        // Overlapping on y and z but separated on x
        assert!(!a.overlaps(&unit_at(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_touching_faces_do_not_overlap() {
        let a = unit_at(0.0, 0.0, 0.0);
        assert!(!a.overlaps(&unit_at(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_shrink_forgives_near_miss() {
        let a = unit_at(0.0, 0.0, 0.0);
        // Combined half extents are 1.0; 0.9 apart overlaps exactly...
        let b = unit_at(0.9, 0.0, 0.0);
        assert!(a.overlaps(&b));
        // ...but not once both boxes are shrunk to 85%
        assert!(!a.overlaps_shrunk(&b, 0.85));
        assert!(a.overlaps_shrunk(&unit_at(0.8, 0.0, 0.0), 0.85));
    }
}
