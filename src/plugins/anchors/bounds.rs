use bevy::{prelude::*, reflect::FromReflect};

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, FromReflect)]
/// World space axis aligned bounding box.
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(a: Vec3, b: Vec3) -> Bounds {
        Bounds {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Bounds {
        let half_extents = half_extents.abs();
        Bounds {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Two boxes intersect unless they are fully separated on at least one axis. Touching faces
    /// count as an intersection.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// The 12 edges of the box, for debug drawing.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let (a, b) = (self.min, self.max);
        let corners = [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ];
        [
            // Bottom face
            (corners[0], corners[1]),
            (corners[1], corners[2]),
            (corners[2], corners[3]),
            (corners[3], corners[0]),
            // Top face
            (corners[4], corners[5]),
            (corners[5], corners[6]),
            (corners[6], corners[7]),
            (corners[7], corners[4]),
            // Verticals
            (corners[0], corners[4]),
            (corners[1], corners[5]),
            (corners[2], corners[6]),
            (corners[3], corners[7]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = Bounds::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::from_center_half_extents(Vec3::new(1.5, 0.5, -0.5), Vec3::ONE);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_separation_on_a_single_axis() {
        let a = Bounds::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        // Overlaps on x and y, separated on z only
        let b = Bounds::from_center_half_extents(Vec3::new(0.5, 0.5, 5.0), Vec3::ONE);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_touching_faces_intersect() {
        let a = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_contained_box_intersects() {
        let zone = Bounds::from_center_half_extents(Vec3::ZERO, Vec3::splat(10.0));
        let inner = Bounds::from_center_half_extents(Vec3::new(3.0, 0.0, 3.0), Vec3::splat(0.5));
        assert!(zone.intersects(&inner));
        assert!(inner.intersects(&zone));
    }

    #[test]
    fn test_new_orders_corners() {
        let b = Bounds::new(Vec3::new(2.0, -1.0, 3.0), Vec3::new(-2.0, 1.0, 0.0));
        assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(b.center(), Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(b.half_extents(), Vec3::new(2.0, 1.0, 1.5));
    }
}
