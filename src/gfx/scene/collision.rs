//! Ground-plane footprint tests used to keep the camera out of solid models.
//!
//! Footprints live on the X/Z plane. A model's footprint is centred on its
//! world position, not on its mesh's geometric centre, so the test is only
//! accurate for meshes authored around their local origin.

use cgmath::{Vector2, Vector3};

use super::bounding_box::BoundingBox;

/// Axis-aligned rectangle on the X/Z plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// World (x, z) of the rectangle centre
    pub center: Vector2<f32>,
    /// Half of the rectangle's size along x and z
    pub half_extents: Vector2<f32>,
}

impl Footprint {
    pub fn new(center: Vector2<f32>, half_extents: Vector2<f32>) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Footprint of a mesh with bounds `bounds` placed at `position` with `scale`
    ///
    /// The scaled width and length give the full rectangle size. Mirrored
    /// (negative) scales cover the same rectangle as their positive twins.
    pub fn from_box(bounds: &BoundingBox, position: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self::new(
            Vector2::new(position.x, position.z),
            Vector2::new(
                (bounds.width() * scale.x / 2.0).abs(),
                (bounds.length() * scale.z / 2.0).abs(),
            ),
        )
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_extents.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_extents.x
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents.y
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Corners as (x, z): bottom-left, bottom-right, top-right, top-left
    pub fn corners(&self) -> [Vector2<f32>; 4] {
        [
            Vector2::new(self.left(), self.bottom()),
            Vector2::new(self.right(), self.bottom()),
            Vector2::new(self.right(), self.top()),
            Vector2::new(self.left(), self.top()),
        ]
    }

    /// Strict interior test; points on an edge are outside
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.left() < x && x < self.right() && self.bottom() < z && z < self.top()
    }

    /// Pulls (x, z) onto the closed rectangle
    ///
    /// Works for rectangles built with negative half extents too.
    pub fn clamp(&self, x: f32, z: f32) -> (f32, f32) {
        let (l, r) = (self.left(), self.right());
        let (b, t) = (self.bottom(), self.top());
        (x.max(l.min(r)).min(l.max(r)), z.max(b.min(t)).min(b.max(t)))
    }
}

/// True when the point lies inside any of `footprints`
pub fn collides_with_any<'a>(
    x: f32,
    z: f32,
    footprints: impl IntoIterator<Item = &'a Footprint>,
) -> bool {
    footprints.into_iter().any(|f| f.contains(x, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_at(x: f32, z: f32) -> Footprint {
        Footprint::new(Vector2::new(x, z), Vector2::new(0.5, 0.5))
    }

    #[test]
    fn test_center_collides() {
        let f = unit_square_at(3.0, -2.0);
        assert!(f.contains(3.0, -2.0));
    }

    #[test]
    fn test_edges_and_outside_do_not_collide() {
        let f = unit_square_at(0.0, 0.0);
        assert!(!f.contains(0.5, 0.0));
        assert!(!f.contains(0.0, -0.5));
        assert!(!f.contains(2.0, 2.0));
        assert!(!f.contains(0.0, 0.75));
    }

    #[test]
    fn test_from_box_scales_and_uses_world_position() {
        let bounds = BoundingBox::new(Vector3::new(2.0, 1.0, 3.0), 4.0, 2.0, 6.0);
        let f = Footprint::from_box(
            &bounds,
            Vector3::new(10.0, 5.0, -10.0),
            Vector3::new(0.5, 1.0, 2.0),
        );
        assert_eq!(f.center, Vector2::new(10.0, -10.0));
        assert_eq!(f.half_extents, Vector2::new(1.0, 6.0));
        assert_eq!(
            f.corners(),
            [
                Vector2::new(9.0, -16.0),
                Vector2::new(11.0, -16.0),
                Vector2::new(11.0, -4.0),
                Vector2::new(9.0, -4.0),
            ]
        );
    }

    #[test]
    fn test_clamp_keeps_inside_points() {
        let f = Footprint::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        assert_eq!(f.clamp(3.0, -4.0), (3.0, -4.0));
        assert_eq!(f.clamp(12.0, -40.0), (10.0, -10.0));
    }

    #[test]
    fn test_mirrored_scale_gives_positive_extents() {
        let bounds = BoundingBox::new(Vector3::new(2.0, 0.0, 2.0), 4.0, 0.0, 4.0);
        let f = Footprint::from_box(
            &bounds,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(-2.0, 1.0, -2.0),
        );
        assert_eq!(f.half_extents, Vector2::new(4.0, 4.0));
        assert!(f.contains(1.0, -1.0));
        assert_eq!(f.clamp(9.0, -9.0), (4.0, -4.0));
    }

    #[test]
    fn test_clamp_tolerates_inverted_rectangle() {
        let f = Footprint::new(Vector2::new(0.0, 0.0), Vector2::new(-3.0, -3.0));
        assert_eq!(f.clamp(5.0, -5.0), (3.0, -3.0));
        assert_eq!(f.clamp(1.0, 2.0), (1.0, 2.0));
    }

    #[test]
    fn test_any_of_several_footprints() {
        let footprints = [unit_square_at(0.0, 0.0), unit_square_at(5.0, 5.0)];
        assert!(collides_with_any(5.1, 4.9, &footprints));
        assert!(!collides_with_any(2.5, 2.5, &footprints));
        assert!(!collides_with_any(0.0, 0.0, &[]));
    }
}
