use cgmath::{Vector3, Zero};

/// Axis-aligned extent of a point set
///
/// `center` holds half of each extent, measured from the minimum corner. It is
/// a size proxy rather than a world-space point; footprint sizing relies on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    center: Vector3<f32>,
    width: f32,
    height: f32,
    length: f32,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vector3::zero(), 0.0, 0.0, 0.0)
    }
}

impl BoundingBox {
    pub fn new(center: Vector3<f32>, width: f32, height: f32, length: f32) -> Self {
        Self {
            center,
            width,
            height,
            length,
        }
    }

    /// Builds the box from per-axis minimum and maximum of `positions`
    ///
    /// An empty slice yields the zero box.
    pub fn from_positions(positions: &[Vector3<f32>]) -> Self {
        let Some(first) = positions.first() else {
            return Self::default();
        };

        let (min, max) = positions.iter().skip(1).fold((*first, *first), |(min, max), p| {
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });

        let width = max.x - min.x;
        let height = max.y - min.y;
        let length = max.z - min.z;

        Self::new(
            Vector3::new(width / 2.0, height / 2.0, length / 2.0),
            width,
            height,
            length,
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    /// Extent along X
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent along Y
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Extent along Z
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0 && self.length == 0.0
    }
}
