//! Floor-plane geometry types.

/// Floor coordinates of the map, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloorSpace;

pub type Point = euclid::Point2D<f64, FloorSpace>;
pub type Vector = euclid::Vector2D<f64, FloorSpace>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Absolute floor pose: position of a tag (or the camera) and its twist from the floor X axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub twist: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, twist: f64) -> Self {
        Self { x, y, twist }
    }

    pub fn position(&self) -> Point {
        point(self.x, self.y)
    }

    /// The point `distance` away from this pose along absolute `bearing`.
    pub fn project(&self, bearing: f64, distance: f64) -> Point {
        self.position() + Vector::from_angle_and_length(euclid::Angle::radians(bearing), distance)
    }
}
