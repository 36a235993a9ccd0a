//! Axis-aligned 2D extent accumulated from a stream of points.

/// Sentinel used by [`BoundingBox::reset`]; any real point wins against it.
const BIG: f64 = 123456789.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub minimum_x: f64,
    pub minimum_y: f64,
    pub maximum_x: f64,
    pub maximum_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    /// Returns an empty (inverted) box.
    pub fn new() -> Self {
        let mut bounding_box = Self {
            minimum_x: 0.0,
            minimum_y: 0.0,
            maximum_x: 0.0,
            maximum_y: 0.0,
        };
        bounding_box.reset();
        bounding_box
    }

    pub fn reset(&mut self) {
        self.maximum_x = -BIG;
        self.minimum_x = BIG;
        self.maximum_y = -BIG;
        self.minimum_y = BIG;
    }

    pub fn update(&mut self, x: f64, y: f64) {
        self.maximum_x = self.maximum_x.max(x);
        self.minimum_x = self.minimum_x.min(x);
        self.maximum_y = self.maximum_y.max(y);
        self.minimum_y = self.minimum_y.min(y);
    }

    /// True until the first [`update`](Self::update) after a reset.
    pub fn is_empty(&self) -> bool {
        self.minimum_x > self.maximum_x || self.minimum_y > self.maximum_y
    }

    pub fn width(&self) -> f64 {
        self.maximum_x - self.minimum_x
    }

    pub fn height(&self) -> f64 {
        self.maximum_y - self.minimum_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_box_is_empty_with_sentinel_extents() {
        let b = BoundingBox::new();
        assert!(b.is_empty());
        assert_eq!(b.maximum_x, -BIG);
        assert_eq!(b.minimum_y, BIG);
    }

    #[test]
    fn first_update_wins_against_the_sentinel() {
        let mut b = BoundingBox::new();
        b.update(-3.5, 7.0);
        assert!(!b.is_empty());
        assert_eq!((b.minimum_x, b.maximum_x), (-3.5, -3.5));
        assert_eq!((b.minimum_y, b.maximum_y), (7.0, 7.0));
    }

    #[test]
    fn every_point_stays_inside() {
        let points = [(1.0, 2.0), (-4.0, 0.5), (3.25, -9.0), (0.0, 0.0), (2.0, 11.0)];
        let mut b = BoundingBox::new();
        for &(x, y) in &points {
            b.update(x, y);
        }
        for &(x, y) in &points {
            assert!(b.minimum_x <= x && x <= b.maximum_x);
            assert!(b.minimum_y <= y && y <= b.maximum_y);
        }
        assert_eq!(b.width(), 7.25);
        assert_eq!(b.height(), 20.0);
    }

    #[test]
    fn reset_empties_the_box_again() {
        let mut b = BoundingBox::new();
        b.update(1.0, 1.0);
        b.reset();
        assert!(b.is_empty());
    }
}
