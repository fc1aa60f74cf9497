//! Axis-aligned regions used by the quadtree

use particle_physics::Vector2D;

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Canvas coordinates: `y` grows downwards, so `top() < bottom()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding square of a circle
    pub fn around_circle(center: Vector2D, radius: f64) -> Self {
        Self::new(center.x - radius, center.y - radius, 2.0 * radius, 2.0 * radius)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// `other` lies inside this rectangle (edges inclusive)
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_and_center() {
        let r = Rectangle::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center(), Vector2D::new(60.0, 45.0));
    }

    #[test]
    fn test_around_circle() {
        let r = Rectangle::around_circle(Vector2D::new(5.0, 5.0), 2.0);
        assert_eq!(r, Rectangle::new(3.0, 3.0, 4.0, 4.0));
    }

    #[test]
    fn test_contains() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rectangle::new(10.0, 10.0, 20.0, 20.0);
        let straddling = Rectangle::new(90.0, 90.0, 20.0, 20.0);

        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&straddling));
        assert!(!inner.contains(&outer));
    }
}
