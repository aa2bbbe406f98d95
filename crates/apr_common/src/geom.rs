//! Integer nanometer geometry: points and axis-aligned rectangles.

use std::ops::{Add, Sub};

/// A point in integer nanometers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Coord {
    /// X coordinate, nanometers.
    pub x: i64,
    /// Y coordinate, nanometers.
    pub y: i64,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The origin, `(0, 0)`.
    pub const ORIGIN: Coord = Coord::new(0, 0);

    /// Manhattan (L1) distance between two points.
    pub fn manhattan_distance(self, other: Coord) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Rotates the point by `degrees` (must be 0, 90, 180, or 270) around the
    /// origin, counter-clockwise.
    ///
    /// # Panics
    ///
    /// Panics if `degrees` is not one of `0, 90, 180, 270`.
    pub fn rotate(self, degrees: i32) -> Coord {
        match degrees.rem_euclid(360) {
            0 => self,
            90 => Coord::new(-self.y, self.x),
            180 => Coord::new(-self.x, -self.y),
            270 => Coord::new(self.y, -self.x),
            other => panic!("rotate: unsupported angle {other}, expected 0/90/180/270"),
        }
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle, lower-left and upper-right corners inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rect {
    /// Lower-left corner.
    pub ll: Coord,
    /// Upper-right corner.
    pub ur: Coord,
}

impl Rect {
    /// Creates a rectangle from its lower-left and upper-right corners.
    ///
    /// # Panics
    ///
    /// Panics if `ur` is not weakly greater than `ll` on both axes.
    pub fn new(ll: Coord, ur: Coord) -> Self {
        assert!(ur.x >= ll.x && ur.y >= ll.y, "Rect: ur must be >= ll");
        Self { ll, ur }
    }

    /// Width in nanometers.
    pub fn width(&self) -> i64 {
        self.ur.x - self.ll.x
    }

    /// Height in nanometers.
    pub fn height(&self) -> i64 {
        self.ur.y - self.ll.y
    }

    /// Area in square nanometers.
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Center point, rounded toward the lower-left on odd extents.
    pub fn center(&self) -> Coord {
        Coord::new(
            self.ll.x + self.width() / 2,
            self.ll.y + self.height() / 2,
        )
    }

    /// Translates the rectangle by `delta`.
    pub fn translate(&self, delta: Coord) -> Rect {
        Rect::new(self.ll + delta, self.ur + delta)
    }

    /// Expands the rectangle outward by `margin` on every side.
    ///
    /// A negative margin shrinks the rectangle; the result is clamped so it
    /// never inverts (width/height floor at zero).
    pub fn expand(&self, margin: i64) -> Rect {
        let ll = Coord::new(self.ll.x - margin, self.ll.y - margin);
        let mut ur = Coord::new(self.ur.x + margin, self.ur.y + margin);
        ur.x = ur.x.max(ll.x);
        ur.y = ur.y.max(ll.y);
        Rect::new(ll, ur)
    }

    /// `true` if `p` lies within the rectangle, inclusive of its boundary.
    pub fn contains_point(&self, p: Coord) -> bool {
        p.x >= self.ll.x && p.x <= self.ur.x && p.y >= self.ll.y && p.y <= self.ur.y
    }

    /// `true` if `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(other.ll) && self.contains_point(other.ur)
    }

    /// Returns the intersection of two rectangles, or `None` if they don't
    /// overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let ll = Coord::new(self.ll.x.max(other.ll.x), self.ll.y.max(other.ll.y));
        let ur = Coord::new(self.ur.x.min(other.ur.x), self.ur.y.min(other.ur.y));
        if ll.x <= ur.x && ll.y <= ur.y {
            Some(Rect::new(ll, ur))
        } else {
            None
        }
    }

    /// Minimum Manhattan distance from `p` to the rectangle (zero if `p` is
    /// inside or on the boundary).
    pub fn distance_to_point(&self, p: Coord) -> i64 {
        let dx = if p.x < self.ll.x {
            self.ll.x - p.x
        } else if p.x > self.ur.x {
            p.x - self.ur.x
        } else {
            0
        };
        let dy = if p.y < self.ll.y {
            self.ll.y - p.y
        } else if p.y > self.ur.y {
            p.y - self.ur.y
        } else {
            0
        };
        dx + dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_arithmetic() {
        let a = Coord::new(10, 20);
        let b = Coord::new(3, 4);
        assert_eq!(a + b, Coord::new(13, 24));
        assert_eq!(a - b, Coord::new(7, 16));
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Coord::new(0, 0).manhattan_distance(Coord::new(3, 4)), 7);
        assert_eq!(Coord::new(-1, -1).manhattan_distance(Coord::new(1, 1)), 4);
    }

    #[test]
    fn rotation() {
        let p = Coord::new(10, 0);
        assert_eq!(p.rotate(0), p);
        assert_eq!(p.rotate(90), Coord::new(0, 10));
        assert_eq!(p.rotate(180), Coord::new(-10, 0));
        assert_eq!(p.rotate(270), Coord::new(0, -10));
    }

    #[test]
    #[should_panic(expected = "unsupported angle")]
    fn rotation_rejects_arbitrary_angle() {
        Coord::new(1, 1).rotate(45);
    }

    #[test]
    fn rect_basic_metrics() {
        let r = Rect::new(Coord::new(0, 0), Coord::new(100, 50));
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
        assert_eq!(r.area(), 5000);
        assert_eq!(r.center(), Coord::new(50, 25));
    }

    #[test]
    fn rect_translate_and_expand() {
        let r = Rect::new(Coord::new(0, 0), Coord::new(10, 10));
        let t = r.translate(Coord::new(5, -5));
        assert_eq!(t, Rect::new(Coord::new(5, -5), Coord::new(15, 5)));

        let e = r.expand(2);
        assert_eq!(e, Rect::new(Coord::new(-2, -2), Coord::new(12, 12)));

        let shrunk = r.expand(-20);
        assert_eq!(shrunk.width(), 0);
        assert_eq!(shrunk.height(), 0);
    }

    #[test]
    fn contains_point_and_rect() {
        let r = Rect::new(Coord::new(0, 0), Coord::new(10, 10));
        assert!(r.contains_point(Coord::new(0, 0)));
        assert!(r.contains_point(Coord::new(10, 10)));
        assert!(!r.contains_point(Coord::new(11, 5)));

        let inner = Rect::new(Coord::new(2, 2), Coord::new(8, 8));
        assert!(r.contains_rect(&inner));
        assert!(!inner.contains_rect(&r));
    }

    #[test]
    fn intersection_overlapping_and_disjoint() {
        let a = Rect::new(Coord::new(0, 0), Coord::new(10, 10));
        let b = Rect::new(Coord::new(5, 5), Coord::new(15, 15));
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(Coord::new(5, 5), Coord::new(10, 10)));

        let c = Rect::new(Coord::new(20, 20), Coord::new(30, 30));
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn distance_to_point_clamped_manhattan() {
        let r = Rect::new(Coord::new(0, 0), Coord::new(10, 10));
        assert_eq!(r.distance_to_point(Coord::new(5, 5)), 0);
        assert_eq!(r.distance_to_point(Coord::new(-3, 5)), 3);
        assert_eq!(r.distance_to_point(Coord::new(13, 14)), 7);
    }
}
