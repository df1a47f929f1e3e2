//! Geometry primitives: [`Point`] and the half-open [`Range`] that grids
//! iterate over.
//!
//! X grows right, Y grows down. Points order row-major (`y` first), which is
//! the scan order of every full-map pass in the engine.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A map cell, or an offset between two cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `self + (dx, dy)`.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Unit step pointing the same way on each axis.
    #[inline]
    pub const fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum())
    }

    /// Chebyshev length: the number of king moves the offset spans.
    #[inline]
    pub const fn king_len(self) -> i32 {
        let (ax, ay) = (self.x.abs(), self.y.abs());
        if ax > ay { ax } else { ay }
    }

    /// Up, right, down, left.
    #[inline]
    pub const fn neighbors_4(self) -> [Point; 4] {
        [
            self.shift(0, -1),
            self.shift(1, 0),
            self.shift(0, 1),
            self.shift(-1, 0),
        ]
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.shift(rhs.x, rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.shift(-rhs.x, -rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// Cells with `min.x <= x < max.x` and `min.y <= y < max.y`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    #[inline]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// `[0, width) × [0, height)`.
    #[inline]
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(Point::ZERO, Point::new(width, height))
    }

    #[inline]
    pub fn width(self) -> i32 {
        (self.max.x - self.min.x).max(0)
    }

    #[inline]
    pub fn height(self) -> i32 {
        (self.max.y - self.min.y).max(0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Row-major walk over the cells.
    #[inline]
    pub fn iter(self) -> RangeIter {
        let left = if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        };
        RangeIter {
            range: self,
            next: self.min,
            left,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Row-major iterator over a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: Point,
    left: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        let p = self.next;
        self.next.x += 1;
        if self.next.x == self.range.max.x {
            self.next = Point::new(self.range.min.x, self.next.y + 1);
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl ExactSizeIterator for RangeIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_and_order() {
        let a = Point::new(1, 2);
        let b = Point::new(3, -4);
        assert_eq!(a + b, Point::new(4, -2));
        assert_eq!(a - b, Point::new(-2, 6));
        assert_eq!(-(a * 2), Point::new(-2, -4));
        assert_eq!((b - a).signum(), Point::new(1, -1));
        assert_eq!((b - a).king_len(), 6);

        let mut pts = vec![Point::new(2, 1), Point::new(0, 1), Point::new(5, 0)];
        pts.sort();
        assert_eq!(pts, vec![Point::new(5, 0), Point::new(0, 1), Point::new(2, 1)]);
    }

    #[test]
    fn neighbours_go_clockwise_from_up() {
        let n = Point::new(4, 4).neighbors_4();
        assert_eq!(n[0], Point::new(4, 3));
        assert_eq!(n[3], Point::new(3, 4));
    }

    #[test]
    fn range_walk() {
        let r = Range::new(Point::new(1, 1), Point::new(4, 3));
        assert!(r.contains(Point::new(3, 2)));
        assert!(!r.contains(Point::new(4, 2)));
        let pts: Vec<Point> = r.iter().collect();
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[3], Point::new(1, 2));
        assert_eq!(r.iter().len(), 6);
    }

    #[test]
    fn empty_ranges_yield_nothing() {
        assert_eq!(Range::sized(0, 5).iter().count(), 0);
        assert_eq!(Range::new(Point::new(3, 3), Point::new(1, 5)).iter().count(), 0);
        assert!(Range::default().is_empty());
    }
}
