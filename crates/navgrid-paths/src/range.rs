use std::fmt;

use navgrid_core::{Point, Range};

/// An inclusive axis-aligned box `[min, max]`.
///
/// Used as a search boundary, as a dirty range for incremental maintenance,
/// and as a collision footprint when `min`/`max` are offsets from a centre.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathFindRange {
    pub min: Point,
    pub max: Point,
}

impl PathFindRange {
    /// Box spanning two corners, canonicalized so that `min` ≤ `max`.
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Single-cell box.
    #[inline]
    pub const fn point(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Footprint of `radius` cells around the origin.
    #[inline]
    pub const fn square(radius: i32) -> Self {
        Self {
            min: Point::new(-radius, -radius),
            max: Point::new(radius, radius),
        }
    }

    /// Box covering the whole `width` × `height` map.
    #[inline]
    pub const fn map(width: i32, height: i32) -> Self {
        Self {
            min: Point::new(0, 0),
            max: Point::new(width - 1, height - 1),
        }
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x + 1
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y + 1
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether `other` lies entirely inside `self`.
    #[inline]
    pub fn contains_range(self, other: PathFindRange) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Grow the box to cover `p`.
    #[inline]
    pub fn include(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    /// Smallest box covering both.
    #[inline]
    pub fn union(self, other: PathFindRange) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Box grown by `n` cells on every side.
    #[inline]
    pub fn inflate(self, n: i32) -> Self {
        Self {
            min: self.min.shift(-n, -n),
            max: self.max.shift(n, n),
        }
    }

    /// Overlap of two boxes, if any.
    #[inline]
    pub fn intersect(self, other: PathFindRange) -> Option<Self> {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        (r.min.x <= r.max.x && r.min.y <= r.max.y).then_some(r)
    }

    /// The part of the box inside a `width` × `height` map.
    #[inline]
    pub fn clip(self, width: i32, height: i32) -> Option<Self> {
        self.intersect(Self::map(width, height))
    }

    /// Footprint offsets placed around `center`.
    #[inline]
    pub fn offset(self, center: Point) -> Self {
        Self {
            min: self.min + center,
            max: self.max + center,
        }
    }

    /// Equivalent half-open [`Range`].
    #[inline]
    pub fn to_range(self) -> Range {
        Range {
            min: self.min,
            max: self.max.shift(1, 1),
        }
    }

    /// Row-major iterator over every point in the box.
    #[inline]
    pub fn iter(self) -> navgrid_core::RangeIter {
        self.to_range().iter()
    }
}

impl fmt::Display for PathFindRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.min, self.max)
    }
}

/// Grow an optional bounding box to cover `p`.
#[inline]
pub(crate) fn grow(bbox: &mut Option<PathFindRange>, p: Point) {
    match bbox {
        Some(b) => b.include(p),
        None => *bbox = Some(PathFindRange::point(p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_bounds() {
        let r = PathFindRange::new(Point::new(3, 4), Point::new(1, 2));
        assert_eq!(r.min, Point::new(1, 2));
        assert_eq!(r.max, Point::new(3, 4));
        assert_eq!(r.width(), 3);
        assert!(r.contains(Point::new(3, 4)));
        assert!(!r.contains(Point::new(4, 4)));
        assert_eq!(r.iter().count(), 9);
    }

    #[test]
    fn clip_and_intersect() {
        let r = PathFindRange::new(Point::new(-2, -2), Point::new(1, 1));
        assert_eq!(
            r.clip(5, 5),
            Some(PathFindRange::new(Point::new(0, 0), Point::new(1, 1)))
        );
        let far = PathFindRange::point(Point::new(9, 9));
        assert_eq!(far.clip(5, 5), None);
        assert_eq!(r.intersect(far), None);
    }

    #[test]
    fn footprint_offset_and_inflate() {
        let fp = PathFindRange::square(1);
        let placed = fp.offset(Point::new(5, 5));
        assert_eq!(placed.min, Point::new(4, 4));
        assert_eq!(placed.max, Point::new(6, 6));
        assert_eq!(placed.inflate(1), PathFindRange::new(Point::new(3, 3), Point::new(7, 7)));
        assert!(placed.inflate(1).contains_range(placed));
    }

    #[test]
    fn grow_builds_bbox() {
        let mut bbox = None;
        grow(&mut bbox, Point::new(4, 1));
        grow(&mut bbox, Point::new(2, 6));
        assert_eq!(bbox, Some(PathFindRange::new(Point::new(2, 1), Point::new(4, 6))));
    }
}
