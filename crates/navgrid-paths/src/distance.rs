use navgrid_core::Point;

/// Cost of one straight (cardinal) step.
pub const STRAIGHT_COST: i32 = 10;

/// Cost of one diagonal step.
pub const DIAGONAL_COST: i32 = 14;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a - b).king_len()
}

/// Octile distance: 14 per diagonal step, 10 per remaining straight step.
#[inline]
pub fn octile(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diag = dx.min(dy);
    DIAGONAL_COST * diag + STRAIGHT_COST * (dx.max(dy) - diag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Point::new(0, 0);
        let b = Point::new(3, -7);
        assert_eq!(manhattan(a, b), 10);
        assert_eq!(chebyshev(a, b), 7);
        assert_eq!(octile(a, b), 3 * 14 + 4 * 10);
        assert_eq!(octile(b, a), octile(a, b));
        assert_eq!(octile(a, Point::new(9, 9)), 9 * 14);
    }
}
