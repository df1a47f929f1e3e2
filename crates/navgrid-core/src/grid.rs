//! [`Grid`]: a dense, row-major 2D array addressed by [`Point`].
//!
//! Unlike a shared-buffer view, a `Grid<T>` owns its cells outright so that
//! independent grids can be handed to different worker threads.

use crate::geom::{Point, Range};

/// A dense 2D grid of `T` values anchored at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
}

impl<T: Clone> Grid<T> {
    /// Create a `width` × `height` grid with every cell set to `fill`.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            cells: vec![fill; (w as usize) * (h as usize)],
            width: w,
            height: h,
        }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        for c in self.cells.iter_mut() {
            *c = value.clone();
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f` at every point, row-major.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(Point) -> T) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        let cells = Range::sized(w, h).iter().map(&mut f).collect();
        Self {
            cells,
            width: w,
            height: h,
        }
    }

    /// Width of the grid.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the grid.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Every cell of the grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Flat row-major index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y as usize) * (self.width as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// Point at a flat row-major index.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let w = self.width.max(1) as usize;
        Point::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Borrow the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Mutably borrow the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        let i = self.index(p)?;
        Some(&mut self.cells[i])
    }

    /// Replace the cell at `p`. Returns `false` (and does nothing) if out of
    /// bounds.
    #[inline]
    pub fn set(&mut self, p: Point, value: T) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// All cells in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Iterate over `(Point, &T)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (self.point(i), c))
    }
}

impl<T: Copy> Grid<T> {
    /// Copy of the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<T> {
        self.get(p).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_size() {
        let g = Grid::new(10, 5, 0u8);
        assert_eq!(g.bounds().iter().len(), 50);
        assert_eq!(g.width(), 10);
        assert_eq!(g.height(), 5);
        assert_eq!(g.as_slice().len(), 50);
    }

    #[test]
    fn test_set_and_at() {
        let mut g = Grid::new(4, 4, 0i32);
        let p = Point::new(2, 3);
        assert!(g.set(p, 42));
        assert_eq!(g.at(p), Some(42));
        assert_eq!(g.at(Point::new(0, 0)), Some(0));
        assert_eq!(g.at(Point::new(10, 10)), None);
        assert_eq!(g.at(Point::new(-1, 0)), None);
        assert!(!g.set(Point::new(4, 0), 1));
    }

    #[test]
    fn test_index_point_round_trip() {
        let g = Grid::new(7, 3, ());
        for p in g.bounds() {
            let i = g.index(p).unwrap();
            assert_eq!(g.point(i), p);
        }
    }

    #[test]
    fn test_from_fn() {
        let g = Grid::from_fn(5, 5, |p| p.x == p.y);
        assert_eq!(g.iter().filter(|&(_, &c)| c).count(), 5);
        assert_eq!(g.at(Point::new(3, 3)), Some(true));
        assert_eq!(g.at(Point::new(3, 2)), Some(false));
    }

    #[test]
    fn test_fill_and_iter() {
        let mut g = Grid::new(3, 2, 0u8);
        g.fill(7);
        g.set(Point::new(1, 0), 5);
        let items: Vec<_> = g.iter().map(|(p, &c)| (p, c)).collect();
        assert_eq!(items.len(), 6);
        assert_eq!(items[1], (Point::new(1, 0), 5));
        assert_eq!(items[5], (Point::new(2, 1), 7));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn grid_round_trip() {
        let g = Grid::from_fn(3, 2, |p| p.x * 10 + p.y);
        let json = serde_json::to_string(&g).unwrap();
        let back: Grid<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.at(Point::new(2, 1)), Some(21));
    }
}
