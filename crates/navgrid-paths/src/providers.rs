//! Data sources the engine reads at construction time: terrain and
//! collision footprints.

use navgrid_core::{Grid, Point, TerrainMask};

use crate::range::PathFindRange;
use crate::types::CollisionSize;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Base terrain of the map.
pub trait TerrainProvider {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// Terrain bits of an in-map cell.
    fn terrain(&self, p: Point) -> TerrainMask;
}

/// Terrain stored in a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainGrid {
    grid: Grid<TerrainMask>,
}

impl TerrainGrid {
    /// A `width` × `height` map filled with `fill`.
    pub fn new(width: i32, height: i32, fill: TerrainMask) -> Self {
        Self {
            grid: Grid::new(width, height, fill),
        }
    }

    /// Parse an ASCII drawing, one row per line. Leading and trailing blank
    /// lines are ignored, and so is indentation common to all rows. Short
    /// rows are padded with [`TerrainMask::NONE`].
    ///
    /// ```
    /// use navgrid_core::{Point, TerrainMask};
    /// use navgrid_paths::{TerrainGrid, TerrainProvider};
    ///
    /// let t = TerrainGrid::from_ascii(
    ///     "
    ///     ..#
    ///     ...
    ///     ",
    ///     |c| if c == '#' { TerrainMask::NONE } else { TerrainMask(1) },
    /// );
    /// assert_eq!((t.width(), t.height()), (3, 2));
    /// assert!(t.terrain(Point::new(2, 0)).is_empty());
    /// ```
    pub fn from_ascii(text: &str, legend: impl Fn(char) -> TerrainMask) -> Self {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let end = rows
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        let rows = &rows[..end];
        let indent = rows
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        let rows: Vec<Vec<char>> = rows
            .iter()
            .map(|l| l.chars().skip(indent).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as i32;
        let height = rows.len() as i32;
        let grid = Grid::from_fn(width, height, |p| {
            rows[p.y as usize]
                .get(p.x as usize)
                .map_or(TerrainMask::NONE, |&c| legend(c))
        });
        Self { grid }
    }

    /// Overwrite the terrain of one cell.
    pub fn set(&mut self, p: Point, terrain: TerrainMask) -> bool {
        self.grid.set(p, terrain)
    }
}

impl TerrainProvider for TerrainGrid {
    fn width(&self) -> i32 {
        self.grid.width()
    }

    fn height(&self) -> i32 {
        self.grid.height()
    }

    fn terrain(&self, p: Point) -> TerrainMask {
        self.grid.at(p).unwrap_or(TerrainMask::NONE)
    }
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

/// Collision sizes and their footprints.
pub trait CollisionProvider {
    /// Every configured size.
    fn sizes(&self) -> Vec<CollisionSize>;

    /// Footprint offsets of `size` relative to the agent's cell, or `None`
    /// for an unknown size.
    fn footprint(&self, size: CollisionSize) -> Option<PathFindRange>;

    /// Largest of several sizes. Its footprint bounds how far a terrain
    /// change can move the pass grid.
    fn max_of(&self, sizes: &[CollisionSize]) -> Option<CollisionSize> {
        sizes.iter().copied().max()
    }
}

/// A fixed list of `(size, footprint)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootprintTable {
    entries: Vec<(CollisionSize, PathFindRange)>,
}

impl FootprintTable {
    pub fn new(entries: impl IntoIterator<Item = (CollisionSize, PathFindRange)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Square footprints: size `i` covers `radii[i]` cells around the agent.
    pub fn squares(radii: &[i32]) -> Self {
        Self::new(
            radii
                .iter()
                .enumerate()
                .map(|(i, &r)| (CollisionSize(i as u8), PathFindRange::square(r))),
        )
    }
}

impl CollisionProvider for FootprintTable {
    fn sizes(&self) -> Vec<CollisionSize> {
        self.entries.iter().map(|&(s, _)| s).collect()
    }

    fn footprint(&self, size: CollisionSize) -> Option<PathFindRange> {
        self.entries
            .iter()
            .find(|&&(s, _)| s == size)
            .map(|&(_, fp)| fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_terrain() {
        let t = TerrainGrid::from_ascii(
            "
            #..
            .#
            ",
            |c| match c {
                '#' => TerrainMask::NONE,
                _ => TerrainMask(1),
            },
        );
        assert_eq!(t.width(), 3);
        assert_eq!(t.height(), 2);
        assert!(t.terrain(Point::new(0, 0)).is_empty());
        assert_eq!(t.terrain(Point::new(1, 0)), TerrainMask(1));
        // padded
        assert!(t.terrain(Point::new(2, 1)).is_empty());
        assert!(t.terrain(Point::new(9, 9)).is_empty());
    }

    #[test]
    fn footprint_lookup() {
        let table = FootprintTable::squares(&[0, 1]);
        assert_eq!(table.sizes(), vec![CollisionSize(0), CollisionSize(1)]);
        assert_eq!(
            table.footprint(CollisionSize(1)),
            Some(PathFindRange::square(1))
        );
        assert_eq!(table.footprint(CollisionSize(5)), None);
        assert_eq!(
            table.max_of(&[CollisionSize(1), CollisionSize(0)]),
            Some(CollisionSize(1))
        );
    }
}
