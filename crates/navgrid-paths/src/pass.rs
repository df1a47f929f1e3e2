//! Pass grid construction: the largest collision size that fits on each
//! cell for one move type.

use navgrid_core::{Grid, MoveType, Point};

use crate::range::{PathFindRange, grow};
use crate::store::{ObstacleCell, PassGrid};
use crate::types::CollisionSize;

/// Everything a pass grid is computed from.
#[derive(Copy, Clone)]
pub(crate) struct PassBuilder<'a> {
    pub(crate) obstacles: &'a Grid<ObstacleCell>,
    /// Ascending.
    pub(crate) sizes: &'a [CollisionSize],
    pub(crate) footprints: &'a [PathFindRange],
}

impl PassBuilder<'_> {
    /// Whether every cell of `footprint` around `p` is in the map and
    /// walkable for `move_type`.
    fn fits(&self, move_type: MoveType, footprint: PathFindRange, p: Point) -> bool {
        footprint.offset(p).iter().all(|c| {
            self.obstacles
                .get(c)
                .is_some_and(|cell| move_type.can_traverse(cell.terrain))
        })
    }

    /// Largest size whose footprint fits at `p`, scanning largest first.
    pub(crate) fn fit(&self, move_type: MoveType, p: Point) -> Option<CollisionSize> {
        self.sizes
            .iter()
            .zip(self.footprints)
            .rev()
            .find(|&(_, &fp)| self.fits(move_type, fp, p))
            .map(|(&s, _)| s)
    }

    pub(crate) fn build(&self, move_type: MoveType, grid: &mut PassGrid) {
        *grid = Grid::from_fn(self.obstacles.width(), self.obstacles.height(), |p| {
            self.fit(move_type, p)
        });
    }

    /// Recompute the cells of `range`. Returns, per size index, the bounding
    /// box of cells whose passability for that size changed.
    pub(crate) fn rebuild(
        &self,
        move_type: MoveType,
        grid: &mut PassGrid,
        range: PathFindRange,
    ) -> Vec<Option<PathFindRange>> {
        let mut changed = vec![None; self.sizes.len()];
        for p in range.iter() {
            let Some(cell) = grid.get_mut(p) else {
                continue;
            };
            let old = *cell;
            let new = self.fit(move_type, p);
            if old == new {
                continue;
            }
            *cell = new;
            for (s, &size) in self.sizes.iter().enumerate() {
                if (old >= Some(size)) != (new >= Some(size)) {
                    grow(&mut changed[s], p);
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navgrid_core::TerrainMask;

    const LAND: TerrainMask = TerrainMask(1);
    const WALKER: MoveType = MoveType(1);

    fn obstacles(w: i32, h: i32, blocked: &[Point]) -> Grid<ObstacleCell> {
        Grid::from_fn(w, h, |p| ObstacleCell {
            terrain: if blocked.contains(&p) { TerrainMask::NONE } else { LAND },
            owner: None,
        })
    }

    #[test]
    fn largest_fitting_size() {
        let obs = obstacles(7, 7, &[Point::new(5, 5)]);
        let sizes = [CollisionSize(0), CollisionSize(1)];
        let fps = [PathFindRange::square(0), PathFindRange::square(1)];
        let b = PassBuilder {
            obstacles: &obs,
            sizes: &sizes,
            footprints: &fps,
        };
        let mut grid = Grid::new(7, 7, None);
        b.build(WALKER, &mut grid);
        assert_eq!(grid.at(Point::new(2, 2)), Some(Some(CollisionSize(1))));
        // the big footprint would leave the map
        assert_eq!(grid.at(Point::new(0, 3)), Some(Some(CollisionSize(0))));
        // touches the blocked cell
        assert_eq!(grid.at(Point::new(4, 4)), Some(Some(CollisionSize(0))));
        assert_eq!(grid.at(Point::new(5, 5)), Some(None));
        assert_eq!(b.fit(MoveType(2), Point::new(2, 2)), None);
    }

    #[test]
    fn rebuild_reports_changes_per_size() {
        let mut obs = obstacles(7, 7, &[]);
        let sizes = [CollisionSize(0), CollisionSize(1)];
        let fps = [PathFindRange::square(0), PathFindRange::square(1)];
        let mut grid = Grid::new(7, 7, None);
        PassBuilder {
            obstacles: &obs,
            sizes: &sizes,
            footprints: &fps,
        }
        .build(WALKER, &mut grid);

        obs.set(
            Point::new(3, 3),
            ObstacleCell {
                terrain: TerrainMask::NONE,
                owner: None,
            },
        );
        let b = PassBuilder {
            obstacles: &obs,
            sizes: &sizes,
            footprints: &fps,
        };
        let changed = b.rebuild(WALKER, &mut grid, PathFindRange::point(Point::new(3, 3)).inflate(1));
        assert_eq!(changed[0], Some(PathFindRange::point(Point::new(3, 3))));
        assert_eq!(
            changed[1],
            Some(PathFindRange::new(Point::new(2, 2), Point::new(4, 4)))
        );
        let mut fresh = Grid::new(7, 7, None);
        b.build(WALKER, &mut fresh);
        assert_eq!(grid, fresh);
    }
}
