//! The grid state store: base terrain, obstacles, moveable occupancy,
//! portals and the per-layer derived grids, plus the point predicates the
//! searches are built on.

use std::collections::BTreeMap;

use navgrid_core::{Grid, MoveType, Point, TerrainMask};

use crate::area::{AreaGrid, AreaId};
use crate::config::NavConfig;
use crate::error::NavError;
use crate::jump::JumpTable;
use crate::path::straight_arrive;
use crate::providers::{CollisionProvider, TerrainProvider};
use crate::range::PathFindRange;
use crate::types::{CollisionSize, EntityId};

/// Largest accepted map side, so that jump distances fit in a `u16`.
pub const MAX_MAP_SIDE: i32 = u16::MAX as i32;

/// Effective terrain of a cell and the obstacle that set it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ObstacleCell {
    pub(crate) terrain: TerrainMask,
    pub(crate) owner: Option<EntityId>,
}

/// A free link between `start` and `end`, usable both ways.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portal {
    pub owner: EntityId,
    pub start: Point,
    pub end: Point,
}

impl Portal {
    /// The endpoint across the link from `p`.
    #[inline]
    pub fn other(&self, p: Point) -> Point {
        if p == self.start { self.end } else { self.start }
    }
}

/// Every portal is keyed at both of its endpoints.
pub(crate) type PortalMap = BTreeMap<Point, Portal>;

/// Largest fitting collision size of every cell, for one move type.
pub(crate) type PassGrid = Grid<Option<CollisionSize>>;

/// A pass grid seen through one collision size.
#[derive(Copy, Clone)]
pub(crate) struct PassView<'a> {
    grid: &'a PassGrid,
    size: CollisionSize,
}

impl<'a> PassView<'a> {
    pub(crate) fn new(grid: &'a PassGrid, size: CollisionSize) -> Self {
        Self { grid, size }
    }

    /// Whether an agent of the view's size fits at `p`. False off the map.
    #[inline]
    pub(crate) fn passable(&self, p: Point) -> bool {
        matches!(self.grid.at(p), Some(Some(s)) if s >= self.size)
    }

    #[inline]
    pub(crate) fn width(&self) -> i32 {
        self.grid.width()
    }

    #[inline]
    pub(crate) fn height(&self) -> i32 {
        self.grid.height()
    }
}

/// Derived grids of one `(move type, collision size)` pair.
#[derive(Debug, Clone)]
pub(crate) struct Layer {
    pub(crate) move_index: usize,
    pub(crate) size_index: usize,
    pub(crate) size: CollisionSize,
    pub(crate) areas: AreaGrid,
    pub(crate) jumps: JumpTable,
}

#[derive(Debug, Clone)]
pub(crate) struct GridStore {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) base: Grid<TerrainMask>,
    pub(crate) obstacles: Grid<ObstacleCell>,
    /// Occupancy per move group.
    pub(crate) moveables: Vec<Grid<Option<EntityId>>>,
    pub(crate) move_types: Vec<MoveType>,
    /// Move group of each move type.
    pub(crate) group_of: Vec<usize>,
    /// Ascending.
    pub(crate) sizes: Vec<CollisionSize>,
    pub(crate) footprints: Vec<PathFindRange>,
    /// Footprint of the largest size, always holding the origin.
    pub(crate) reach: PathFindRange,
    /// Pass grid per move type.
    pub(crate) pass: Vec<PassGrid>,
    /// Indexed by `move_index * sizes.len() + size_index`.
    pub(crate) layers: Vec<Layer>,
    pub(crate) portals: PortalMap,
}

impl GridStore {
    pub(crate) fn new(
        terrain: &impl TerrainProvider,
        collision: &impl CollisionProvider,
        config: &NavConfig,
    ) -> Result<Self, NavError> {
        let (width, height) = (terrain.width(), terrain.height());
        if !(1..=MAX_MAP_SIDE).contains(&width) || !(1..=MAX_MAP_SIDE).contains(&height) {
            return Err(NavError::InvalidMapSize { width, height });
        }

        let mut sizes = collision.sizes();
        if sizes.is_empty() {
            return Err(NavError::NoCollisionSizes);
        }
        sizes.sort_unstable();
        if let Some(w) = sizes.windows(2).find(|w| w[0] == w[1]) {
            return Err(NavError::DuplicateCollisionSize(w[0]));
        }
        let footprints = sizes
            .iter()
            .map(|&s| collision.footprint(s).ok_or(NavError::MissingFootprint(s)))
            .collect::<Result<Vec<_>, _>>()?;
        for i in 1..sizes.len() {
            if !footprints[i].contains_range(footprints[i - 1]) {
                return Err(NavError::FootprintNotNested {
                    smaller: sizes[i - 1],
                    larger: sizes[i],
                });
            }
        }
        let largest = collision.max_of(&sizes).ok_or(NavError::NoCollisionSizes)?;
        let reach = collision
            .footprint(largest)
            .ok_or(NavError::MissingFootprint(largest))?
            .union(PathFindRange::point(Point::ZERO));

        let mut move_types = Vec::new();
        let mut group_of = Vec::new();
        for (g, group) in config.move_groups.iter().enumerate() {
            for &mt in &group.move_types {
                if move_types.contains(&mt) {
                    return Err(NavError::DuplicateMoveType(mt));
                }
                move_types.push(mt);
                group_of.push(g);
            }
        }
        if move_types.is_empty() {
            return Err(NavError::NoMoveTypes);
        }

        let base = Grid::from_fn(width, height, |p| terrain.terrain(p));
        let obstacles = Grid::from_fn(width, height, |p| ObstacleCell {
            terrain: base.at(p).unwrap_or(TerrainMask::NONE),
            owner: None,
        });
        let mut layers = Vec::with_capacity(move_types.len() * sizes.len());
        for m in 0..move_types.len() {
            for (s, &size) in sizes.iter().enumerate() {
                layers.push(Layer {
                    move_index: m,
                    size_index: s,
                    size,
                    areas: AreaGrid::new(width, height),
                    jumps: JumpTable::new(width, height),
                });
            }
        }

        Ok(Self {
            width,
            height,
            base,
            obstacles,
            moveables: vec![Grid::new(width, height, None); config.move_groups.len()],
            pass: vec![Grid::new(width, height, None); move_types.len()],
            move_types,
            group_of,
            sizes,
            footprints,
            reach,
            layers,
            portals: PortalMap::new(),
        })
    }

    #[inline]
    pub(crate) fn in_map(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    pub(crate) fn move_index(&self, move_type: MoveType) -> Option<usize> {
        self.move_types.iter().position(|&m| m == move_type)
    }

    pub(crate) fn size_index(&self, size: CollisionSize) -> Option<usize> {
        self.sizes.binary_search(&size).ok()
    }

    pub(crate) fn layer_index(&self, move_type: MoveType, size: CollisionSize) -> Option<usize> {
        Some(self.move_index(move_type)? * self.sizes.len() + self.size_index(size)?)
    }

    pub(crate) fn pass_view(&self, layer: usize) -> PassView<'_> {
        let l = &self.layers[layer];
        PassView::new(&self.pass[l.move_index], l.size)
    }

    #[inline]
    pub(crate) fn passable(&self, layer: usize, p: Point) -> bool {
        self.pass_view(layer).passable(p)
    }

    /// Whether the footprint of `layer` at `p` holds no moveable of the
    /// layer's move group, except those in `ignore`.
    pub(crate) fn moveable_free(&self, layer: usize, p: Point, ignore: &[EntityId]) -> bool {
        let l = &self.layers[layer];
        let occupancy = &self.moveables[self.group_of[l.move_index]];
        self.footprints[l.size_index]
            .offset(p)
            .iter()
            .all(|c| match occupancy.at(c) {
                Some(Some(id)) => ignore.contains(&id),
                _ => true,
            })
    }

    /// Passable and free of moveables not in `ignore`.
    pub(crate) fn standable(&self, layer: usize, p: Point, ignore: &[EntityId]) -> bool {
        self.passable(layer, p) && self.moveable_free(layer, p, ignore)
    }

    pub(crate) fn area(&self, layer: usize, p: Point) -> AreaId {
        self.layers[layer].areas.at(p)
    }

    pub(crate) fn same_area(&self, layer: usize, a: Point, b: Point) -> bool {
        match (self.area(layer, a), self.area(layer, b)) {
            (AreaId::Id(x), AreaId::Id(y)) => x == y,
            _ => false,
        }
    }

    /// Straight-line reachability over the pass grid only.
    pub(crate) fn straight_arrive(&self, layer: usize, a: Point, b: Point) -> bool {
        let view = self.pass_view(layer);
        straight_arrive(a, b, |p| view.passable(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MoveGroup;
    use crate::providers::{FootprintTable, TerrainGrid};

    fn config() -> NavConfig {
        NavConfig::default().with_move_group(MoveGroup::new([MoveType(1)]))
    }

    #[test]
    fn rejects_bad_maps() {
        let fp = FootprintTable::squares(&[0]);
        let err = GridStore::new(&TerrainGrid::new(0, 5, TerrainMask(1)), &fp, &config()).unwrap_err();
        assert_eq!(err, NavError::InvalidMapSize { width: 0, height: 5 });
        let err =
            GridStore::new(&TerrainGrid::new(70_000, 1, TerrainMask(1)), &fp, &config()).unwrap_err();
        assert!(matches!(err, NavError::InvalidMapSize { .. }));
    }

    #[test]
    fn rejects_bad_collision_tables() {
        let t = TerrainGrid::new(4, 4, TerrainMask(1));
        let err = GridStore::new(&t, &FootprintTable::default(), &config()).unwrap_err();
        assert_eq!(err, NavError::NoCollisionSizes);

        let dup = FootprintTable::new([
            (CollisionSize(1), PathFindRange::square(0)),
            (CollisionSize(1), PathFindRange::square(1)),
        ]);
        let err = GridStore::new(&t, &dup, &config()).unwrap_err();
        assert_eq!(err, NavError::DuplicateCollisionSize(CollisionSize(1)));

        let crossed = FootprintTable::new([
            (CollisionSize(0), PathFindRange::new(Point::new(0, 0), Point::new(1, 0))),
            (CollisionSize(1), PathFindRange::new(Point::new(0, 0), Point::new(0, 1))),
        ]);
        let err = GridStore::new(&t, &crossed, &config()).unwrap_err();
        assert_eq!(
            err,
            NavError::FootprintNotNested {
                smaller: CollisionSize(0),
                larger: CollisionSize(1)
            }
        );
    }

    /// Sizes whose reported maximum has no footprint.
    struct Mislabelled;

    impl CollisionProvider for Mislabelled {
        fn sizes(&self) -> Vec<CollisionSize> {
            vec![CollisionSize(0)]
        }

        fn footprint(&self, size: CollisionSize) -> Option<PathFindRange> {
            (size == CollisionSize(0)).then_some(PathFindRange::square(0))
        }

        fn max_of(&self, _: &[CollisionSize]) -> Option<CollisionSize> {
            Some(CollisionSize(9))
        }
    }

    #[test]
    fn reach_follows_the_largest_size() {
        let t = TerrainGrid::new(4, 4, TerrainMask(1));
        let err = GridStore::new(&t, &Mislabelled, &config()).unwrap_err();
        assert_eq!(err, NavError::MissingFootprint(CollisionSize(9)));

        let offset = FootprintTable::new([(
            CollisionSize(2),
            PathFindRange::new(Point::new(1, 1), Point::new(2, 2)),
        )]);
        let store = GridStore::new(&t, &offset, &config()).unwrap();
        assert_eq!(store.reach, PathFindRange::new(Point::ZERO, Point::new(2, 2)));
    }

    #[test]
    fn rejects_bad_move_groups() {
        let t = TerrainGrid::new(4, 4, TerrainMask(1));
        let fp = FootprintTable::squares(&[0]);
        let err = GridStore::new(&t, &fp, &NavConfig::default()).unwrap_err();
        assert_eq!(err, NavError::NoMoveTypes);
        let cfg = config().with_move_group(MoveGroup::new([MoveType(1)]));
        let err = GridStore::new(&t, &fp, &cfg).unwrap_err();
        assert_eq!(err, NavError::DuplicateMoveType(MoveType(1)));
    }

    #[test]
    fn layer_indexing() {
        let t = TerrainGrid::new(4, 4, TerrainMask(1));
        let fp = FootprintTable::squares(&[0, 1]);
        let cfg = config().with_move_group(MoveGroup::new([MoveType(2)]));
        let store = GridStore::new(&t, &fp, &cfg).unwrap();
        assert_eq!(store.layers.len(), 4);
        assert_eq!(store.layer_index(MoveType(2), CollisionSize(1)), Some(3));
        assert_eq!(store.layer_index(MoveType(2), CollisionSize(7)), None);
        assert_eq!(store.layer_index(MoveType(8), CollisionSize(0)), None);
        let l = &store.layers[3];
        assert_eq!((l.move_index, l.size_index, l.size), (1, 1, CollisionSize(1)));
        assert_eq!(store.group_of, vec![0, 1]);
        assert_eq!(store.reach, PathFindRange::square(1));
    }
}
