//! The query facade: construction, initialisation, map mutation, point
//! predicates and read-only inspection. The two searches live in
//! `astar.rs` and `jps.rs`.

use std::fmt;
use std::sync::Arc;

use log::warn;
use navgrid_core::{MoveType, Point, TerrainMask};

use crate::area::AreaId;
use crate::config::{InitFlags, NavConfig};
use crate::direction::Direction;
use crate::error::NavError;
use crate::jump::{JumpDistance, JumpRecord};
use crate::observer::SearchObserver;
use crate::pool::{ObjectPool, SharedPool};
use crate::providers::{CollisionProvider, TerrainProvider};
use crate::range::{PathFindRange, grow};
use crate::store::{GridStore, ObstacleCell, Portal};
use crate::types::{CollisionSize, EntityId};

/// Grid pathfinder for agents of several move types and collision sizes on
/// one shared, mutable map.
///
/// Mutations take `&mut self`; queries take `&self` and may run
/// concurrently from several threads.
pub struct Navigator {
    pub(crate) store: GridStore,
    pub(crate) config: NavConfig,
    pub(crate) built: InitFlags,
    pub(crate) pool: Arc<dyn ObjectPool>,
    pub(crate) observer: Option<Arc<dyn SearchObserver>>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("width", &self.store.width)
            .field("height", &self.store.height)
            .field("move_types", &self.store.move_types)
            .field("sizes", &self.store.sizes)
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    /// Validate the configuration and copy the base terrain. Derived grids
    /// are empty until [`initialize`](Self::initialize).
    pub fn new(
        terrain: &impl TerrainProvider,
        collision: &impl CollisionProvider,
        config: NavConfig,
    ) -> Result<Self, NavError> {
        let store = GridStore::new(terrain, collision, &config)?;
        Ok(Self {
            store,
            config,
            built: InitFlags::NONE,
            pool: Arc::new(SharedPool::default()),
            observer: None,
        })
    }

    /// Use `pool` for search scratch space.
    pub fn with_pool(mut self, pool: Arc<dyn ObjectPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn SearchObserver>>) {
        self.observer = observer;
    }

    /// Build the grids selected by `flags` and keep them maintained from
    /// now on.
    pub fn initialize(&mut self, flags: InitFlags) -> Result<(), NavError> {
        if !flags.contains(InitFlags::PASS) {
            if flags.contains(InitFlags::AREAS) {
                return Err(NavError::MissingPassGrid("area grid"));
            }
            if flags.contains(InitFlags::JUMP_POINTS) {
                return Err(NavError::MissingPassGrid("jump point table"));
            }
        }
        self.built = flags;
        self.rebuild_all();
        Ok(())
    }

    /// Rebuild every initialised grid from scratch.
    pub fn rebuild_all(&mut self) {
        self.store.build_all(self.built, self.config.parallel_build);
    }

    pub fn width(&self) -> i32 {
        self.store.width
    }

    pub fn height(&self) -> i32 {
        self.store.height
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Grids built by [`initialize`](Self::initialize).
    pub fn built(&self) -> InitFlags {
        self.built
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Place an obstacle owned by `owner`, overriding the effective terrain
    /// of each listed cell. Cells already owned by an obstacle are skipped.
    pub fn set_obstacle(
        &mut self,
        owner: EntityId,
        cells: impl IntoIterator<Item = (Point, TerrainMask)>,
    ) {
        let mut bbox = None;
        for (p, terrain) in cells {
            let Some(cell) = self.store.obstacles.get_mut(p) else {
                warn!("set_obstacle {owner}: {p} is outside the map");
                continue;
            };
            if let Some(other) = cell.owner {
                warn!("set_obstacle {owner}: {p} is already owned by {other}");
                continue;
            }
            *cell = ObstacleCell {
                terrain,
                owner: Some(owner),
            };
            grow(&mut bbox, p);
        }
        if let Some(changed) = bbox {
            self.terrain_changed(changed);
        }
    }

    /// Remove `owner`'s obstacle from the listed cells, restoring base
    /// terrain.
    pub fn reset_obstacle(&mut self, owner: EntityId, cells: impl IntoIterator<Item = Point>) {
        let mut bbox = None;
        for p in cells {
            let base = self.store.base.at(p);
            let (Some(cell), Some(terrain)) = (self.store.obstacles.get_mut(p), base) else {
                warn!("reset_obstacle {owner}: {p} is outside the map");
                continue;
            };
            if cell.owner != Some(owner) {
                warn!("reset_obstacle {owner}: {p} is owned by {:?}", cell.owner);
                continue;
            }
            *cell = ObstacleCell {
                terrain,
                owner: None,
            };
            grow(&mut bbox, p);
        }
        if let Some(changed) = bbox {
            self.terrain_changed(changed);
        }
    }

    fn terrain_changed(&mut self, changed: PathFindRange) {
        if self.built.contains(InitFlags::INCREMENTAL) {
            self.store.terrain_changed(changed, self.built);
        } else {
            self.rebuild_all();
        }
        self.check_invariants();
    }

    /// Mark the cells of `range` (absolute, inclusive) as occupied by the
    /// moveable `owner` in the move group of `move_type`.
    pub fn set_moveable(&mut self, owner: EntityId, move_type: MoveType, range: PathFindRange) {
        let Some(occupancy) = self.occupancy_mut(move_type, "set_moveable") else {
            return;
        };
        let (w, h) = (occupancy.width(), occupancy.height());
        let Some(range) = range.clip(w, h) else {
            warn!("set_moveable {owner}: {range} is outside the map");
            return;
        };
        for p in range.iter() {
            if let Some(cell) = occupancy.get_mut(p) {
                match *cell {
                    Some(other) if other != owner => {
                        warn!("set_moveable {owner}: {p} is occupied by {other}");
                    }
                    _ => *cell = Some(owner),
                }
            }
        }
    }

    /// Release the cells of `range` held by the moveable `owner`.
    pub fn reset_moveable(&mut self, owner: EntityId, move_type: MoveType, range: PathFindRange) {
        let Some(occupancy) = self.occupancy_mut(move_type, "reset_moveable") else {
            return;
        };
        let (w, h) = (occupancy.width(), occupancy.height());
        let Some(range) = range.clip(w, h) else {
            warn!("reset_moveable {owner}: {range} is outside the map");
            return;
        };
        for p in range.iter() {
            if let Some(cell) = occupancy.get_mut(p) {
                if *cell == Some(owner) {
                    *cell = None;
                } else {
                    warn!("reset_moveable {owner}: {p} is held by {:?}", *cell);
                }
            }
        }
    }

    fn occupancy_mut(
        &mut self,
        move_type: MoveType,
        op: &str,
    ) -> Option<&mut navgrid_core::Grid<Option<EntityId>>> {
        let Some(m) = self.store.move_index(move_type) else {
            warn!("{op}: unknown move type {move_type}");
            return None;
        };
        let group = self.store.group_of[m];
        self.store.moveables.get_mut(group)
    }

    /// Register a portal linking `start` and `end` both ways. A cell can be
    /// the endpoint of at most one portal.
    pub fn add_portal(&mut self, owner: EntityId, start: Point, end: Point) {
        if !self.store.in_map(start) || !self.store.in_map(end) {
            warn!("add_portal {owner}: {start} -> {end} leaves the map");
            return;
        }
        if start == end {
            warn!("add_portal {owner}: {start} links to itself");
            return;
        }
        for p in [start, end] {
            if let Some(existing) = self.store.portals.get(&p) {
                warn!(
                    "add_portal {owner}: {p} is already an endpoint of the portal of {}",
                    existing.owner
                );
                return;
            }
        }
        let portal = Portal { owner, start, end };
        self.store.portals.insert(start, portal);
        self.store.portals.insert(end, portal);
        self.portal_changed(start, end);
    }

    /// Remove `owner`'s portal with an endpoint at `at`.
    pub fn remove_portal(&mut self, owner: EntityId, at: Point) {
        let portal = match self.store.portals.get(&at) {
            None => {
                warn!("remove_portal {owner}: no portal at {at}");
                return;
            }
            Some(portal) if portal.owner != owner => {
                warn!(
                    "remove_portal {owner}: the portal at {at} belongs to {}",
                    portal.owner
                );
                return;
            }
            Some(&portal) => portal,
        };
        self.store.portals.remove(&portal.start);
        self.store.portals.remove(&portal.end);
        self.portal_changed(portal.start, portal.end);
    }

    fn portal_changed(&mut self, start: Point, end: Point) {
        if self.built.contains(InitFlags::INCREMENTAL) {
            self.store.portal_changed(start, self.built);
            self.store.portal_changed(end, self.built);
        } else {
            self.rebuild_all();
        }
        self.check_invariants();
    }

    #[cfg(feature = "diagnostics")]
    fn check_invariants(&self) {
        if let Err(e) = self.verify() {
            panic!("navigation grids are inconsistent: {e}");
        }
        log::debug!("invariants hold after mutation");
    }

    #[cfg(not(feature = "diagnostics"))]
    #[inline]
    fn check_invariants(&self) {}

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// Layer of a `(move type, size)` pair, warning on unknown ones.
    pub(crate) fn layer(&self, move_type: MoveType, size: CollisionSize) -> Option<usize> {
        let layer = self.store.layer_index(move_type, size);
        if layer.is_none() {
            warn!("unsupported move type {move_type} / {size}");
        }
        layer
    }

    fn pass_built(&self) -> bool {
        if !self.built.contains(InitFlags::PASS) {
            warn!("pass grid queried before initialisation");
            return false;
        }
        true
    }

    /// Whether an agent fits at `p`, ignoring moveables.
    pub fn can_stand(&self, move_type: MoveType, size: CollisionSize, p: Point) -> bool {
        self.pass_built()
            && self
                .layer(move_type, size)
                .is_some_and(|l| self.store.passable(l, p))
    }

    /// Whether an agent fits at `p` with no moveable of its group in the way.
    pub fn can_stand_free(&self, move_type: MoveType, size: CollisionSize, p: Point) -> bool {
        self.can_stand_ignoring(move_type, size, p, &[])
    }

    /// Whether an agent fits at `p` when the moveables in `ignore` are
    /// disregarded.
    pub fn can_stand_ignoring(
        &self,
        move_type: MoveType,
        size: CollisionSize,
        p: Point,
        ignore: &[EntityId],
    ) -> bool {
        self.pass_built()
            && self
                .layer(move_type, size)
                .is_some_and(|l| self.store.standable(l, p, ignore))
    }

    /// Whether `a` and `b` lie in the same area, portals aside.
    pub fn check_area_is_same(
        &self,
        move_type: MoveType,
        size: CollisionSize,
        a: Point,
        b: Point,
    ) -> bool {
        if !self.built.contains(InitFlags::AREAS) {
            warn!("area grid queried before initialisation");
            return false;
        }
        self.layer(move_type, size)
            .is_some_and(|l| self.store.same_area(l, a, b))
    }

    /// Whether an agent can walk the straight line from `a` to `b`.
    pub fn check_straight_arrive(
        &self,
        move_type: MoveType,
        size: CollisionSize,
        a: Point,
        b: Point,
    ) -> bool {
        self.pass_built()
            && self
                .layer(move_type, size)
                .is_some_and(|l| self.store.straight_arrive(l, a, b))
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Largest collision size that fits at `p` for `move_type`.
    pub fn pass_at(&self, move_type: MoveType, p: Point) -> Option<CollisionSize> {
        let m = self.store.move_index(move_type)?;
        self.store.pass[m].at(p).flatten()
    }

    pub fn area_at(&self, move_type: MoveType, size: CollisionSize, p: Point) -> Option<AreaId> {
        let l = self.store.layer_index(move_type, size)?;
        Some(self.store.area(l, p))
    }

    /// Number of live areas in a layer.
    pub fn area_count(&self, move_type: MoveType, size: CollisionSize) -> usize {
        self.store
            .layer_index(move_type, size)
            .map_or(0, |l| self.store.layers[l].areas.counts().len())
    }

    pub fn jump_records(&self, move_type: MoveType, size: CollisionSize, p: Point) -> Vec<JumpRecord> {
        self.store
            .layer_index(move_type, size)
            .map(|l| self.store.layers[l].jumps.records(p))
            .unwrap_or_default()
    }

    pub fn next_jump(
        &self,
        move_type: MoveType,
        size: CollisionSize,
        p: Point,
        dir: Direction,
    ) -> Option<JumpDistance> {
        let l = self.store.layer_index(move_type, size)?;
        dir.cardinal_index()?;
        Some(self.store.layers[l].jumps.next(p, dir))
    }

    /// The portal with an endpoint at `p`.
    pub fn portal_at(&self, p: Point) -> Option<&Portal> {
        self.store.portals.get(&p)
    }

    /// Every portal once, ordered by start.
    pub fn portals(&self) -> impl Iterator<Item = &Portal> + '_ {
        self.store
            .portals
            .iter()
            .filter(|(p, portal)| **p == portal.start)
            .map(|(_, portal)| portal)
    }

    /// Effective terrain of `p`.
    pub fn terrain_at(&self, p: Point) -> Option<TerrainMask> {
        self.store.obstacles.get(p).map(|c| c.terrain)
    }

    /// Obstacle owning `p`, if any.
    pub fn obstacle_owner(&self, p: Point) -> Option<EntityId> {
        self.store.obstacles.get(p).and_then(|c| c.owner)
    }

    /// Moveable holding `p` in the move group of `move_type`.
    pub fn moveable_at(&self, move_type: MoveType, p: Point) -> Option<EntityId> {
        let m = self.store.move_index(move_type)?;
        self.store.moveables[self.store.group_of[m]].at(p).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MoveGroup;
    use crate::providers::{FootprintTable, TerrainGrid};

    const LAND: TerrainMask = TerrainMask(1);
    const WALKER: MoveType = MoveType(1);
    const S0: CollisionSize = CollisionSize(0);

    fn navigator(w: i32, h: i32) -> Navigator {
        let cfg = NavConfig::default().with_move_group(MoveGroup::new([WALKER]));
        let mut nav = Navigator::new(
            &TerrainGrid::new(w, h, LAND),
            &FootprintTable::squares(&[0, 1]),
            cfg,
        )
        .unwrap();
        nav.initialize(InitFlags::ALL).unwrap();
        nav
    }

    #[test]
    fn initialize_needs_pass_for_derived_grids() {
        let cfg = NavConfig::default().with_move_group(MoveGroup::new([WALKER]));
        let mut nav = Navigator::new(
            &TerrainGrid::new(4, 4, LAND),
            &FootprintTable::squares(&[0]),
            cfg,
        )
        .unwrap();
        assert_eq!(
            nav.initialize(InitFlags::AREAS),
            Err(NavError::MissingPassGrid("area grid"))
        );
        assert!(nav.initialize(InitFlags::PASS).is_ok());
        assert!(nav.can_stand(WALKER, S0, Point::new(0, 0)));
        assert!(!nav.check_area_is_same(WALKER, S0, Point::new(0, 0), Point::new(1, 1)));
    }

    #[test]
    fn obstacles_block_and_restore() {
        let mut nav = navigator(6, 6);
        let p = Point::new(2, 2);
        nav.set_obstacle(EntityId(1), [(p, TerrainMask::NONE)]);
        assert!(!nav.can_stand(WALKER, S0, p));
        assert_eq!(nav.obstacle_owner(p), Some(EntityId(1)));
        assert_eq!(nav.pass_at(WALKER, Point::new(3, 3)), Some(S0));

        // a second owner cannot take the cell, a wrong owner cannot free it
        nav.set_obstacle(EntityId(2), [(p, LAND)]);
        assert_eq!(nav.terrain_at(p), Some(TerrainMask::NONE));
        nav.reset_obstacle(EntityId(2), [p]);
        assert!(!nav.can_stand(WALKER, S0, p));

        nav.reset_obstacle(EntityId(1), [p]);
        assert!(nav.can_stand(WALKER, S0, p));
        assert_eq!(nav.pass_at(WALKER, Point::new(3, 3)), Some(CollisionSize(1)));
        assert_eq!(nav.verify(), Ok(()));
    }

    #[test]
    fn moveables_only_block_free_standing() {
        let mut nav = navigator(6, 6);
        let p = Point::new(4, 4);
        let cells = PathFindRange::point(p);
        nav.set_moveable(EntityId(7), WALKER, cells);
        assert_eq!(nav.moveable_at(WALKER, p), Some(EntityId(7)));
        assert!(nav.can_stand(WALKER, S0, p));
        assert!(!nav.can_stand_free(WALKER, S0, p));
        assert!(nav.can_stand_ignoring(WALKER, S0, p, &[EntityId(7)]));
        // size 1 footprint around (3,3) covers (4,4)
        assert!(!nav.can_stand_free(WALKER, CollisionSize(1), Point::new(3, 3)));

        nav.set_moveable(EntityId(8), WALKER, cells);
        assert_eq!(nav.moveable_at(WALKER, p), Some(EntityId(7)));
        nav.reset_moveable(EntityId(8), WALKER, cells);
        assert_eq!(nav.moveable_at(WALKER, p), Some(EntityId(7)));
        nav.reset_moveable(EntityId(7), WALKER, cells);
        assert!(nav.can_stand_free(WALKER, S0, p));
    }

    #[test]
    fn portal_registry() {
        let mut nav = navigator(6, 6);
        let (a, b) = (Point::new(0, 0), Point::new(5, 5));
        let gate = Portal {
            owner: EntityId(3),
            start: a,
            end: b,
        };
        nav.add_portal(EntityId(3), a, b);
        assert_eq!(nav.portal_at(a), Some(&gate));
        assert_eq!(nav.portal_at(b), Some(&gate));
        assert_eq!(gate.other(a), b);
        assert_eq!(gate.other(b), a);
        assert_eq!(nav.portals().collect::<Vec<_>>(), vec![&gate]);

        // either endpoint already taken, off the map, or a self-link
        nav.add_portal(EntityId(4), a, Point::new(1, 1));
        nav.add_portal(EntityId(4), Point::new(2, 2), b);
        nav.add_portal(EntityId(4), Point::new(2, 2), Point::new(9, 9));
        nav.add_portal(EntityId(4), Point::new(2, 2), Point::new(2, 2));
        assert_eq!(nav.portal_at(Point::new(2, 2)), None);
        assert_eq!(nav.portals().count(), 1);

        nav.remove_portal(EntityId(4), a);
        assert!(nav.portal_at(a).is_some());
        // removal through the far endpoint drops both
        nav.remove_portal(EntityId(3), b);
        assert_eq!(nav.portal_at(a), None);
        assert_eq!(nav.portal_at(b), None);
        assert_eq!(nav.portals().count(), 0);
        assert_eq!(nav.verify(), Ok(()));
    }

    #[test]
    fn unknown_layers_are_rejected_quietly() {
        let nav = navigator(4, 4);
        assert!(!nav.can_stand(MoveType(8), S0, Point::new(0, 0)));
        assert!(!nav.can_stand(WALKER, CollisionSize(9), Point::new(0, 0)));
        assert_eq!(nav.area_at(MoveType(8), S0, Point::new(0, 0)), None);
        assert_eq!(nav.area_count(WALKER, S0), 1);
        assert_eq!(nav.next_jump(WALKER, S0, Point::new(0, 0), Direction::NE), None);
        assert_eq!(
            nav.next_jump(WALKER, S0, Point::new(0, 0), Direction::E),
            Some(JumpDistance::Wall(3))
        );
    }
}
