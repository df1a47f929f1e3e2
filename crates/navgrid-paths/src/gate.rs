//! Area-level reachability through portals, used to reject long-path
//! queries before searching.

use navgrid_core::Point;

use crate::Navigator;
use crate::area::AreaId;
use crate::pool::SearchScratch;

impl Navigator {
    /// Whether the area of `b` can be reached from the area of `a`, either
    /// directly or by chaining portals (each portal links the areas of its
    /// two endpoints). Both points must be passable.
    pub(crate) fn areas_connected(
        &self,
        layer: usize,
        a: Point,
        b: Point,
        s: &mut SearchScratch,
    ) -> bool {
        let (AreaId::Id(from), AreaId::Id(to)) = (self.store.area(layer, a), self.store.area(layer, b))
        else {
            return false;
        };
        if from == to {
            return true;
        }

        s.area_visited.clear();
        s.area_queue.clear();
        s.area_visited.push(from);
        s.area_queue.push_back(from);
        while let Some(current) = s.area_queue.pop_front() {
            for (&at, portal) in &self.store.portals {
                if self.store.area(layer, at) != AreaId::Id(current) {
                    continue;
                }
                let AreaId::Id(next) = self.store.area(layer, portal.other(at)) else {
                    continue;
                };
                if next == to {
                    return true;
                }
                if !s.area_visited.contains(&next) {
                    s.area_visited.push(next);
                    s.area_queue.push_back(next);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use navgrid_core::{MoveType, Point, TerrainMask};

    use crate::Navigator;
    use crate::config::{InitFlags, MoveGroup, NavConfig};
    use crate::pool::SearchScratch;
    use crate::providers::{FootprintTable, TerrainGrid};
    use crate::types::{CollisionSize, EntityId};

    const WALKER: MoveType = MoveType(1);

    #[test]
    fn portals_chain_areas_both_ways() {
        let terrain = TerrainGrid::from_ascii(
            "
            ..#..#..
            ..#..#..
            ",
            |c| if c == '#' { TerrainMask::NONE } else { TerrainMask(1) },
        );
        let cfg = NavConfig::default().with_move_group(MoveGroup::new([WALKER]));
        let mut nav = Navigator::new(&terrain, &FootprintTable::squares(&[0]), cfg).unwrap();
        nav.initialize(InitFlags::ALL).unwrap();
        let layer = nav.layer(WALKER, CollisionSize(0)).unwrap();
        let mut s = SearchScratch::new();
        let (left, mid, right) = (Point::new(0, 0), Point::new(3, 0), Point::new(7, 1));

        assert!(nav.areas_connected(layer, left, Point::new(1, 1), &mut s));
        assert!(!nav.areas_connected(layer, left, right, &mut s));

        nav.add_portal(EntityId(1), Point::new(1, 0), Point::new(4, 1));
        nav.add_portal(EntityId(2), Point::new(3, 1), Point::new(6, 0));
        assert!(nav.areas_connected(layer, left, mid, &mut s));
        assert!(nav.areas_connected(layer, left, right, &mut s));
        assert!(nav.areas_connected(layer, right, left, &mut s));
        assert!(nav.areas_connected(layer, mid, left, &mut s));

        nav.remove_portal(EntityId(1), Point::new(4, 1));
        assert!(!nav.areas_connected(layer, right, left, &mut s));
        assert!(nav.areas_connected(layer, right, mid, &mut s));
    }
}
