//! Long paths: JPS+ over the precomputed jump-point tables, with portal
//! traversal.
//!
//! Straight jumps are a single `next` lookup. Diagonal jumps step one cell
//! at a time (both orthogonal cells must be open, so corners are never
//! cut) and land wherever a straight sub-search along one of the
//! diagonal's components would find a stop or the goal. Portal endpoints
//! are stops for every direction; expanding a node on one also pushes the
//! other endpoint at the same cost.
//!
//! A free hop can beat the octile distance, so the estimate is also capped
//! by the distance to the nearest endpoint plus the distance from the
//! endpoint nearest to the goal. That bound holds for any chain of hops
//! and keeps the estimate consistent.

use log::{trace, warn};
use navgrid_core::Point;

use crate::Navigator;
use crate::config::InitFlags;
use crate::direction::{DirSet, Direction};
use crate::distance::{DIAGONAL_COST, STRAIGHT_COST, octile};
use crate::jump::{JumpDistance, JumpTable};
use crate::path::{PathRequest, PathResult, PathStatus, emit_segment};
use crate::pool::{NO_PARENT, Pooled, SearchScratch};
use crate::store::{PassView, PortalMap};

/// Read-only context of one long-path search.
struct Jumper<'a> {
    pass: PassView<'a>,
    jumps: &'a JumpTable,
    portals: &'a PortalMap,
    goal: Point,
    /// Octile distance from the endpoint nearest to the goal.
    exit_to_goal: Option<i32>,
}

impl<'a> Jumper<'a> {
    fn new(
        pass: PassView<'a>,
        jumps: &'a JumpTable,
        portals: &'a PortalMap,
        goal: Point,
    ) -> Self {
        let exit_to_goal = portals.keys().map(|&e| octile(e, goal)).min();
        Self {
            pass,
            jumps,
            portals,
            goal,
            exit_to_goal,
        }
    }

    /// Lower bound of the cost from `p` to the goal.
    fn estimate(&self, p: Point) -> i32 {
        let direct = octile(p, self.goal);
        let Some(exit) = self.exit_to_goal else {
            return direct;
        };
        let entry = self.portals.keys().map(|&e| octile(p, e)).min().unwrap_or(direct);
        direct.min(entry + exit)
    }

    /// Distance from `from` to the goal along cardinal `d`, if the goal
    /// lies on that ray.
    fn goal_on_ray(&self, from: Point, d: Direction) -> Option<i32> {
        let delta = d.delta();
        let diff = self.goal - from;
        let k = if delta.x != 0 {
            (diff.y == 0).then_some(diff.x * delta.x)?
        } else {
            (diff.x == 0).then_some(diff.y * delta.y)?
        };
        (k > 0).then_some(k)
    }

    /// Landing cell and step count of a straight jump.
    fn straight(&self, from: Point, d: Direction) -> Option<(Point, i32)> {
        let next = self.jumps.next(from, d);
        let reach = match next {
            JumpDistance::Blocked => return None,
            JumpDistance::Wall(k) | JumpDistance::Point(k) => i32::from(k),
        };
        if let Some(k) = self.goal_on_ray(from, d) {
            if k <= reach {
                return Some((self.goal, k));
            }
        }
        match next {
            JumpDistance::Point(k) => Some((from + d.delta() * i32::from(k), i32::from(k))),
            _ => None,
        }
    }

    /// Whether a straight search from `from` along `d` finds anything.
    fn straight_hits(&self, from: Point, d: Direction) -> bool {
        self.straight(from, d).is_some()
    }

    /// Landing cell and step count of a diagonal jump.
    fn diagonal(&self, from: Point, d: Direction) -> Option<(Point, i32)> {
        let (h, v) = d.components()?;
        let step = d.delta();
        let mut p = from;
        let mut steps = 0;
        loop {
            let n = p + step;
            if !(self.pass.passable(p + h.delta())
                && self.pass.passable(p + v.delta())
                && self.pass.passable(n))
            {
                return None;
            }
            p = n;
            steps += 1;
            if p == self.goal
                || self.portals.contains_key(&p)
                || self.straight_hits(p, h)
                || self.straight_hits(p, v)
            {
                return Some((p, steps));
            }
        }
    }

    /// Directions worth exploring from `at`, given how it was reached.
    fn successors(&self, at: Point, arrival: Option<Direction>) -> DirSet {
        let Some(d) = arrival else {
            return DirSet::ALL;
        };
        let mut set = DirSet::EMPTY;
        set.insert(d);
        match d.components() {
            Some((h, v)) => {
                set.insert(h);
                set.insert(v);
            }
            None => {
                for side in d.perpendicular() {
                    if self.pass.passable(at + side.delta()) {
                        set.insert(side);
                        if let Some(diag) = Direction::combine(d, side) {
                            set.insert(diag);
                        }
                    }
                }
            }
        }
        set
    }
}

impl Navigator {
    /// Find a path with JPS+, walking through portals where they help.
    ///
    /// Moveables and the request range are ignored. When area labels are
    /// built, a start and end in different areas are first checked for a
    /// portal route between them; with none the result is
    /// [`PathStatus::CantArrive`] without searching.
    pub fn get_long_path(&self, req: &PathRequest) -> PathResult {
        let mut out = PathResult::default();
        self.get_long_path_into(req, &mut out);
        out
    }

    /// Like [`get_long_path`](Self::get_long_path), writing into `out`.
    pub fn get_long_path_into(&self, req: &PathRequest, out: &mut PathResult) {
        out.clear();
        let mut scratch = Pooled::new(self.pool.as_ref());
        self.long_path(req, &mut scratch, out);
        trace!(
            "long path {} -> {}: {:?}, {} points, {} portals, cost {}",
            req.start,
            req.end,
            out.status,
            out.path.len(),
            out.portals.len(),
            out.cost
        );
        if let Some(obs) = &self.observer {
            obs.path_found(out);
        }
    }

    fn long_path(&self, req: &PathRequest, s: &mut SearchScratch, out: &mut PathResult) {
        if !self.built.contains(InitFlags::PASS | InitFlags::JUMP_POINTS) {
            warn!("long path requested before the jump point tables were built");
            return out.fail(PathStatus::Unsupported);
        }
        let Some(layer) = self.layer(req.move_type, req.size) else {
            return out.fail(PathStatus::Unsupported);
        };
        let (start, end) = (req.start, req.end);
        let pass = self.store.pass_view(layer);
        if !pass.passable(start) {
            return out.fail(PathStatus::InvalidStart);
        }
        if !pass.passable(end) {
            return out.fail(PathStatus::InvalidEnd);
        }
        if self.built.contains(InitFlags::AREAS) && !self.areas_connected(layer, start, end, s) {
            return out.fail(PathStatus::CantArrive);
        }

        let jumps = &self.store.layers[layer].jumps;
        let jumper = Jumper::new(pass, jumps, &self.store.portals, end);
        match self.run_jps(&jumper, start, s) {
            Some(goal) => self.emit_long_path(req, &jumper, goal, s, out),
            None => out.fail(PathStatus::NoEnd),
        }
    }

    fn run_jps(&self, j: &Jumper<'_>, start: Point, s: &mut SearchScratch) -> Option<u32> {
        s.relax(NO_PARENT, start, None, None, 0, j.estimate(start));
        while let Some(h) = s.pop() {
            let (p, g, arrival) = {
                let n = &s.nodes[h as usize];
                (n.point, n.g, n.arrival)
            };
            if p == j.goal {
                return Some(h);
            }
            if let Some(obs) = &self.observer {
                obs.explored(p, g);
            }
            if let Some(portal) = j.portals.get(&p) {
                let exit = portal.other(p);
                if j.pass.passable(exit) {
                    s.relax(h, exit, None, Some(portal.owner), g, j.estimate(exit));
                }
            }
            for d in j.successors(p, arrival).iter() {
                let landing = if d.is_diagonal() {
                    j.diagonal(p, d).map(|(to, k)| (to, k * DIAGONAL_COST))
                } else {
                    j.straight(p, d).map(|(to, k)| (to, k * STRAIGHT_COST))
                };
                let Some((to, cost)) = landing else {
                    continue;
                };
                if let Some(obs) = &self.observer {
                    obs.next_point(p, to);
                }
                s.relax(h, to, Some(d), None, g + cost, j.estimate(to));
            }
        }
        None
    }

    /// Turn the parent chain of `goal` into portal-separated segments.
    fn emit_long_path(
        &self,
        req: &PathRequest,
        j: &Jumper<'_>,
        goal: u32,
        s: &mut SearchScratch,
        out: &mut PathResult,
    ) {
        out.status = PathStatus::Success;
        out.cost = s.nodes[goal as usize].g;
        let open = |p: Point| j.pass.passable(p);

        let mut handles = std::mem::take(&mut s.handles);
        s.chain(goal, &mut handles);
        s.points.clear();
        for &h in &handles {
            let node = &s.nodes[h as usize];
            if let Some(owner) = node.portal {
                emit_segment(&mut out.path, &s.points, req.merge, open, &mut s.smooth);
                s.points.clear();
                out.portals.push(owner);
            }
            s.points.push(node.point);
        }
        emit_segment(&mut out.path, &s.points, req.merge, open, &mut s.smooth);
        s.handles = handles;
    }
}

#[cfg(test)]
mod tests {
    use navgrid_core::{MoveType, Point, TerrainMask};

    use crate::config::{InitFlags, MoveGroup, NavConfig};
    use crate::path::{PathRequest, PathStatus};
    use crate::providers::{FootprintTable, TerrainGrid};
    use crate::types::{CollisionSize, EntityId};
    use crate::Navigator;

    const WALKER: MoveType = MoveType(1);
    const S0: CollisionSize = CollisionSize(0);

    fn navigator(ascii: &str) -> Navigator {
        let terrain = TerrainGrid::from_ascii(ascii, |c| {
            if c == '#' {
                TerrainMask::NONE
            } else {
                TerrainMask(1)
            }
        });
        let cfg = NavConfig::default().with_move_group(MoveGroup::new([WALKER]));
        let mut nav = Navigator::new(&terrain, &FootprintTable::squares(&[0]), cfg).unwrap();
        nav.initialize(InitFlags::ALL).unwrap();
        nav
    }

    fn req(start: (i32, i32), end: (i32, i32)) -> PathRequest {
        PathRequest::new(
            EntityId(1),
            WALKER,
            S0,
            Point::new(start.0, start.1),
            Point::new(end.0, end.1),
        )
    }

    /// Consecutive unmerged points are one king move apart (portal hops
    /// aside), and diagonal moves never cut a corner.
    fn assert_walkable(nav: &Navigator, path: &[Point]) {
        for w in path.windows(2) {
            if nav.portal_at(w[0]).is_some_and(|p| p.other(w[0]) == w[1]) {
                continue;
            }
            let d = w[1] - w[0];
            assert!(d.x.abs() <= 1 && d.y.abs() <= 1 && d != Point::ZERO, "{w:?}");
            assert!(nav.can_stand(WALKER, S0, w[1]));
            if d.x != 0 && d.y != 0 {
                assert!(nav.can_stand(WALKER, S0, w[0].shift(d.x, 0)));
                assert!(nav.can_stand(WALKER, S0, w[0].shift(0, d.y)));
            }
        }
    }

    #[test]
    fn start_equals_end() {
        let nav = navigator("...\n...");
        let r = nav.get_long_path(&req((1, 1), (1, 1)));
        assert_eq!(r.status, PathStatus::Success);
        assert_eq!(r.path, vec![Point::new(1, 1)]);
        assert_eq!(r.cost, 0);
    }

    #[test]
    fn goes_around_a_pillar() {
        let nav = navigator(
            "
            .......
            .......
            ...#...
            ...#...
            ...#...
            .......
            .......
            ",
        );
        let r = nav.get_long_path(&req((1, 3), (5, 3)));
        assert_eq!(r.status, PathStatus::Success);
        assert_walkable(&nav, &r.path);
        assert_eq!(r.path.first(), Some(&Point::new(1, 3)));
        assert_eq!(r.path.last(), Some(&Point::new(5, 3)));
        // one diagonal and two straight steps on each side of the pillar
        assert_eq!(r.cost, 2 * 14 + 4 * 10);
    }

    #[test]
    fn corners_are_not_cut() {
        let nav = navigator(
            "
            .#
            ..
            ",
        );
        let r = nav.get_long_path(&req((0, 0), (1, 1)));
        assert_eq!(r.status, PathStatus::Success);
        assert_eq!(r.path, vec![Point::new(0, 0), Point::new(0, 1), Point::new(1, 1)]);
        assert_eq!(r.cost, 20);
    }

    #[test]
    fn invalid_and_unreachable() {
        let nav = navigator(
            "
            ..#..
            ..#..
            ",
        );
        assert_eq!(nav.get_long_path(&req((2, 0), (0, 0))).status, PathStatus::InvalidStart);
        assert_eq!(nav.get_long_path(&req((0, 0), (2, 1))).status, PathStatus::InvalidEnd);
        assert_eq!(nav.get_long_path(&req((0, 0), (9, 9))).status, PathStatus::InvalidEnd);
        assert_eq!(nav.get_long_path(&req((0, 0), (4, 1))).status, PathStatus::CantArrive);
    }

    #[test]
    fn without_areas_the_search_reports_no_end() {
        let terrain = TerrainGrid::from_ascii("..#..", |c| {
            if c == '#' {
                TerrainMask::NONE
            } else {
                TerrainMask(1)
            }
        });
        let cfg = NavConfig::default().with_move_group(MoveGroup::new([WALKER]));
        let mut nav = Navigator::new(&terrain, &FootprintTable::squares(&[0]), cfg).unwrap();
        nav.initialize(InitFlags::PASS | InitFlags::JUMP_POINTS).unwrap();
        assert_eq!(nav.get_long_path(&req((0, 0), (4, 0))).status, PathStatus::NoEnd);

        nav.initialize(InitFlags::PASS).unwrap();
        assert_eq!(nav.get_long_path(&req((0, 0), (1, 0))).status, PathStatus::Unsupported);
    }

    #[test]
    fn portal_is_taken_and_reported() {
        let mut nav = navigator(
            "
            ...#...
            ...#...
            ...#...
            ",
        );
        nav.add_portal(EntityId(9), Point::new(1, 1), Point::new(5, 1));
        let r = nav.get_long_path(&req((0, 0), (6, 2)));
        assert_eq!(r.status, PathStatus::Success);
        assert_eq!(r.portals, vec![EntityId(9)]);
        assert_walkable(&nav, &r.path);
        let hop = r
            .path
            .windows(2)
            .position(|w| w[0] == Point::new(1, 1) && w[1] == Point::new(5, 1));
        assert!(hop.is_some());
        assert_eq!(r.cost, 14 + 14);

        let back = nav.get_long_path(&req((6, 2), (0, 0)));
        assert_eq!(back.status, PathStatus::Success);
        assert_eq!(back.portals, vec![EntityId(9)]);
        assert_walkable(&nav, &back.path);
        let hop = back
            .path
            .windows(2)
            .position(|w| w[0] == Point::new(5, 1) && w[1] == Point::new(1, 1));
        assert!(hop.is_some());
        assert_eq!(back.cost, 14 + 14);
    }

    #[test]
    fn a_portal_behind_the_start_beats_the_open_road() {
        let mut nav = navigator(".........................");
        nav.add_portal(EntityId(5), Point::new(8, 0), Point::new(19, 0));
        let r = nav.get_long_path(&req((10, 0), (20, 0)));
        assert_eq!(r.status, PathStatus::Success);
        assert_eq!(
            r.path,
            vec![
                Point::new(10, 0),
                Point::new(9, 0),
                Point::new(8, 0),
                Point::new(19, 0),
                Point::new(20, 0)
            ]
        );
        assert_eq!(r.portals, vec![EntityId(5)]);
        assert_eq!(r.cost, 30);
    }
}
