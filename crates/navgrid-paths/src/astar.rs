//! Short paths: bounded 4-direction A* that respects moveables.

use log::{trace, warn};
use navgrid_core::Point;

use crate::Navigator;
use crate::config::InitFlags;
use crate::direction::CARDINALS;
use crate::distance::{STRAIGHT_COST, octile};
use crate::path::{PathRequest, PathResult, PathStatus, emit_segment};
use crate::pool::{NO_PARENT, Pooled, SearchScratch};
use crate::range::PathFindRange;

impl Navigator {
    /// Find a path with bounded A* over the 4 cardinal directions.
    ///
    /// The search stays inside the request range (the whole map when none
    /// is given) and treats moveables of the agent's move group as walls,
    /// except the agent itself and the request target. When the goal is
    /// not reached within the step budget the result is
    /// [`PathStatus::CantArrive`] with a best-effort path towards the node
    /// closest to the goal.
    pub fn get_short_path(&self, req: &PathRequest) -> PathResult {
        let mut out = PathResult::default();
        self.get_short_path_into(req, &mut out);
        out
    }

    /// Like [`get_short_path`](Self::get_short_path), writing into `out`.
    pub fn get_short_path_into(&self, req: &PathRequest, out: &mut PathResult) {
        out.clear();
        let mut scratch = Pooled::new(self.pool.as_ref());
        self.short_path(req, &mut scratch, out);
        trace!(
            "short path {} -> {}: {:?}, {} points, cost {}",
            req.start,
            req.end,
            out.status,
            out.path.len(),
            out.cost
        );
        if let Some(obs) = &self.observer {
            obs.path_found(out);
        }
    }

    fn short_path(&self, req: &PathRequest, s: &mut SearchScratch, out: &mut PathResult) {
        if !self.built.contains(InitFlags::PASS) {
            warn!("short path requested before the pass grid was built");
            return out.fail(PathStatus::Unsupported);
        }
        let Some(layer) = self.layer(req.move_type, req.size) else {
            return out.fail(PathStatus::Unsupported);
        };

        let map = PathFindRange::map(self.store.width, self.store.height);
        let Some(bounds) = req.range.map_or(Some(map), |r| r.intersect(map)) else {
            return out.fail(PathStatus::InvalidStart);
        };
        let mut ignore = std::mem::take(&mut s.ignore);
        ignore.push(req.agent);
        ignore.extend(req.target);
        let open = |p: Point| bounds.contains(p) && self.store.standable(layer, p, &ignore);

        let (start, end) = (req.start, req.end);
        if !open(start) {
            out.fail(PathStatus::InvalidStart);
        } else if !self.store.in_map(end) {
            out.fail(PathStatus::InvalidEnd);
        } else {
            self.run_astar(req, s, &open, out);
        }
        ignore.clear();
        s.ignore = ignore;
    }

    fn run_astar(
        &self,
        req: &PathRequest,
        s: &mut SearchScratch,
        open: &impl Fn(Point) -> bool,
        out: &mut PathResult,
    ) {
        let (start, end) = (req.start, req.end);
        s.relax(NO_PARENT, start, None, None, 0, octile(start, end));
        let mut best = 0u32;
        let mut expansions = 0u32;

        let found = loop {
            let Some(h) = s.pop() else {
                break None;
            };
            let (p, g) = {
                let n = &s.nodes[h as usize];
                (n.point, n.g)
            };
            if p == end {
                break Some(h);
            }
            if expansions >= self.config.astar_step_budget {
                break None;
            }
            expansions += 1;
            if let Some(obs) = &self.observer {
                obs.explored(p, g);
            }
            for d in CARDINALS {
                let np = p + d.delta();
                if !open(np) {
                    continue;
                }
                let nh = octile(np, end);
                let ng = g + STRAIGHT_COST;
                if let Some(handle) = s.relax(h, np, None, None, ng, nh) {
                    let b = &s.nodes[best as usize];
                    if (nh, ng) < (b.h, b.g) {
                        best = handle;
                    }
                }
            }
        };

        let (target, status) = match found {
            Some(h) => (h, PathStatus::Success),
            None => (best, PathStatus::CantArrive),
        };
        out.status = status;
        out.cost = s.nodes[target as usize].g;

        let mut handles = std::mem::take(&mut s.handles);
        s.chain(target, &mut handles);
        s.points.clear();
        s.points
            .extend(handles.iter().map(|&h| s.nodes[h as usize].point));
        s.handles = handles;
        emit_segment(&mut out.path, &s.points, req.merge, open, &mut s.smooth);
    }
}
