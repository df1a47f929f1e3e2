//! Query inputs and outputs, plus the line walking and path smoothing shared
//! by both searches.

use navgrid_core::{MoveType, Point};

use crate::range::PathFindRange;
use crate::types::{CollisionSize, EntityId};

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// Outcome of a path query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStatus {
    Success,
    /// No route exists, or the search gave up. A short-path query still
    /// returns a best-effort path towards the end.
    #[default]
    CantArrive,
    InvalidStart,
    InvalidEnd,
    /// The long-path search ran out of candidates after the reachability
    /// pre-check let it through.
    NoEnd,
    /// Unknown move type or collision size, or the needed grids were not
    /// initialised.
    Unsupported,
}

/// A path query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathRequest {
    /// The moving agent; its own moveable cells never block it.
    pub agent: EntityId,
    /// An entity the agent is heading for; its moveable cells do not block
    /// either.
    pub target: Option<EntityId>,
    pub move_type: MoveType,
    pub size: CollisionSize,
    /// Inclusive bound of the short-path search.
    pub range: Option<PathFindRange>,
    pub start: Point,
    pub end: Point,
    /// Smooth the path into straight-line reachable waypoints.
    pub merge: bool,
}

impl PathRequest {
    pub fn new(
        agent: EntityId,
        move_type: MoveType,
        size: CollisionSize,
        start: Point,
        end: Point,
    ) -> Self {
        Self {
            agent,
            target: None,
            move_type,
            size,
            range: None,
            start,
            end,
            merge: false,
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_range(mut self, range: PathFindRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }
}

/// The answer to a [`PathRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    pub status: PathStatus,
    /// Waypoints from the start. Consecutive points are adjacent (or
    /// straight-line reachable when merged), except across a portal hop.
    pub path: Vec<Point>,
    /// Owners of the traversed portals, in traversal order.
    pub portals: Vec<EntityId>,
    /// 10 per straight step, 14 per diagonal step; portal hops are free.
    pub cost: i32,
}

impl PathResult {
    pub fn clear(&mut self) {
        self.status = PathStatus::CantArrive;
        self.path.clear();
        self.portals.clear();
        self.cost = 0;
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == PathStatus::Success
    }

    pub(crate) fn fail(&mut self, status: PathStatus) {
        self.clear();
        self.status = status;
    }
}

// ---------------------------------------------------------------------------
// Line walking
// ---------------------------------------------------------------------------

/// Walk the Bresenham line from `a` to `b`. Every visited cell must be open,
/// and every diagonal step also needs both orthogonal cells open.
pub(crate) fn straight_arrive(a: Point, b: Point, open: impl Fn(Point) -> bool) -> bool {
    if !open(a) {
        return false;
    }
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = (b.x - a.x).signum();
    let sy = (b.y - a.y).signum();
    let mut err = dx + dy;
    let mut p = a;
    while p != b {
        let e2 = 2 * err;
        let mut step = Point::ZERO;
        if e2 >= dy {
            err += dy;
            step.x = sx;
        }
        if e2 <= dx {
            err += dx;
            step.y = sy;
        }
        if step.x != 0 && step.y != 0 && !(open(p.shift(step.x, 0)) && open(p.shift(0, step.y))) {
            return false;
        }
        p = p + step;
        if !open(p) {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Segment emission
// ---------------------------------------------------------------------------

/// Append every cell from `from` (exclusive) to `to` (inclusive) along a
/// straight or diagonal line.
fn append_line(out: &mut Vec<Point>, from: Point, to: Point) {
    let step = (to - from).signum();
    let mut p = from;
    while p != to {
        p = p + step;
        out.push(p);
    }
}

/// Drop interior points that continue in the same direction.
fn collapse_colinear(corners: &[Point], out: &mut Vec<Point>) {
    out.clear();
    for (i, &p) in corners.iter().enumerate() {
        if i > 0 && i + 1 < corners.len() {
            let prev = corners[i - 1];
            let next = corners[i + 1];
            if (p - prev).signum() == (next - p).signum() {
                continue;
            }
        }
        out.push(p);
    }
}

/// Append one portal-free segment given by its corners (each consecutive
/// pair a straight or diagonal run). Unmerged segments are expanded cell
/// by cell; merged ones are string-pulled with `open`.
pub(crate) fn emit_segment(
    out: &mut Vec<Point>,
    corners: &[Point],
    merge: bool,
    open: impl Fn(Point) -> bool,
    buf: &mut Vec<Point>,
) {
    let Some(&first) = corners.first() else {
        return;
    };
    out.push(first);
    if !merge {
        for w in corners.windows(2) {
            append_line(out, w[0], w[1]);
        }
        return;
    }
    collapse_colinear(corners, buf);
    let mut anchor = 0;
    let mut j = 1;
    while j < buf.len() {
        if j + 1 < buf.len() && straight_arrive(buf[anchor], buf[j + 1], &open) {
            j += 1;
            continue;
        }
        out.push(buf[j]);
        anchor = j;
        j += 1;
    }
}
