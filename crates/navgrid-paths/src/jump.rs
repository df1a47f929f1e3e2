//! Jump-point tables for JPS+.
//!
//! Each layer keeps two grids:
//!
//! - **records**: per cell, the forced-neighbour records that make it a jump
//!   point, packed into a `u8`. For the diagonal `DIAGONALS[i]`, bit `2i`
//!   is the record whose parent lies along the diagonal's horizontal
//!   component and bit `2i + 1` the one along its vertical component.
//! - **next**: per cell and cardinal direction, the distance to the next
//!   stop (a jump point for that travel direction, or a portal endpoint) or to
//!   the wall.
//!
//! Both are maintained incrementally: a pass change invalidates records
//! within one cell of it, and `next` entries only along the rows and
//! columns crossing that range, up to the first entry that comes out
//! unchanged.

use navgrid_core::{Grid, Point};

use crate::direction::{CARDINALS, DIAGONALS, Direction};
use crate::range::PathFindRange;
use crate::store::{PassView, PortalMap};

/// Distance from a cell to what lies ahead of it in one cardinal direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JumpDistance {
    /// The cell itself is not passable.
    #[default]
    Blocked,
    /// No stop ahead; this many passable cells before the wall or map edge.
    Wall(u16),
    /// The next stop is this many cells away.
    Point(u16),
}

/// One reason a cell is a jump point: arriving from `parent` (one cell
/// away), the diagonal `dir` has to be considered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpRecord {
    pub parent: Point,
    pub dir: Direction,
}

/// Record bits whose parent lies one step behind travel direction `d`.
fn incoming_mask(d: Direction) -> u8 {
    let mut mask = 0;
    for (i, diag) in DIAGONALS.iter().enumerate() {
        if let Some((h, v)) = diag.components() {
            if h == d {
                mask |= 1 << (2 * i);
            }
            if v == d {
                mask |= 1 << (2 * i + 1);
            }
        }
    }
    mask
}

/// Forced-neighbour records of `j`.
pub(crate) fn detect(pass: PassView<'_>, j: Point) -> u8 {
    if !pass.passable(j) {
        return 0;
    }
    let mut bits = 0;
    for (i, diag) in DIAGONALS.iter().enumerate() {
        let d = diag.delta();
        let p = j.shift(-d.x, 0);
        if pass.passable(p) && !pass.passable(p.shift(0, d.y)) && pass.passable(j.shift(0, d.y)) {
            bits |= 1 << (2 * i);
        }
        let p = j.shift(0, -d.y);
        if pass.passable(p) && !pass.passable(p.shift(d.x, 0)) && pass.passable(j.shift(d.x, 0)) {
            bits |= 1 << (2 * i + 1);
        }
    }
    bits
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JumpTable {
    records: Grid<u8>,
    next: Grid<[JumpDistance; 4]>,
}

impl JumpTable {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        Self {
            records: Grid::new(width, height, 0),
            next: Grid::new(width, height, [JumpDistance::Blocked; 4]),
        }
    }

    pub(crate) fn record_bits(&self, p: Point) -> u8 {
        self.records.at(p).unwrap_or(0)
    }

    /// Decoded records of `p`.
    pub(crate) fn records(&self, p: Point) -> Vec<JumpRecord> {
        let bits = self.record_bits(p);
        let mut out = Vec::new();
        for (i, diag) in DIAGONALS.iter().enumerate() {
            let Some((h, v)) = diag.components() else {
                continue;
            };
            if bits & (1 << (2 * i)) != 0 {
                out.push(JumpRecord {
                    parent: p - h.delta(),
                    dir: *diag,
                });
            }
            if bits & (1 << (2 * i + 1)) != 0 {
                out.push(JumpRecord {
                    parent: p - v.delta(),
                    dir: *diag,
                });
            }
        }
        out
    }

    /// `next` entry of `p` towards cardinal `d`; `Blocked` for diagonals or
    /// off the map.
    #[inline]
    pub(crate) fn next(&self, p: Point, d: Direction) -> JumpDistance {
        match (self.next.at(p), d.cardinal_index()) {
            (Some(e), Some(ci)) => e[ci],
            _ => JumpDistance::Blocked,
        }
    }

    /// Whether travel in direction `d` has to stop on `n`.
    #[inline]
    pub(crate) fn is_stop(&self, portals: &PortalMap, n: Point, d: Direction) -> bool {
        self.record_bits(n) & incoming_mask(d) != 0 || portals.contains_key(&n)
    }

    fn compute(&self, pass: PassView<'_>, portals: &PortalMap, p: Point, d: Direction) -> JumpDistance {
        if !pass.passable(p) {
            return JumpDistance::Blocked;
        }
        let n = p + d.delta();
        if !pass.passable(n) {
            return JumpDistance::Wall(0);
        }
        if self.is_stop(portals, n, d) {
            return JumpDistance::Point(1);
        }
        match self.next(n, d) {
            JumpDistance::Blocked => JumpDistance::Wall(0),
            JumpDistance::Wall(k) => JumpDistance::Wall(k.saturating_add(1)),
            JumpDistance::Point(k) => JumpDistance::Point(k.saturating_add(1)),
        }
    }

    /// Rebuild everything from scratch.
    pub(crate) fn build(&mut self, pass: PassView<'_>, portals: &PortalMap) {
        self.rebuild(pass, portals, PathFindRange::map(pass.width(), pass.height()));
    }

    /// Rebuild after the pass grid changed inside `dirty`, which must
    /// already include the one-cell margin around the change.
    pub(crate) fn rebuild(&mut self, pass: PassView<'_>, portals: &PortalMap, dirty: PathFindRange) {
        let Some(dirty) = dirty.clip(pass.width(), pass.height()) else {
            return;
        };
        // Records only depend on the 3x3 neighbourhood, so overwriting the
        // range drops stale ones and detects new ones in one sweep.
        for p in dirty.iter() {
            self.records.set(p, detect(pass, p));
        }
        self.propagate(pass, portals, dirty);
    }

    /// Refresh the `next` entries leading onto `p` after a portal there was
    /// added or removed.
    pub(crate) fn refresh_point(&mut self, pass: PassView<'_>, portals: &PortalMap, p: Point) {
        self.propagate(pass, portals, PathFindRange::point(p));
    }

    /// Recompute `next` along every row and column crossing `dirty`, walking
    /// each line from the far edge of the range backwards and stopping past
    /// the range at the first entry that comes out unchanged.
    fn propagate(&mut self, pass: PassView<'_>, portals: &PortalMap, dirty: PathFindRange) {
        for (ci, &d) in CARDINALS.iter().enumerate() {
            let step = d.delta();
            let back = -step;
            let far = Point::new(
                if step.x > 0 { dirty.max.x } else { dirty.min.x },
                if step.y > 0 { dirty.max.y } else { dirty.min.y },
            );
            let lines: Vec<Point> = if step.x != 0 {
                (dirty.min.y..=dirty.max.y).map(|y| Point::new(far.x, y)).collect()
            } else {
                (dirty.min.x..=dirty.max.x).map(|x| Point::new(x, far.y)).collect()
            };
            for start in lines {
                let mut p = start;
                while let Some(entry) = self.next.at(p) {
                    let new = self.compute(pass, portals, p, d);
                    if new == entry[ci] && !dirty.contains(p) {
                        break;
                    }
                    if let Some(e) = self.next.get_mut(p) {
                        e[ci] = new;
                    }
                    p = p + back;
                }
            }
        }
    }

    /// First cell (and direction) where `self` disagrees with `fresh`.
    pub(crate) fn first_difference(&self, fresh: &JumpTable) -> Option<(Point, Option<Direction>)> {
        for (p, &bits) in self.records.iter() {
            if fresh.records.at(p) != Some(bits) {
                return Some((p, None));
            }
        }
        for (p, entry) in self.next.iter() {
            let Some(other) = fresh.next.at(p) else {
                return Some((p, None));
            };
            if let Some(ci) = (0..4).find(|&ci| entry[ci] != other[ci]) {
                return Some((p, Some(CARDINALS[ci])));
            }
        }
        None
    }
}
