//! Area labelling: every 4-connected component of passable cells in a layer
//! carries one id, so that "can `a` reach `b` at all" is an O(1) lookup.
//!
//! Floods use an explicit stack and generation-stamped visits, so a rebuild
//! never clears the whole visit grid.

use std::collections::BTreeMap;

use log::warn;
use navgrid_core::{Grid, Point};

use crate::range::PathFindRange;
use crate::store::PassView;

/// Area label of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaId {
    /// Passable, waiting for a label. Never visible after a rebuild.
    #[default]
    Unprocessed,
    Blocked,
    Id(u16),
}

/// A maximal run of passable cells on the ring around a rebuild range.
#[derive(Copy, Clone, Debug)]
struct RingRun {
    seed: Point,
    id: Option<u16>,
    len: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct AreaGrid {
    ids: Grid<AreaId>,
    counts: BTreeMap<u16, u32>,
    next_id: u16,
    stamps: Grid<u32>,
    generation: u32,
    stack: Vec<Point>,
    runs: Vec<RingRun>,
    used: Vec<u16>,
}

impl AreaGrid {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        Self {
            ids: Grid::new(width, height, AreaId::Unprocessed),
            counts: BTreeMap::new(),
            next_id: 1,
            stamps: Grid::new(width, height, 0),
            generation: 0,
            stack: Vec::new(),
            runs: Vec::new(),
            used: Vec::new(),
        }
    }

    /// Label of `p`; `Blocked` off the map.
    #[inline]
    pub(crate) fn at(&self, p: Point) -> AreaId {
        self.ids.at(p).unwrap_or(AreaId::Blocked)
    }

    /// Live cell count of each id.
    pub(crate) fn counts(&self) -> &BTreeMap<u16, u32> {
        &self.counts
    }

    pub(crate) fn ids(&self) -> &Grid<AreaId> {
        &self.ids
    }

    fn count(&self, id: u16) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
        self.generation
    }

    #[inline]
    fn stamped(&self, p: Point) -> bool {
        self.stamps.at(p) == Some(self.generation)
    }

    /// Relabel `p`, keeping the counts in step.
    fn relabel(&mut self, p: Point, new: AreaId) {
        let Some(cell) = self.ids.get_mut(p) else {
            return;
        };
        let old = std::mem::replace(cell, new);
        if old == new {
            return;
        }
        if let AreaId::Id(o) = old {
            if let Some(c) = self.counts.get_mut(&o) {
                *c -= 1;
                if *c == 0 {
                    self.counts.remove(&o);
                }
            }
        }
        if let AreaId::Id(n) = new {
            *self.counts.entry(n).or_insert(0) += 1;
        }
    }

    /// A fresh id: the allocator only moves forward and, after wrapping,
    /// skips ids still present on the grid. `None` once every id is live.
    fn alloc(&mut self) -> Option<u16> {
        for _ in 0..u16::MAX {
            let id = self.next_id;
            self.next_id = if id == u16::MAX { 1 } else { id + 1 };
            if !self.counts.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }

    /// Label the whole component of `seed` with `id`.
    fn flood(&mut self, pass: PassView<'_>, seed: Point, id: u16) {
        let stamp = self.generation;
        self.stamps.set(seed, stamp);
        self.stack.clear();
        self.stack.push(seed);
        while let Some(c) = self.stack.pop() {
            self.relabel(c, AreaId::Id(id));
            for n in c.neighbors_4() {
                if pass.passable(n) && !self.stamped(n) {
                    self.stamps.set(n, stamp);
                    self.stack.push(n);
                }
            }
        }
    }

    /// Label every component from scratch, in row-major order of their
    /// first cell.
    pub(crate) fn build(&mut self, pass: PassView<'_>) {
        self.next_generation();
        self.counts.clear();
        self.next_id = 1;
        for i in 0..self.ids.as_slice().len() {
            let p = self.ids.point(i);
            let label = if pass.passable(p) {
                AreaId::Unprocessed
            } else {
                AreaId::Blocked
            };
            self.ids.set(p, label);
        }
        let mut overflowed = false;
        for i in 0..self.ids.as_slice().len() {
            let p = self.ids.point(i);
            if self.ids.at(p) == Some(AreaId::Unprocessed) {
                let id = self.alloc().unwrap_or_else(|| {
                    if !overflowed {
                        warn!("more than {} areas in one layer; the rest share one id", u16::MAX);
                        overflowed = true;
                    }
                    u16::MAX
                });
                self.flood(pass, p, id);
            }
        }
    }

    /// Relabel after passability changed inside `dirty`.
    ///
    /// The interior is reset, then the passable runs on the ring just
    /// outside it are flooded, strongest run first: a run keeps its old id
    /// unless an earlier run of this pass already claimed it. Pockets of
    /// the interior that no run reached get fresh ids.
    pub(crate) fn rebuild(&mut self, pass: PassView<'_>, dirty: PathFindRange) {
        let Some(dirty) = dirty.clip(self.ids.width(), self.ids.height()) else {
            return;
        };
        self.next_generation();

        for p in dirty.iter() {
            let label = if pass.passable(p) {
                AreaId::Unprocessed
            } else {
                AreaId::Blocked
            };
            self.relabel(p, label);
        }

        if !self.flood_dirty(pass, dirty) {
            warn!("area ids exhausted while relabelling {dirty}; rebuilding the layer");
            self.build(pass);
        }
    }

    /// Flood the ring runs and then the pockets of a reset `dirty` range.
    /// False when a fresh id was needed and none was left.
    fn flood_dirty(&mut self, pass: PassView<'_>, dirty: PathFindRange) -> bool {
        self.collect_ring_runs(pass, dirty.inflate(1));
        let mut runs = std::mem::take(&mut self.runs);
        runs.sort_by(|a, b| {
            let key = |r: &RingRun| (r.id.map_or(0, |id| self.count(id)), r.len, r.id);
            key(b).cmp(&key(a))
        });

        self.used.clear();
        let mut complete = true;
        for run in &runs {
            if self.stamped(run.seed) {
                continue;
            }
            let id = match run.id {
                Some(id) if !self.used.contains(&id) => Some(id),
                _ => self.alloc(),
            };
            let Some(id) = id else {
                complete = false;
                break;
            };
            self.used.push(id);
            self.flood(pass, run.seed, id);
        }
        self.runs = runs;
        if !complete {
            return false;
        }

        for p in dirty.iter() {
            if self.ids.at(p) == Some(AreaId::Unprocessed) {
                let Some(id) = self.alloc() else {
                    return false;
                };
                self.flood(pass, p, id);
            }
        }
        true
    }

    /// Walk the border of `ring` clockwise from its top-left corner and
    /// collect maximal runs of passable cells, joining the first and last
    /// runs when they meet across the starting corner.
    fn collect_ring_runs(&mut self, pass: PassView<'_>, ring: PathFindRange) {
        let (min, max) = (ring.min, ring.max);
        let top = (min.x..=max.x).map(|x| Point::new(x, min.y));
        let right = (min.y + 1..=max.y).map(|y| Point::new(max.x, y));
        let bottom = (min.x..max.x).rev().map(|x| Point::new(x, max.y));
        let left = (min.y + 1..max.y).rev().map(|y| Point::new(min.x, y));

        self.runs.clear();
        let mut current: Option<RingRun> = None;
        let mut first_open = None;
        let mut last_open = false;
        for p in top.chain(right).chain(bottom).chain(left) {
            let open = pass.passable(p);
            first_open.get_or_insert(open);
            last_open = open;
            if !open {
                if let Some(run) = current.take() {
                    self.runs.push(run);
                }
                continue;
            }
            match current.as_mut() {
                Some(run) => run.len += 1,
                None => {
                    let id = match self.at(p) {
                        AreaId::Id(id) => Some(id),
                        _ => None,
                    };
                    debug_assert!(id.is_some(), "ring cell {p} has no area id");
                    current = Some(RingRun { seed: p, id, len: 1 });
                }
            }
        }
        if let Some(run) = current {
            self.runs.push(run);
        }
        if self.runs.len() > 1 && first_open == Some(true) && last_open {
            if let Some(last) = self.runs.pop() {
                self.runs[0].len += last.len;
            }
        }
    }
}
