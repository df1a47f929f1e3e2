//! Reusable search scratch space.
//!
//! Every query borrows one [`SearchScratch`] from an [`ObjectPool`] through
//! a [`Pooled`] guard, so that repeated queries incur no allocations after
//! warm-up and concurrent queries never share buffers.

use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use navgrid_core::Point;

use crate::direction::Direction;
use crate::types::EntityId;

/// Parent handle of a root node.
pub(crate) const NO_PARENT: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Search nodes
// ---------------------------------------------------------------------------

/// A node of the search arena, addressed by its `u32` handle.
#[derive(Clone, Debug)]
pub(crate) struct SearchNode {
    pub(crate) parent: u32,
    pub(crate) point: Point,
    pub(crate) g: i32,
    pub(crate) h: i32,
    /// Direction of the last move into this node; `None` for the start and
    /// for portal exits.
    pub(crate) arrival: Option<Direction>,
    /// Portal traversed to reach this node from its parent.
    pub(crate) portal: Option<EntityId>,
    pub(crate) closed: bool,
}

/// Open-list entry, ordered so that `BinaryHeap` (a max-heap) pops the
/// smallest `(f, h, handle)` first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OpenEntry {
    pub(crate) f: i32,
    pub(crate) h: i32,
    pub(crate) handle: u32,
    /// `g` at push time; entries whose node has since improved are stale.
    pub(crate) g: i32,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.handle.cmp(&self.handle))
            .then_with(|| other.g.cmp(&self.g))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchScratch
// ---------------------------------------------------------------------------

/// Containers used by one query.
#[derive(Debug, Default)]
pub struct SearchScratch {
    pub(crate) open: BinaryHeap<OpenEntry>,
    pub(crate) nodes: Vec<SearchNode>,
    pub(crate) index: HashMap<(Point, Option<Direction>), u32>,
    pub(crate) ignore: Vec<EntityId>,
    pub(crate) area_visited: Vec<u16>,
    pub(crate) area_queue: VecDeque<u16>,
    pub(crate) handles: Vec<u32>,
    pub(crate) points: Vec<Point>,
    pub(crate) smooth: Vec<Point>,
}

impl SearchScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every container, keeping capacity.
    pub fn clear(&mut self) {
        self.open.clear();
        self.nodes.clear();
        self.index.clear();
        self.ignore.clear();
        self.area_visited.clear();
        self.area_queue.clear();
        self.handles.clear();
        self.points.clear();
        self.smooth.clear();
    }

    /// Push a node reached with cost `g`, or improve an existing node with
    /// the same key. Returns the node's handle, or `None` when the existing
    /// node is at least as good.
    pub(crate) fn relax(
        &mut self,
        parent: u32,
        point: Point,
        arrival: Option<Direction>,
        portal: Option<EntityId>,
        g: i32,
        h: i32,
    ) -> Option<u32> {
        let key = (point, arrival);
        let handle = match self.index.get(&key) {
            Some(&handle) => {
                let node = &mut self.nodes[handle as usize];
                if g >= node.g {
                    return None;
                }
                node.parent = parent;
                node.g = g;
                node.portal = portal;
                node.closed = false;
                handle
            }
            None => {
                let handle = self.nodes.len() as u32;
                self.nodes.push(SearchNode {
                    parent,
                    point,
                    g,
                    h,
                    arrival,
                    portal,
                    closed: false,
                });
                self.index.insert(key, handle);
                handle
            }
        };
        self.open.push(OpenEntry {
            f: g + h,
            h,
            handle,
            g,
        });
        Some(handle)
    }

    /// Pop the best live open entry, skipping stale and closed ones, and
    /// close it.
    pub(crate) fn pop(&mut self) -> Option<u32> {
        while let Some(entry) = self.open.pop() {
            let node = &mut self.nodes[entry.handle as usize];
            if node.closed || node.g != entry.g {
                continue;
            }
            node.closed = true;
            return Some(entry.handle);
        }
        None
    }

    /// Handles from the root to `handle`, in path order.
    pub(crate) fn chain(&self, mut handle: u32, out: &mut Vec<u32>) {
        out.clear();
        while handle != NO_PARENT {
            out.push(handle);
            handle = self.nodes[handle as usize].parent;
        }
        out.reverse();
    }
}

// ---------------------------------------------------------------------------
// ObjectPool
// ---------------------------------------------------------------------------

/// Source of search scratch space. Implementations must be shareable
/// between query threads.
pub trait ObjectPool: Send + Sync {
    fn acquire(&self) -> SearchScratch;
    fn release(&self, scratch: SearchScratch);
}

/// A mutex-guarded free list, capped at `limit` idle entries.
#[derive(Debug)]
pub struct SharedPool {
    free: Mutex<Vec<SearchScratch>>,
    limit: usize,
}

impl SharedPool {
    pub fn new(limit: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            limit,
        }
    }

    /// Number of idle scratch entries.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for SharedPool {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ObjectPool for SharedPool {
    fn acquire(&self) -> SearchScratch {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default()
    }

    fn release(&self, mut scratch: SearchScratch) {
        scratch.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.limit {
            free.push(scratch);
        }
    }
}

/// Scratch space borrowed from a pool; returned on drop, including during
/// unwinding.
pub struct Pooled<'a> {
    pool: &'a dyn ObjectPool,
    scratch: SearchScratch,
}

impl<'a> Pooled<'a> {
    pub fn new(pool: &'a dyn ObjectPool) -> Self {
        let mut scratch = pool.acquire();
        scratch.clear();
        Self { pool, scratch }
    }
}

impl Deref for Pooled<'_> {
    type Target = SearchScratch;
    fn deref(&self) -> &SearchScratch {
        &self.scratch
    }
}

impl DerefMut for Pooled<'_> {
    fn deref_mut(&mut self) -> &mut SearchScratch {
        &mut self.scratch
    }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.scratch));
    }
}
