//! Consistency checks of the derived grids against from-scratch rebuilds.
//!
//! With the `diagnostics` feature every mutation runs [`Navigator::verify`]
//! and panics on the first violation.

use std::collections::BTreeMap;

use navgrid_core::{Grid, Point};

use crate::Navigator;
use crate::area::AreaId;
use crate::config::InitFlags;
use crate::error::InvariantViolation;
use crate::jump::JumpTable;
use crate::pass::PassBuilder;

impl Navigator {
    /// Check every built grid:
    ///
    /// - pass grids equal a fresh computation;
    /// - every passable cell has an area id, blocked cells none, and each
    ///   id covers exactly one 4-connected component with the recorded
    ///   cell count;
    /// - jump records and `next` entries equal a fresh build.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let store = &self.store;
        if self.built.contains(InitFlags::PASS) {
            let builder = PassBuilder {
                obstacles: &store.obstacles,
                sizes: &store.sizes,
                footprints: &store.footprints,
            };
            for (grid, &move_type) in store.pass.iter().zip(&store.move_types) {
                if let Some((point, _)) = grid.iter().find(|&(p, &v)| v != builder.fit(move_type, p)) {
                    return Err(InvariantViolation::PassStale { move_type, point });
                }
            }
        }

        for (layer, l) in store.layers.iter().enumerate() {
            let view = store.pass_view(layer);
            if self.built.contains(InitFlags::AREAS) {
                self.verify_areas(layer)?;
            }
            if self.built.contains(InitFlags::JUMP_POINTS) {
                let mut fresh = JumpTable::new(store.width, store.height);
                fresh.build(view, &store.portals);
                match l.jumps.first_difference(&fresh) {
                    None => {}
                    Some((point, None)) => {
                        return Err(InvariantViolation::StaleJumpRecord { layer, point });
                    }
                    Some((point, Some(dir))) => {
                        return Err(InvariantViolation::StaleNextJump { layer, point, dir });
                    }
                }
            }
        }
        Ok(())
    }

    fn verify_areas(&self, layer: usize) -> Result<(), InvariantViolation> {
        let view = self.store.pass_view(layer);
        let areas = &self.store.layers[layer].areas;
        let ids = areas.ids();

        let mut counted: BTreeMap<u16, u32> = BTreeMap::new();
        for (p, &id) in ids.iter() {
            match (view.passable(p), id) {
                (true, AreaId::Id(id)) => *counted.entry(id).or_insert(0) += 1,
                (true, _) => return Err(InvariantViolation::AreaUnlabelled { layer, point: p }),
                (false, AreaId::Blocked) => {}
                (false, _) => return Err(InvariantViolation::AreaOnBlocked { layer, point: p }),
            }
            for q in [p.shift(1, 0), p.shift(0, 1)] {
                if view.passable(p) && view.passable(q) && ids.at(q) != Some(id) {
                    return Err(InvariantViolation::AreaSeam { layer, a: p, b: q });
                }
            }
        }

        for (&id, &recorded) in areas.counts() {
            let counted = counted.get(&id).copied().unwrap_or(0);
            if counted != recorded {
                return Err(InvariantViolation::AreaCountMismatch {
                    layer,
                    id,
                    counted,
                    recorded,
                });
            }
        }
        if let Some((&id, &counted)) = counted.iter().find(|(id, _)| !areas.counts().contains_key(id)) {
            return Err(InvariantViolation::AreaCountMismatch {
                layer,
                id,
                counted,
                recorded: 0,
            });
        }

        // with no seams, one flood per id must cover its whole count
        let mut seen = Grid::new(ids.width(), ids.height(), false);
        let mut stack: Vec<Point> = Vec::new();
        let mut flooded: Vec<u16> = Vec::new();
        for (p, &id) in ids.iter() {
            let AreaId::Id(id) = id else {
                continue;
            };
            if seen.at(p) == Some(true) {
                continue;
            }
            if flooded.contains(&id) {
                return Err(InvariantViolation::SplitArea { layer, id });
            }
            flooded.push(id);
            seen.set(p, true);
            stack.push(p);
            while let Some(c) = stack.pop() {
                for n in c.neighbors_4() {
                    if view.passable(n) && seen.at(n) == Some(false) {
                        seen.set(n, true);
                        stack.push(n);
                    }
                }
            }
        }
        Ok(())
    }
}
