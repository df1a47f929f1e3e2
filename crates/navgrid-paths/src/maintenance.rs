//! Keeping the derived grids in step with the map: full builds (fanned out
//! over rayon) and incremental rebuilds after terrain or portal changes.

use log::debug;
use navgrid_core::Point;
use rayon::prelude::*;

use crate::config::InitFlags;
use crate::pass::PassBuilder;
use crate::range::PathFindRange;
use crate::store::{GridStore, Layer, PassView};

impl GridStore {
    /// Rebuild every grid selected by `flags` from scratch: pass grids one
    /// task per move type, then layers one task per layer.
    pub(crate) fn build_all(&mut self, flags: InitFlags, parallel: bool) {
        let GridStore {
            obstacles,
            move_types,
            sizes,
            footprints,
            pass,
            layers,
            portals,
            ..
        } = self;

        if flags.contains(InitFlags::PASS) {
            let builder = PassBuilder {
                obstacles,
                sizes,
                footprints,
            };
            if parallel {
                pass.par_iter_mut()
                    .zip(move_types.par_iter())
                    .for_each(|(grid, &mt)| builder.build(mt, grid));
            } else {
                for (grid, &mt) in pass.iter_mut().zip(move_types.iter()) {
                    builder.build(mt, grid);
                }
            }
        }

        let areas = flags.contains(InitFlags::AREAS);
        let jumps = flags.contains(InitFlags::JUMP_POINTS);
        if areas || jumps {
            let pass = &*pass;
            let portals = &*portals;
            let build_layer = |layer: &mut Layer| {
                let view = PassView::new(&pass[layer.move_index], layer.size);
                if areas {
                    layer.areas.build(view);
                }
                if jumps {
                    layer.jumps.build(view, portals);
                }
            };
            if parallel {
                layers.par_iter_mut().for_each(build_layer);
            } else {
                layers.iter_mut().for_each(build_layer);
            }
        }

        debug!(
            "full build of {}x{} map: {} move types, {} layers, parallel={parallel}",
            self.width,
            self.height,
            self.move_types.len(),
            self.layers.len()
        );
    }

    /// Effective terrain changed inside `changed`: recompute pass grids
    /// wherever a footprint can overlap the change, then rebuild jump
    /// points and areas of the layers whose passability moved, each inside
    /// its own changed box.
    pub(crate) fn terrain_changed(&mut self, changed: PathFindRange, flags: InitFlags) {
        if !flags.contains(InitFlags::PASS) {
            return;
        }
        let reach = self.reach;
        let affected = PathFindRange {
            min: changed.min - reach.max,
            max: changed.max - reach.min,
        };
        let Some(affected) = affected.clip(self.width, self.height) else {
            return;
        };

        let GridStore {
            width,
            height,
            obstacles,
            move_types,
            sizes,
            footprints,
            pass,
            layers,
            portals,
            ..
        } = self;
        let builder = PassBuilder {
            obstacles,
            sizes,
            footprints,
        };
        let per_move: Vec<Vec<Option<PathFindRange>>> = pass
            .iter_mut()
            .zip(move_types.iter())
            .map(|(grid, &mt)| builder.rebuild(mt, grid, affected))
            .collect();

        let mut touched = 0;
        for layer in layers.iter_mut() {
            let Some(moved) = per_move[layer.move_index][layer.size_index] else {
                continue;
            };
            touched += 1;
            let view = PassView::new(&pass[layer.move_index], layer.size);
            if flags.contains(InitFlags::JUMP_POINTS) {
                if let Some(dirty) = moved.inflate(1).clip(*width, *height) {
                    layer.jumps.rebuild(view, portals, dirty);
                }
            }
            if flags.contains(InitFlags::AREAS) {
                layer.areas.rebuild(view, moved);
            }
        }
        debug!("terrain change {changed}: pass rebuilt over {affected}, {touched} layers touched");
    }

    /// A portal endpoint at `at` was added or removed.
    pub(crate) fn portal_changed(&mut self, at: Point, flags: InitFlags) {
        if !flags.contains(InitFlags::JUMP_POINTS) {
            return;
        }
        let GridStore {
            pass,
            layers,
            portals,
            ..
        } = self;
        for layer in layers.iter_mut() {
            let view = PassView::new(&pass[layer.move_index], layer.size);
            layer.jumps.refresh_point(view, portals, at);
        }
        debug!("portal change at {at}: {} layers refreshed", layers.len());
    }
}
