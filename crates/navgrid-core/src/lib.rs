//! **navgrid-core**: core types for the *navgrid* pathfinding engine.
//!
//! This crate provides the foundational types shared by the engine:
//! geometry primitives, a dense owned grid, and the terrain / movement
//! bitmasks that decide which cells an agent may stand on.

pub mod geom;
pub mod grid;
pub mod mask;

pub use geom::{Point, Range, RangeIter};
pub use grid::Grid;
pub use mask::{MoveType, TerrainMask};
