//! Deterministic grid pathfinding for agents of several move types and
//! collision sizes sharing one mutable map.
//!
//! A [`Navigator`] owns the map state and the grids derived from it, and
//! keeps them in step as obstacles, moveables and portals change:
//!
//! | Grid | Per | Used by |
//! |---|---|---|
//! | pass grid | move type | every query |
//! | area labels | move type and size | [`Navigator::check_area_is_same`], long-path gating |
//! | jump-point tables | move type and size | [`Navigator::get_long_path`] |
//!
//! Two searches run on top of them:
//!
//! - **Short paths** ([`Navigator::get_short_path`]): bounded 4-direction
//!   A* that treats moveables as walls, with a best-effort answer when the
//!   step budget runs out.
//! - **Long paths** ([`Navigator::get_long_path`]): 8-direction JPS+ that
//!   ignores moveables and walks through portals in either direction.
//!
//! Queries take `&self` and reuse scratch space from an [`ObjectPool`], so
//! they can run concurrently after warm-up without allocating.

mod area;
mod astar;
mod config;
mod diagnostics;
mod direction;
mod distance;
mod error;
mod gate;
mod jps;
mod jump;
mod maintenance;
mod navigator;
mod observer;
mod pass;
mod path;
mod pool;
mod providers;
mod range;
mod store;
mod types;

pub use area::AreaId;
pub use config::{DEFAULT_ASTAR_STEP_BUDGET, InitFlags, MoveGroup, NavConfig};
pub use direction::{ALL_DIRECTIONS, CARDINALS, DIAGONALS, DirSet, Direction};
pub use distance::{DIAGONAL_COST, STRAIGHT_COST, chebyshev, manhattan, octile};
pub use error::{InvariantViolation, NavError};
pub use jump::{JumpDistance, JumpRecord};
pub use navigator::Navigator;
pub use observer::{SearchObserver, TraceEvent, TraceRecorder};
pub use path::{PathRequest, PathResult, PathStatus};
pub use pool::{ObjectPool, Pooled, SearchScratch, SharedPool};
pub use providers::{CollisionProvider, FootprintTable, TerrainGrid, TerrainProvider};
pub use range::PathFindRange;
pub use store::{MAX_MAP_SIDE, Portal};
pub use types::{CollisionSize, EntityId};

pub use navgrid_core::{MoveType, Point, TerrainMask};
