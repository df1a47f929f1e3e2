//! Error types: construction / configuration failures ([`NavError`]) and
//! broken internal invariants reported by [`Navigator::verify`](crate::Navigator::verify)
//! ([`InvariantViolation`]).

use navgrid_core::{MoveType, Point};
use thiserror::Error;

use crate::direction::Direction;
use crate::types::CollisionSize;

/// Errors raised while building or initialising a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("invalid map size {width}x{height}: both sides must be within 1..=65535")]
    InvalidMapSize { width: i32, height: i32 },

    #[error("no collision sizes configured")]
    NoCollisionSizes,

    #[error("{0} is configured more than once")]
    DuplicateCollisionSize(CollisionSize),

    #[error("{0} has no footprint")]
    MissingFootprint(CollisionSize),

    #[error("footprint of {larger} does not contain the footprint of {smaller}")]
    FootprintNotNested {
        smaller: CollisionSize,
        larger: CollisionSize,
    },

    #[error("no move types configured")]
    NoMoveTypes,

    #[error("move type {0} appears in more than one move group")]
    DuplicateMoveType(MoveType),

    #[error("{0} cannot be built without the pass grid")]
    MissingPassGrid(&'static str),
}

/// A derived grid that disagrees with a from-scratch rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("pass grid of move type {move_type} is stale at {point}")]
    PassStale { move_type: MoveType, point: Point },

    #[error("layer {layer}: passable cell {point} has no area id")]
    AreaUnlabelled { layer: usize, point: Point },

    #[error("layer {layer}: blocked cell {point} carries an area id")]
    AreaOnBlocked { layer: usize, point: Point },

    #[error("layer {layer}: adjacent cells {a} and {b} have different area ids")]
    AreaSeam { layer: usize, a: Point, b: Point },

    #[error("layer {layer}: area {id} is split into several components")]
    SplitArea { layer: usize, id: u16 },

    #[error("layer {layer}: area {id} has {counted} cells but records {recorded}")]
    AreaCountMismatch {
        layer: usize,
        id: u16,
        counted: u32,
        recorded: u32,
    },

    #[error("layer {layer}: jump records at {point} are stale")]
    StaleJumpRecord { layer: usize, point: Point },

    #[error("layer {layer}: next jump entry at {point} towards {dir:?} is stale")]
    StaleNextJump {
        layer: usize,
        point: Point,
        dir: Direction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let e = NavError::FootprintNotNested {
            smaller: CollisionSize(0),
            larger: CollisionSize(1),
        };
        assert_eq!(
            e.to_string(),
            "footprint of size 1 does not contain the footprint of size 0"
        );
        let v = InvariantViolation::SplitArea { layer: 2, id: 7 };
        assert_eq!(v.to_string(), "layer 2: area 7 is split into several components");
    }
}
