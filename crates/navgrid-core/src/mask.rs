//! Terrain and movement bitmasks: [`TerrainMask`] and [`MoveType`].

use std::fmt;
use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// TerrainMask
// ---------------------------------------------------------------------------

/// Bitmask of terrain kinds present on a cell.
///
/// The meaning of each bit is up to the caller (land, shallow water, deep
/// water, ...). An empty mask is a cell nothing can stand on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainMask(pub u32);

impl TerrainMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Whether this mask contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether the mask is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TerrainMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for TerrainMask {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// MoveType
// ---------------------------------------------------------------------------

/// Bitmask of terrain kinds an agent may stand on.
///
/// A cell is walkable for a move type when its terrain shares at least one
/// bit with the move type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveType(pub u32);

impl MoveType {
    /// Whether an agent of this move type can stand on `terrain`.
    #[inline]
    pub const fn can_traverse(self, terrain: TerrainMask) -> bool {
        (self.0 & terrain.0) != 0
    }
}

impl BitOr for MoveType {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAND: TerrainMask = TerrainMask(1 << 0);
    const WATER: TerrainMask = TerrainMask(1 << 1);

    #[test]
    fn terrain_ops() {
        let both = LAND | WATER;
        assert!(both.contains(LAND));
        assert!(!LAND.contains(both));
        assert_eq!(both & WATER, WATER);
        assert!(TerrainMask::NONE.is_empty());
    }

    #[test]
    fn move_type_traversal() {
        let walker = MoveType(LAND.0);
        let amphibian = MoveType(LAND.0) | MoveType(WATER.0);
        assert!(walker.can_traverse(LAND));
        assert!(!walker.can_traverse(WATER));
        assert!(amphibian.can_traverse(WATER));
        assert!(!amphibian.can_traverse(TerrainMask::NONE));
    }

    #[test]
    fn move_type_display_is_hex() {
        assert_eq!(MoveType(0x12).to_string(), "0x12");
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn masks_round_trip() {
        let json = serde_json::to_string(&MoveType(5)).unwrap();
        let back: MoveType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MoveType(5));
        let json = serde_json::to_string(&TerrainMask(3)).unwrap();
        let back: TerrainMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TerrainMask(3));
    }
}
