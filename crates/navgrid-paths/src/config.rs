//! Engine configuration: [`NavConfig`], [`MoveGroup`] and [`InitFlags`].

use std::ops::{BitAnd, BitOr};

use navgrid_core::MoveType;

/// Default number of node expansions a short-path query may perform.
pub const DEFAULT_ASTAR_STEP_BUDGET: u32 = 2048;

// ---------------------------------------------------------------------------
// MoveGroup
// ---------------------------------------------------------------------------

/// Move types whose agents share one moveable-occupancy grid, i.e. block
/// each other during short-path searches.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveGroup {
    pub move_types: Vec<MoveType>,
}

impl MoveGroup {
    pub fn new(move_types: impl IntoIterator<Item = MoveType>) -> Self {
        Self {
            move_types: move_types.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// NavConfig
// ---------------------------------------------------------------------------

/// Static configuration of a [`Navigator`](crate::Navigator).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavConfig {
    pub move_groups: Vec<MoveGroup>,
    /// Maximum expansions of a short-path query before it gives up with a
    /// best-effort path.
    pub astar_step_budget: u32,
    /// Build pass grids and layers on the rayon thread pool.
    pub parallel_build: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            move_groups: Vec::new(),
            astar_step_budget: DEFAULT_ASTAR_STEP_BUDGET,
            parallel_build: true,
        }
    }
}

impl NavConfig {
    /// Add a move group.
    pub fn with_move_group(mut self, group: MoveGroup) -> Self {
        self.move_groups.push(group);
        self
    }

    pub fn with_astar_step_budget(mut self, budget: u32) -> Self {
        self.astar_step_budget = budget;
        self
    }

    pub fn with_parallel_build(mut self, parallel: bool) -> Self {
        self.parallel_build = parallel;
        self
    }

    /// All configured move types, group by group.
    pub fn move_types(&self) -> impl Iterator<Item = MoveType> + '_ {
        self.move_groups
            .iter()
            .flat_map(|g| g.move_types.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// InitFlags
// ---------------------------------------------------------------------------

/// Which derived grids [`Navigator::initialize`](crate::Navigator::initialize)
/// builds and keeps up to date.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitFlags(pub u8);

impl InitFlags {
    pub const NONE: Self = Self(0);
    pub const PASS: Self = Self(1 << 0);
    pub const AREAS: Self = Self(1 << 1);
    pub const JUMP_POINTS: Self = Self(1 << 2);
    /// Maintain derived grids incrementally; without it every mutation
    /// triggers a full rebuild.
    pub const INCREMENTAL: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    /// Whether this mask contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InitFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for InitFlags {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_defaults() {
        let cfg = NavConfig::default()
            .with_move_group(MoveGroup::new([MoveType(1), MoveType(2)]))
            .with_move_group(MoveGroup::new([MoveType(4)]))
            .with_astar_step_budget(64)
            .with_parallel_build(false);
        assert_eq!(cfg.astar_step_budget, 64);
        assert!(!cfg.parallel_build);
        let types: Vec<_> = cfg.move_types().collect();
        assert_eq!(types, vec![MoveType(1), MoveType(2), MoveType(4)]);
        assert_eq!(NavConfig::default().astar_step_budget, DEFAULT_ASTAR_STEP_BUDGET);
    }

    #[test]
    fn flags() {
        let f = InitFlags::PASS | InitFlags::AREAS;
        assert!(f.contains(InitFlags::PASS));
        assert!(!f.contains(InitFlags::JUMP_POINTS));
        assert_eq!(f & InitFlags::AREAS, InitFlags::AREAS);
        assert!(InitFlags::ALL.contains(f | InitFlags::INCREMENTAL | InitFlags::JUMP_POINTS));
        assert!(InitFlags::NONE.is_empty());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let cfg = NavConfig::default()
            .with_move_group(MoveGroup::new([MoveType(3)]))
            .with_astar_step_budget(100);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: NavConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
        let json = serde_json::to_string(&InitFlags::ALL).unwrap();
        let back: InitFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InitFlags::ALL);
    }
}
