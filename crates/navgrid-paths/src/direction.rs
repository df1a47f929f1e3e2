use navgrid_core::Point;

/// One of the eight grid directions. Y grows down, so `N` is `(0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// The four cardinal directions, in `NextJP` column order.
pub const CARDINALS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

/// The four diagonal directions.
pub const DIAGONALS: [Direction; 4] = [Direction::NE, Direction::SE, Direction::SW, Direction::NW];

/// All eight directions, cardinals first.
pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::N,
    Direction::E,
    Direction::S,
    Direction::W,
    Direction::NE,
    Direction::SE,
    Direction::SW,
    Direction::NW,
];

impl Direction {
    /// Unit step of this direction.
    #[inline]
    pub const fn delta(self) -> Point {
        match self {
            Direction::N => Point::new(0, -1),
            Direction::NE => Point::new(1, -1),
            Direction::E => Point::new(1, 0),
            Direction::SE => Point::new(1, 1),
            Direction::S => Point::new(0, 1),
            Direction::SW => Point::new(-1, 1),
            Direction::W => Point::new(-1, 0),
            Direction::NW => Point::new(-1, -1),
        }
    }

    /// Direction of a unit step, or `None` for zero / non-unit deltas.
    pub const fn from_delta(d: Point) -> Option<Self> {
        match (d.x, d.y) {
            (0, -1) => Some(Direction::N),
            (1, -1) => Some(Direction::NE),
            (1, 0) => Some(Direction::E),
            (1, 1) => Some(Direction::SE),
            (0, 1) => Some(Direction::S),
            (-1, 1) => Some(Direction::SW),
            (-1, 0) => Some(Direction::W),
            (-1, -1) => Some(Direction::NW),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NE | Direction::SE | Direction::SW | Direction::NW
        )
    }

    /// Index into [`CARDINALS`]; `None` for diagonals.
    #[inline]
    pub const fn cardinal_index(self) -> Option<usize> {
        match self {
            Direction::N => Some(0),
            Direction::E => Some(1),
            Direction::S => Some(2),
            Direction::W => Some(3),
            _ => None,
        }
    }

    /// Index into [`DIAGONALS`]; `None` for cardinals.
    #[inline]
    pub const fn diagonal_index(self) -> Option<usize> {
        match self {
            Direction::NE => Some(0),
            Direction::SE => Some(1),
            Direction::SW => Some(2),
            Direction::NW => Some(3),
            _ => None,
        }
    }

    /// Horizontal and vertical components of a diagonal, `(x part, y part)`.
    pub const fn components(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NE => Some((Direction::E, Direction::N)),
            Direction::SE => Some((Direction::E, Direction::S)),
            Direction::SW => Some((Direction::W, Direction::S)),
            Direction::NW => Some((Direction::W, Direction::N)),
            _ => None,
        }
    }

    /// The two directions perpendicular to a cardinal.
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::N | Direction::S => [Direction::E, Direction::W],
            _ => [Direction::N, Direction::S],
        }
    }

    /// The diagonal combining two perpendicular cardinals.
    pub fn combine(a: Direction, b: Direction) -> Option<Direction> {
        Direction::from_delta(a.delta() + b.delta())
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
        }
    }

    /// Bit of this direction inside a [`DirSet`].
    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A small set of directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirSet(u8);

impl DirSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0xFF);

    #[inline]
    pub fn insert(&mut self, d: Direction) {
        self.0 |= d.bit();
    }

    #[inline]
    pub const fn contains(self, d: Direction) -> bool {
        self.0 & d.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in [`ALL_DIRECTIONS`] order: cardinals before diagonals.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        ALL_DIRECTIONS.into_iter().filter(move |&d| self.contains(d))
    }
}

impl FromIterator<Direction> for DirSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirSet::EMPTY;
        for d in iter {
            set.insert(d);
        }
        set
    }
}
