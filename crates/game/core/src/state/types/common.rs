use std::fmt;

/// Unique identifier for any creature tracked in the world.
///
/// Identifiers double as non-owning handles: holding an `EntityId` never keeps
/// the creature alive, and every use must resolve it through the
/// [`CreatureRegistry`](super::CreatureRegistry) first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// First identifier handed out to monsters; players use the range below it.
    pub const FIRST_MONSTER: Self = Self(0x4000_0000);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tile coordinate: `x`/`y` on the floor plane and `z` as the floor index.
///
/// Floors `0..=7` are above ground (7 is ground level), `8..=15` are
/// underground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl Position {
    /// Highest floor that still counts as "above ground".
    pub const GROUND_FLOOR: u8 = 7;

    pub const fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Signed x offset `self - other`.
    #[inline]
    pub const fn offset_x(self, other: Position) -> i32 {
        self.x - other.x
    }

    /// Signed y offset `self - other`.
    #[inline]
    pub const fn offset_y(self, other: Position) -> i32 {
        self.y - other.y
    }

    #[inline]
    pub const fn distance_x(self, other: Position) -> i32 {
        self.offset_x(other).abs()
    }

    #[inline]
    pub const fn distance_y(self, other: Position) -> i32 {
        self.offset_y(other).abs()
    }

    #[inline]
    pub const fn distance_z(self, other: Position) -> i32 {
        (self.z as i32 - other.z as i32).abs()
    }

    /// Chebyshev distance on the floor plane.
    #[inline]
    pub fn chebyshev(self, other: Position) -> i32 {
        self.distance_x(other).max(self.distance_y(other))
    }

    /// Manhattan distance on the floor plane.
    #[inline]
    pub fn manhattan(self, other: Position) -> i32 {
        self.distance_x(other) + self.distance_y(other)
    }

    /// True when `other` lies within `range_x`/`range_y` on each axis (same
    /// floor not required).
    pub fn in_range(self, other: Position, range_x: i32, range_y: i32) -> bool {
        self.distance_x(other) <= range_x && self.distance_y(other) <= range_y
    }

    /// Neighbouring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy, self.z)
    }

    /// Position shifted by a raw delta on the same floor.
    pub fn translate(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z)
    }

    /// Viewport visibility check between two floors.
    ///
    /// Above ground nothing underground is visible; underground only floors
    /// within two levels are. The x/y window shifts with the floor offset.
    pub fn can_see(self, target: Position, range_x: i32, range_y: i32) -> bool {
        if self.z <= Self::GROUND_FLOOR {
            if target.z > Self::GROUND_FLOOR {
                return false;
            }
        } else if self.distance_z(target) > 2 {
            return false;
        }

        let offset_z = self.z as i32 - target.z as i32;
        target.x >= self.x - range_x + offset_z
            && target.x <= self.x + range_x + offset_z
            && target.y >= self.y - range_y + offset_z
            && target.y <= self.y + range_y + offset_z
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Eight-way facing and stepping direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    North,
    East,
    #[default]
    South,
    West,
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// Unit delta of this direction. North is negative y.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (1, -1),
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::SouthWest | Direction::SouthEast | Direction::NorthWest | Direction::NorthEast
        )
    }

    /// Direction of the first step from `from` towards `to`.
    pub fn towards(from: Position, to: Position) -> Direction {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        match (dx.signum(), dy.signum()) {
            (-1, -1) => Direction::NorthWest,
            (1, -1) => Direction::NorthEast,
            (-1, 1) => Direction::SouthWest,
            (1, 1) => Direction::SouthEast,
            (-1, 0) => Direction::West,
            (1, 0) => Direction::East,
            (0, -1) => Direction::North,
            _ => Direction::South,
        }
    }
}

/// Milliseconds of world time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_above_ground_hides_underground() {
        let me = Position::new(100, 100, 7);
        assert!(me.can_see(Position::new(109, 109, 7), 9, 9));
        assert!(!me.can_see(Position::new(110, 100, 7), 9, 9));
        assert!(!me.can_see(Position::new(100, 100, 8), 9, 9));
    }

    #[test]
    fn viewport_underground_limits_floor_distance() {
        let me = Position::new(50, 50, 10);
        assert!(me.can_see(Position::new(50, 50, 12), 9, 9));
        assert!(!me.can_see(Position::new(50, 50, 13), 9, 9));
    }

    #[test]
    fn towards_picks_diagonals() {
        let from = Position::new(5, 5, 7);
        assert_eq!(Direction::towards(from, Position::new(7, 3, 7)), Direction::NorthEast);
        assert_eq!(Direction::towards(from, Position::new(5, 9, 7)), Direction::South);
    }
}
