use bitflags::bitflags;

use crate::state::Position;

/// Static map oracle exposing tile layout and line-of-sight.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;

    /// Tile at `position`, `None` outside the map or on an empty tile.
    fn tile(&self, position: Position) -> Option<StaticTile>;

    /// Whether nothing blocks the straight line between two tiles.
    ///
    /// With `same_floor` the check fails outright when the floors differ.
    fn is_sight_clear(&self, from: Position, to: Position, same_floor: bool) -> bool;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

bitflags! {
    /// Static properties of a map tile.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFlags: u8 {
        /// Nothing may stand on the tile.
        const BLOCK_SOLID = 1 << 0;
        /// Walkable, but pathfinding and pushing avoid it.
        const BLOCK_PATH = 1 << 1;
        const PROTECTION_ZONE = 1 << 2;
        const FLOOR_CHANGE = 1 << 3;
        /// Blocks line of sight (walls).
        const BLOCK_SIGHT = 1 << 4;
    }
}

/// Immutable descriptor for a tile in the static layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    pub flags: TileFlags,
}

impl StaticTile {
    pub const fn new(flags: TileFlags) -> Self {
        Self { flags }
    }

    pub const fn floor() -> Self {
        Self::new(TileFlags::empty())
    }

    pub const fn wall() -> Self {
        Self::new(TileFlags::BLOCK_SOLID.union(TileFlags::BLOCK_SIGHT))
    }

    pub fn is_walkable(self) -> bool {
        !self.flags.contains(TileFlags::BLOCK_SOLID)
    }

    pub fn blocks_path(self) -> bool {
        self.flags
            .intersects(TileFlags::BLOCK_SOLID | TileFlags::BLOCK_PATH)
    }

    pub fn is_protection_zone(self) -> bool {
        self.flags.contains(TileFlags::PROTECTION_ZONE)
    }

    pub fn changes_floor(self) -> bool {
        self.flags.contains(TileFlags::FLOOR_CHANGE)
    }
}
