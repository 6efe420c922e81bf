//! Static tile layout served through [`game_core::MapOracle`].
use std::collections::HashMap;

use game_content::MapData;
use game_core::{MapDimensions, MapOracle, Position, StaticTile, TileFlags};

/// MapOracle implementation with static map data
///
/// Holds immutable map structure that doesn't change during gameplay.
/// Positions without a tile are void.
pub struct GridMap {
    dimensions: MapDimensions,
    tiles: HashMap<Position, StaticTile>,
}

impl GridMap {
    pub fn new(dimensions: MapDimensions, tiles: HashMap<Position, StaticTile>) -> Self {
        Self { dimensions, tiles }
    }

    /// Plain ground on the ground floor, without walls.
    pub fn open(width: u32, height: u32) -> Self {
        let dimensions = MapDimensions::new(width, height);
        let mut tiles = HashMap::new();
        for x in 0..width as i32 {
            for y in 0..height as i32 {
                tiles.insert(
                    Position::new(x, y, Position::GROUND_FLOOR),
                    StaticTile::floor(),
                );
            }
        }
        Self::new(dimensions, tiles)
    }

    pub fn set_tile(&mut self, position: Position, tile: StaticTile) {
        self.tiles.insert(position, tile);
    }

    fn blocks_sight(&self, position: Position) -> bool {
        self.tiles
            .get(&position)
            .is_some_and(|tile| tile.flags.contains(TileFlags::BLOCK_SIGHT))
    }

    /// Walks the Bresenham line between two tiles on `z`, endpoints excluded.
    fn line_clear(&self, from: Position, to: Position, z: u8) -> bool {
        let (dx, dy) = ((to.x - from.x).abs(), -(to.y - from.y).abs());
        let (sx, sy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
        let (mut x, mut y) = (from.x, from.y);
        let mut err = dx + dy;

        loop {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            if x == to.x && y == to.y {
                return true;
            }
            if self.blocks_sight(Position::new(x, y, z)) {
                return false;
            }
        }
    }
}

impl From<&MapData> for GridMap {
    fn from(data: &MapData) -> Self {
        Self::new(data.dimensions, data.tiles.clone())
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        if !self.dimensions.contains(position) {
            return None;
        }
        self.tiles.get(&position).copied()
    }

    fn is_sight_clear(&self, from: Position, to: Position, same_floor: bool) -> bool {
        if from.x == to.x && from.y == to.y && from.z == to.z {
            return true;
        }
        if from.z == to.z {
            return self.line_clear(from, to, from.z);
        }
        if same_floor {
            return false;
        }

        // Looking across floors needs a clear line on the upper floor and
        // open air above the lower endpoint.
        let (upper, lower) = if from.z < to.z { (from, to) } else { (to, from) };
        if !self.line_clear(upper, lower, upper.z) {
            return false;
        }
        (upper.z..lower.z).all(|z| !self.tiles.contains_key(&Position::new(lower.x, lower.y, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(x: i32, y: i32) -> Position {
        Position::new(x, y, Position::GROUND_FLOOR)
    }

    #[test]
    fn walls_block_sight_but_not_their_neighbours() {
        let mut map = GridMap::open(10, 10);
        map.set_tile(ground(3, 3), StaticTile::wall());

        assert!(!map.is_sight_clear(ground(1, 3), ground(6, 3), true));
        assert!(map.is_sight_clear(ground(1, 2), ground(6, 2), true));
        assert!(map.is_sight_clear(ground(2, 3), ground(3, 3), true));
    }

    #[test]
    fn same_floor_check_rejects_other_floors() {
        let map = GridMap::open(10, 10);
        assert!(!map.is_sight_clear(ground(1, 1), Position::new(2, 2, 6), true));
    }

    #[test]
    fn tiles_outside_the_map_do_not_exist() {
        let map = GridMap::open(4, 4);
        assert!(map.tile(ground(-1, 0)).is_none());
        assert!(map.tile(ground(4, 0)).is_none());
        assert!(map.tile(ground(3, 3)).is_some_and(StaticTile::is_walkable));
    }
}
