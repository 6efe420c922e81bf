//! Map data loader.
//!
//! Loads tile layout and monster spawn points from map RON files.

use std::collections::HashMap;
use std::path::Path;

use game_core::{MapDimensions, Position, StaticTile, TileFlags};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Tile kinds a map file may place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum TileKind {
    Floor,
    Wall,
    /// Walkable, but pathing avoids it (e.g. a fire field).
    Hazard,
    Protection,
    Stairs,
    Void,
}

impl TileKind {
    fn tile(self) -> Option<StaticTile> {
        let flags = match self {
            Self::Floor => TileFlags::empty(),
            Self::Wall => return Some(StaticTile::wall()),
            Self::Hazard => TileFlags::BLOCK_PATH,
            Self::Protection => TileFlags::PROTECTION_ZONE,
            Self::Stairs => TileFlags::FLOOR_CHANGE,
            Self::Void => return None,
        };
        Some(StaticTile::new(flags))
    }
}

/// Where a monster of `species` is spawned at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub species: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: Option<u8>,
}

/// Map data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    dimensions: (u32, u32),
    /// Floors covered by the map; every floor starts as plain ground.
    #[serde(default = "default_floors")]
    floors: Vec<u8>,
    #[serde(default)]
    tiles: Vec<(i32, i32, u8, TileKind)>,
    #[serde(default)]
    spawns: Vec<SpawnPoint>,
}

fn default_floors() -> Vec<u8> {
    vec![Position::GROUND_FLOOR]
}

/// A loaded map: static tiles plus spawn points.
#[derive(Debug, Clone)]
pub struct MapData {
    pub dimensions: MapDimensions,
    pub tiles: HashMap<Position, StaticTile>,
    pub spawns: Vec<(String, Position)>,
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path) -> LoadResult<MapData> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load map {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<MapData> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let dimensions = MapDimensions::new(data.dimensions.0, data.dimensions.1);

        // Fill every floor with ground first
        let mut tiles = HashMap::new();
        for &z in &data.floors {
            for y in 0..dimensions.height {
                for x in 0..dimensions.width {
                    tiles.insert(Position::new(x as i32, y as i32, z), StaticTile::floor());
                }
            }
        }

        // Then override with explicitly defined tiles
        for (x, y, z, kind) in data.tiles {
            let position = Position::new(x, y, z);
            if !dimensions.contains(position) {
                anyhow::bail!("tile {} lies outside the map", position);
            }
            match kind.tile() {
                Some(tile) => tiles.insert(position, tile),
                None => tiles.remove(&position),
            };
        }

        let mut spawns = Vec::with_capacity(data.spawns.len());
        for spawn in data.spawns {
            let position = Position::new(spawn.x, spawn.y, spawn.z.unwrap_or(Position::GROUND_FLOOR));
            if !tiles.get(&position).is_some_and(|tile| tile.is_walkable()) {
                anyhow::bail!("spawn of '{}' at {} is not walkable", spawn.species, position);
            }
            spawns.push((spawn.species, position));
        }

        Ok(MapData {
            dimensions,
            tiles,
            spawns,
        })
    }
}
