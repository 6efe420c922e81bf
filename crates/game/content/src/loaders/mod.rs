//! Content loaders for reading game data from files.
//!
//! Each loader turns one RON/TOML file into game-core types that the runtime
//! wraps in oracle implementations.

pub mod config;
pub mod factory;
pub mod map;
pub mod species;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use map::{MapData, MapLoader, SpawnPoint};
pub use species::SpeciesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
