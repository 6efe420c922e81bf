//! Runtime wrappers around static game content oracles.
//!
//! These implementations expose `game-core` oracle traits and bundle them into
//! an [`OracleManager`] so the runtime can build [`game_core::Env`] snapshots
//! on demand. The data is immutable at runtime; dynamic state lives in
//! [`game_core::GameState`].
mod map;
mod path;
mod species;

use std::sync::Arc;

use game_core::{Env, GameConfig, GameEnv};

use crate::hooks::HookRegistry;

pub use map::GridMap;
pub use path::AStarPaths;
pub use species::SpeciesCatalog;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) map: Arc<GridMap>,
    pub(crate) paths: Arc<AStarPaths>,
    pub(crate) species: Arc<SpeciesCatalog>,
    pub(crate) scripts: Arc<HookRegistry>,
    pub(crate) config: Arc<GameConfig>,
}

impl OracleManager {
    /// Path search runs against `map`.
    pub fn new(
        map: Arc<GridMap>,
        species: Arc<SpeciesCatalog>,
        scripts: Arc<HookRegistry>,
        config: Arc<GameConfig>,
    ) -> Self {
        let paths = Arc::new(AStarPaths::new(Arc::clone(&map)));
        Self {
            map,
            paths,
            species,
            scripts,
            config,
        }
    }

    /// Converts oracle manager into GameEnv for game-core
    pub fn as_game_env(&self) -> GameEnv<'_> {
        Env::with_all(
            self.map.as_ref(),
            self.paths.as_ref(),
            self.species.as_ref(),
            self.scripts.as_ref(),
            self.config.as_ref(),
        )
        .into_game_env()
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn species(&self) -> &SpeciesCatalog {
        &self.species
    }

    pub fn scripts(&self) -> &HookRegistry {
        &self.scripts
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
