//! Configuration oracle exposing world tunables to the engine.

use crate::config::GameConfig;

pub trait ConfigOracle: Send + Sync {
    fn game_config(&self) -> &GameConfig;
}

impl ConfigOracle for GameConfig {
    fn game_config(&self) -> &GameConfig {
        self
    }
}
