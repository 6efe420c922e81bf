//! Server settings read from the environment.
use std::env;
use std::path::PathBuf;

/// Where content comes from and which map to load.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub map_name: String,
}

impl ServerConfig {
    /// Reads `CONTENT_DATA_DIR` and `MONSTER_MAP`.
    ///
    /// The data directory falls back to `crates/game/content/data` under the
    /// working directory, the map to `arena`.
    pub fn from_env() -> Self {
        let data_dir = env::var("CONTENT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("crates/game/content/data")
            });
        let map_name = env::var("MONSTER_MAP").unwrap_or_else(|_| "arena".to_string());

        Self { data_dir, map_name }
    }
}
