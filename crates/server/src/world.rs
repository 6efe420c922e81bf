//! Content loading and world population.
use std::sync::Arc;

use anyhow::{Context, Result};
use game_content::{ContentFactory, MapData};
use runtime::{GridMap, HookRegistry, OracleManager, RuntimeHandle, SpeciesCatalog};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Oracles plus the spawn list of the loaded map.
pub struct World {
    pub oracles: OracleManager,
    pub map: MapData,
}

impl World {
    pub fn load(config: &ServerConfig) -> Result<Self> {
        if !config.data_dir.exists() {
            anyhow::bail!(
                "content data directory not found: {} (set CONTENT_DATA_DIR to override)",
                config.data_dir.display()
            );
        }

        let factory = ContentFactory::new(&config.data_dir);
        let game_config = factory.load_config().with_context(|| {
            format!("loading config from {}", factory.data_dir().display())
        })?;
        let species = factory.load_species().context("loading species catalog")?;
        let map = factory
            .load_map(&config.map_name)
            .with_context(|| format!("loading map '{}'", config.map_name))?;

        let catalog = SpeciesCatalog::new(species);
        info!(
            species = catalog.len(),
            map = %config.map_name,
            width = map.dimensions.width,
            height = map.dimensions.height,
            spawns = map.spawns.len(),
            "content loaded"
        );

        let oracles = OracleManager::new(
            Arc::new(GridMap::from(&map)),
            Arc::new(catalog),
            Arc::new(HookRegistry::new()),
            Arc::new(game_config),
        );
        Ok(Self { oracles, map })
    }

    /// Spawns every monster listed by the map. Failed spawns are logged and
    /// skipped.
    pub async fn populate(&self, handle: &RuntimeHandle) -> Result<usize> {
        let mut spawned = 0;
        for (species, position) in &self.map.spawns {
            match handle.spawn_monster(species, *position).await {
                Ok(_) => spawned += 1,
                Err(e) => warn!(%species, %position, error = %e, "spawn failed"),
            }
        }
        Ok(spawned)
    }
}
