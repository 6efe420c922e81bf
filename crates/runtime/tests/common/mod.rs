#![allow(dead_code)]

use std::sync::Arc;

use game_core::{GameConfig, LootBlock, Position, Species, SpellBlock};
use runtime::{
    GridMap, HookRegistry, OracleManager, RewardRepository, Runtime, RuntimeConfig,
    SpeciesCatalog,
};

pub fn ground(x: i32, y: i32) -> Position {
    Position::new(x, y, Position::GROUND_FLOOR)
}

pub fn catalog() -> SpeciesCatalog {
    SpeciesCatalog::new([
        Species {
            attack_spells: vec![SpellBlock::melee(2000, 0, -20)],
            ..Species::new("orc")
        },
        Species {
            health: 100,
            reward_boss: true,
            loot: vec![LootBlock {
                item_type: 2160,
                chance: GameConfig::MAX_LOOT_CHANCE,
                ..LootBlock::default()
            }],
            ..Species::new("Warlord")
        },
    ])
}

pub fn oracles(hooks: HookRegistry) -> OracleManager {
    OracleManager::new(
        Arc::new(GridMap::open(32, 32)),
        Arc::new(catalog()),
        Arc::new(hooks),
        Arc::new(GameConfig::default()),
    )
}

/// Manually stepped runtime with a fixed seed.
pub fn stepped_config() -> RuntimeConfig {
    RuntimeConfig {
        realtime: false,
        rng_seed: Some(7),
        ..RuntimeConfig::default()
    }
}

pub async fn runtime(hooks: HookRegistry) -> Runtime {
    Runtime::builder()
        .config(stepped_config())
        .oracles(oracles(hooks))
        .build()
        .await
        .expect("runtime builds")
}

pub async fn runtime_with_rewards(rewards: Arc<dyn RewardRepository>) -> Runtime {
    Runtime::builder()
        .config(stepped_config())
        .oracles(oracles(HookRegistry::new()))
        .reward_repository(rewards)
        .build()
        .await
        .expect("runtime builds")
}
