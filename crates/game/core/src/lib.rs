//! Deterministic monster AI shared by the runtime and offline tools.
//!
//! `game-core` defines the canonical rules (creature model, monster decision
//! loop, reward scoring) and exposes pure APIs. All state mutation flows
//! through [`engine::GameEngine`], and supporting crates depend on the types
//! re-exported here.
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod monster;
pub mod reward;
pub mod species;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::GameConfig;
pub use engine::{EngineError, GameEngine};
pub use env::{
    ConfigOracle, Env, FindPathParams, GameEnv, HookOutcome, MapDimensions, MapOracle, NoScripts,
    OracleError, PathOracle, PcgRng, RngOracle, ScriptError, ScriptEvent, ScriptOracle,
    SpeciesOracle, StaticTile, TileFlags,
};
pub use error::{ErrorSeverity, GameError};
pub use monster::{AiContext, DistanceStep, Monster, TargetSearch};
pub use reward::{
    BossScoreTable, RewardContainer, RewardDelivery, RewardItem, RewardRates, RewardTracker,
    Score,
};
pub use species::{
    CombatType, LootBlock, Species, SpeciesScripts, SpellBlock, SummonBlock, VoiceBlock,
};
pub use state::{
    Conditions, Creature, CreatureKind, CreatureRegistry, DeferredTask, Direction, EntityId,
    GameState, GroundItems, ItemFlags, ItemId, ItemState, MagicEffect, MonsterBody, Notification,
    Outbox, PendingReward, PlayerFlags, PlayerProfile, Position, SpawnError, SpeakKind, Tick,
    WorldEvent, Zone,
};
