//! Async runtime that drives the monster AI.
//!
//! The runtime owns the authoritative [`game_core::GameState`] inside a single
//! simulation worker. Clients talk to it through [`RuntimeHandle`], observe
//! world changes on the [`EventBus`] and find finished boss rewards in a
//! [`RewardRepository`].
pub mod api;
pub mod events;
pub mod hooks;
pub mod oracle;
pub mod repository;
pub mod runtime;
pub mod workers;

pub use api::{CreatureView, Result, RuntimeError, RuntimeHandle, WorldSnapshot};
pub use events::{Event, EventBus, RewardStored, TickCompleted, Topic, WorldEventRecord};
pub use hooks::{FnHook, HookContext, HookRegistry, ScriptHook};
pub use oracle::{AStarPaths, GridMap, OracleManager, SpeciesCatalog};
pub use repository::{
    FileRewardRepository, InMemoryRewardRepository, RepositoryError, RewardRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
