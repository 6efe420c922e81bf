//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the world.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use game_core::GameState;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::oracle::OracleManager;
use crate::repository::{FileRewardRepository, InMemoryRewardRepository, RewardRepository};
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Simulated milliseconds per tick; also the wall-clock period in
    /// realtime mode.
    pub think_interval_ms: u64,
    /// Tick on a wall-clock timer. Without it the world only advances
    /// through [`RuntimeHandle::step`].
    pub realtime: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// World RNG seed; random when unset.
    pub rng_seed: Option<u64>,
    /// Directory of the file reward repository; in-memory when unset.
    pub reward_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 1000,
            realtime: true,
            event_buffer_size: 256,
            command_buffer_size: 32,
            rng_seed: None,
            reward_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Environment variable overriding the think interval in milliseconds.
    pub const ENV_TICK_MS: &'static str = "MONSTER_TICK_MS";
    /// Environment variable fixing the world RNG seed.
    pub const ENV_RNG_SEED: &'static str = "MONSTER_RNG_SEED";
    /// Environment variable naming the reward directory.
    pub const ENV_REWARD_DIR: &'static str = "MONSTER_REWARD_DIR";

    /// Defaults overridden by `MONSTER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::ENV_TICK_MS) {
            config.think_interval_ms = parse_var(Self::ENV_TICK_MS, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_RNG_SEED) {
            config.rng_seed = Some(parse_var(Self::ENV_RNG_SEED, &value)?);
        }
        if let Some(value) = lookup(Self::ENV_REWARD_DIR) {
            config.reward_dir = Some(PathBuf::from(value));
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.think_interval_ms == 0 {
            return Err(RuntimeError::InvalidConfig(
                "think interval must be positive".into(),
            ));
        }
        if self.command_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "command buffer must hold at least one command".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RuntimeError::InvalidConfig(format!("{key}={value:?} is not a valid number")))
}

/// Main runtime that orchestrates the simulation
///
/// Design: Runtime owns the worker and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the worker, which stops once every outstanding handle is
    /// dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    state: Option<GameState>,
    oracles: Option<OracleManager>,
    rewards: Option<Arc<dyn RewardRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            state: None,
            oracles: None,
            rewards: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide initial game state
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Use a specific reward repository instead of the configured one.
    pub fn reward_repository(mut self, rewards: Arc<dyn RewardRepository>) -> Self {
        self.rewards = Some(rewards);
        self
    }

    /// Build the runtime and start its worker
    pub async fn build(self) -> Result<Runtime> {
        self.config.validate()?;
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;

        let initial_state = match self.state {
            Some(state) => state,
            None => GameState::new(self.config.rng_seed.unwrap_or_else(rand::random)),
        };

        let rewards: Arc<dyn RewardRepository> = match (self.rewards, &self.config.reward_dir) {
            (Some(rewards), _) => rewards,
            (None, Some(dir)) => Arc::new(FileRewardRepository::new(dir)?),
            (None, None) => Arc::new(InMemoryRewardRepository::new()),
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            initial_state,
            oracles,
            command_rx,
            event_bus,
            rewards,
            self.config.think_interval_ms,
            self.config.realtime,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("MONSTER_TICK_MS", "250"),
            ("MONSTER_RNG_SEED", " 42 "),
            ("MONSTER_REWARD_DIR", "/var/lib/monsters"),
        ]))
        .unwrap();

        assert_eq!(config.think_interval_ms, 250);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.reward_dir, Some(PathBuf::from("/var/lib/monsters")));
        assert!(config.realtime);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = RuntimeConfig::from_lookup(lookup(&[("MONSTER_TICK_MS", "fast")])).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn zero_interval_fails_to_build() {
        let config = RuntimeConfig {
            think_interval_ms: 0,
            ..RuntimeConfig::default()
        };
        let result = Runtime::builder().config(config).build().await;
        assert!(matches!(result, Err(RuntimeError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn oracles_are_required() {
        let result = Runtime::builder().build().await;
        assert!(matches!(result, Err(RuntimeError::MissingOracles)));
    }
}
