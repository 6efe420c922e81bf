//! Simulation worker that owns the authoritative [`game_core::GameState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives
//! [`game_core::GameEngine`] on a fixed think interval and publishes the
//! resulting world events to the EventBus.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};

use game_core::{
    CombatType, EngineError, EntityId, GameEngine, GameEnv, GameError, GameState, Position,
    RewardContainer, SpeakKind, Tick,
};
use tracing::{debug, error, info, warn};

use crate::api::{Result, RuntimeError, WorldSnapshot};
use crate::events::{Event, EventBus, RewardStored, TickCompleted, WorldEventRecord};
use crate::oracle::OracleManager;
use crate::repository::RewardRepository;

/// Commands that can be sent to the simulation worker
pub enum Command {
    SpawnMonster {
        species: String,
        position: Position,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    SpawnPlayer {
        name: String,
        guid: u32,
        position: Position,
        health: i32,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    MovePlayer {
        player: EntityId,
        to: Position,
        reply: oneshot::Sender<Result<()>>,
    },
    ChangeHealth {
        target: EntityId,
        source: Option<EntityId>,
        combat: CombatType,
        amount: i32,
        reply: oneshot::Sender<Result<i32>>,
    },
    SetTarget {
        player: EntityId,
        target: Option<EntityId>,
        reply: oneshot::Sender<Result<bool>>,
    },
    Say {
        speaker: EntityId,
        kind: SpeakKind,
        text: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Remove {
        creature: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    Challenge {
        monster: EntityId,
        challenger: EntityId,
        force: bool,
        reply: oneshot::Sender<Result<bool>>,
    },
    /// Run ticks right away, independent of the wall clock.
    Step {
        ticks: u32,
        reply: oneshot::Sender<Result<Tick>>,
    },
    Snapshot {
        reply: oneshot::Sender<WorldSnapshot>,
    },
    /// Query the current game state (read-only).
    QueryState {
        reply: oneshot::Sender<GameState>,
    },
    TakeRewards {
        player_guid: u32,
        reply: oneshot::Sender<Result<Vec<RewardContainer>>>,
    },
}

/// Background task that processes gameplay commands and world ticks.
pub struct SimulationWorker {
    state: GameState,
    oracles: OracleManager,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    rewards: Arc<dyn RewardRepository>,
    /// Simulated milliseconds per tick.
    think_interval_ms: u64,
    realtime: bool,
}

impl SimulationWorker {
    pub fn new(
        state: GameState,
        oracles: OracleManager,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        rewards: Arc<dyn RewardRepository>,
        think_interval_ms: u64,
        realtime: bool,
    ) -> Self {
        info!(
            target: "runtime::worker",
            "SimulationWorker initialized with {} creature(s), {} active monster(s), {} ms think interval",
            state.creatures.len(),
            state.active.len(),
            think_interval_ms
        );

        Self {
            state,
            oracles,
            command_rx,
            event_bus,
            rewards,
            think_interval_ms,
            realtime,
        }
    }

    /// Main worker loop.
    ///
    /// Ends once every [`RuntimeHandle`](crate::RuntimeHandle) is dropped.
    pub async fn run(mut self) {
        let mut ticker = self.realtime.then(|| {
            let mut ticker = tokio::time::interval(Duration::from_millis(self.think_interval_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut ticker) => {
                    if let Err(e) = self.tick() {
                        report("tick", &e);
                        if e.severity().is_fatal() {
                            warn!(target: "runtime::worker", "automatic ticking halted");
                            ticker = None;
                        }
                    }
                }
            }
        }

        debug!(target: "runtime::worker", "command channel closed, simulation worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SpawnMonster {
                species,
                position,
                reply,
            } => {
                let result = self.apply(|engine, env| {
                    engine.spawn_monster(env, &species, position, true)
                });
                respond(reply, result, "SpawnMonster");
            }
            Command::SpawnPlayer {
                name,
                guid,
                position,
                health,
                reply,
            } => {
                let result =
                    self.apply(|engine, _| Ok(engine.spawn_player(&name, guid, position, health)));
                respond(reply, result, "SpawnPlayer");
            }
            Command::MovePlayer { player, to, reply } => {
                let result = self.apply(|engine, _| engine.move_player(player, to));
                respond(reply, result, "MovePlayer");
            }
            Command::ChangeHealth {
                target,
                source,
                combat,
                amount,
                reply,
            } => {
                let result = self.apply(|engine, env| {
                    engine.change_health(env, target, source, combat, amount)
                });
                respond(reply, result, "ChangeHealth");
            }
            Command::SetTarget {
                player,
                target,
                reply,
            } => {
                let result = self.apply(|engine, _| engine.set_player_target(player, target));
                respond(reply, result, "SetTarget");
            }
            Command::Say {
                speaker,
                kind,
                text,
                reply,
            } => {
                let result = self.apply(|engine, _| engine.say(speaker, kind, &text));
                respond(reply, result, "Say");
            }
            Command::Remove { creature, reply } => {
                let result = self.apply(|engine, env| engine.remove_creature(env, creature));
                respond(reply, result, "Remove");
            }
            Command::Challenge {
                monster,
                challenger,
                force,
                reply,
            } => {
                let result =
                    self.apply(|engine, env| engine.challenge(env, monster, challenger, force));
                respond(reply, result, "Challenge");
            }
            Command::Step { ticks, reply } => {
                let result = (0..ticks)
                    .try_for_each(|_| self.tick())
                    .map(|_| self.state.clock);
                respond(reply, result, "Step");
            }
            Command::Snapshot { reply } => {
                if reply.send(WorldSnapshot::capture(&self.state)).is_err() {
                    debug!(target: "runtime::worker", "Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!(target: "runtime::worker", "QueryState reply channel closed (caller dropped)");
                }
            }
            Command::TakeRewards { player_guid, reply } => {
                let result = self.take_rewards(player_guid);
                respond(reply, result, "TakeRewards");
            }
        }
    }

    /// Runs one engine call, settles deferred work and flushes the outbox.
    fn apply<T>(
        &mut self,
        f: impl FnOnce(&mut GameEngine<'_>, &GameEnv<'_>) -> std::result::Result<T, EngineError>,
    ) -> Result<T> {
        let env = self.oracles.as_game_env();
        let mut engine = GameEngine::new(&mut self.state);
        let result = f(&mut engine, &env).and_then(|value| {
            engine.run_deferred(&env)?;
            Ok(value)
        });
        let flushed = self.flush();
        let value = result?;
        flushed?;
        Ok(value)
    }

    /// Advances the world by one think interval.
    fn tick(&mut self) -> Result<()> {
        let interval = self.think_interval_ms;
        let env = self.oracles.as_game_env();
        let result = GameEngine::new(&mut self.state).tick(&env, interval);
        let events = self.flush();
        result?;
        let events = events?;

        self.event_bus.publish(Event::TickCompleted(TickCompleted {
            tick: self.state.clock,
            active_monsters: self.state.active.len(),
            events,
        }));
        Ok(())
    }

    /// Publishes drained world events and persists pending rewards.
    ///
    /// Rewards that fail to persist stay queued for the next flush.
    fn flush(&mut self) -> Result<usize> {
        let tick = self.state.clock;
        let events = self.state.outbox.drain_events();
        let published = events.len();
        for event in events {
            self.event_bus
                .publish(Event::World(WorldEventRecord { tick, event }));
        }

        let mut first_error = None;
        for pending in self.state.outbox.drain_pending_rewards() {
            match self.rewards.store(pending.player_guid, &pending.container) {
                Ok(()) => {
                    debug!(
                        target: "runtime::worker",
                        player_guid = pending.player_guid,
                        boss = %pending.container.boss_name,
                        "reward container persisted"
                    );
                    self.event_bus.publish(Event::RewardStored(RewardStored {
                        player_guid: pending.player_guid,
                        boss_name: pending.container.boss_name.clone(),
                        item_count: pending.container.items.len(),
                    }));
                }
                Err(e) => {
                    warn!(
                        target: "runtime::worker",
                        player_guid = pending.player_guid,
                        error = %e,
                        "failed to persist reward container, will retry"
                    );
                    self.state.outbox.pending_rewards.push(pending);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(RuntimeError::Repository(e)),
            None => Ok(published),
        }
    }

    /// Online players hold their chest in the world; stored chests are
    /// appended after it.
    fn take_rewards(&mut self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        let mut containers = self
            .state
            .creatures
            .player_by_guid_mut(player_guid)
            .and_then(|player| player.profile_mut())
            .map(|profile| std::mem::take(&mut profile.reward_chest))
            .unwrap_or_default();
        containers.extend(self.rewards.take(player_guid)?);
        Ok(containers)
    }
}

/// Logs a failed operation at the level its severity calls for.
fn report(operation: &'static str, e: &RuntimeError) {
    let severity = e.severity();
    if severity.is_expected() {
        debug!(
            target: "runtime::worker",
            operation,
            severity = severity.as_str(),
            code = e.error_code(),
            error = %e,
            "operation failed"
        );
    } else {
        error!(
            target: "runtime::worker",
            operation,
            severity = severity.as_str(),
            code = e.error_code(),
            error = %e,
            "operation failed"
        );
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn respond<T>(reply: oneshot::Sender<Result<T>>, result: Result<T>, command: &'static str) {
    if let Err(e) = &result {
        report(command, e);
    }
    if reply.send(result).is_err() {
        debug!(target: "runtime::worker", command, "reply channel closed (caller dropped)");
    }
}
