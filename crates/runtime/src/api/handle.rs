//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! feeding world changes to the monsters, stepping the simulation or
//! streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{
    CombatType, EntityId, GameState, Position, RewardContainer, SpeakKind, Tick,
};

use super::errors::{Result, RuntimeError};
use super::snapshot::WorldSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Spawn a monster of `species` at (or next to) `position`.
    ///
    /// The monster treats `position` as its spawn anchor.
    pub async fn spawn_monster(&self, species: &str, position: Position) -> Result<EntityId> {
        let species = species.to_owned();
        self.request(|reply| Command::SpawnMonster {
            species,
            position,
            reply,
        })
        .await?
    }

    pub async fn spawn_player(
        &self,
        name: &str,
        guid: u32,
        position: Position,
        health: i32,
    ) -> Result<EntityId> {
        let name = name.to_owned();
        self.request(|reply| Command::SpawnPlayer {
            name,
            guid,
            position,
            health,
            reply,
        })
        .await?
    }

    /// Move a player one step, or teleport it when `to` is farther away.
    pub async fn move_player(&self, player: EntityId, to: Position) -> Result<()> {
        self.request(|reply| Command::MovePlayer { player, to, reply })
            .await?
    }

    /// Apply damage (negative `amount`) or healing to any creature.
    ///
    /// Returns the health change that was actually applied.
    pub async fn change_health(
        &self,
        target: EntityId,
        source: Option<EntityId>,
        combat: CombatType,
        amount: i32,
    ) -> Result<i32> {
        self.request(|reply| Command::ChangeHealth {
            target,
            source,
            combat,
            amount,
            reply,
        })
        .await?
    }

    /// Set what a player attacks. Returns whether the target changed.
    pub async fn set_target(&self, player: EntityId, target: Option<EntityId>) -> Result<bool> {
        self.request(|reply| Command::SetTarget {
            player,
            target,
            reply,
        })
        .await?
    }

    pub async fn say(&self, speaker: EntityId, kind: SpeakKind, text: &str) -> Result<()> {
        let text = text.to_owned();
        self.request(|reply| Command::Say {
            speaker,
            kind,
            text,
            reply,
        })
        .await?
    }

    /// Remove a creature (and its summons) from the world.
    pub async fn remove(&self, creature: EntityId) -> Result<()> {
        self.request(|reply| Command::Remove { creature, reply })
            .await?
    }

    /// Challenge `monster` to focus `challenger`. Returns whether it accepted.
    pub async fn challenge(
        &self,
        monster: EntityId,
        challenger: EntityId,
        force: bool,
    ) -> Result<bool> {
        self.request(|reply| Command::Challenge {
            monster,
            challenger,
            force,
            reply,
        })
        .await?
    }

    /// Run `ticks` simulation ticks immediately. Returns the new world time.
    pub async fn step(&self, ticks: u32) -> Result<Tick> {
        self.request(|reply| Command::Step { ticks, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Query the current game state (read-only clone).
    pub async fn query_state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Collect and clear a player's reward chest.
    pub async fn take_rewards(&self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        self.request(|reply| Command::TakeRewards { player_guid, reply })
            .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::World` - Creature movement, speech, combat and deaths
    /// - `Topic::Rewards` - Reward containers stored for players
    /// - `Topic::Clock` - Completed simulation ticks
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut world_rx = handle.subscribe(Topic::World);
    /// while let Ok(event) = world_rx.recv().await {
    ///     // Handle world events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
