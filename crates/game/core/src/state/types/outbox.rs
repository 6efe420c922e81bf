//! Side effects recorded while monsters think.
//!
//! AI code never calls back into the world driver. Observable effects are
//! appended as [`WorldEvent`]s, follow-up work is queued as [`DeferredTask`]s
//! and creature notifications are replayed to other monsters only after the
//! current think step has finished.
use std::collections::VecDeque;

use super::common::{Direction, EntityId, Position};
use super::creature::Creature;
use super::item::ItemId;
use crate::reward::RewardContainer;

/// Visual effect shown on a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MagicEffect {
    #[default]
    None,
    Poff,
    BlockHit,
    Teleport,
    Sparkles,
    Summon,
    Other(u16),
}

impl MagicEffect {
    pub fn is_none(self) -> bool {
        matches!(self, MagicEffect::None)
    }
}

/// Speech channel of a creature message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SpeakKind {
    Say,
    Yell,
    MonsterSay,
    MonsterYell,
}

/// Observable world change, published to clients by the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldEvent {
    MagicEffect {
        position: Position,
        effect: MagicEffect,
    },
    CreatureSay {
        speaker: EntityId,
        kind: SpeakKind,
        text: String,
    },
    CreatureTurn {
        creature: EntityId,
        direction: Direction,
    },
    CreatureMoved {
        creature: EntityId,
        from: Position,
        to: Position,
    },
    CreatureTeleported {
        creature: EntityId,
        from: Position,
        to: Position,
    },
    CreatureAppeared {
        creature: EntityId,
        position: Position,
    },
    CreatureRemoved {
        creature: EntityId,
        position: Position,
    },
    HealthChanged {
        creature: EntityId,
        health: i32,
        health_max: i32,
    },
    IdleChanged {
        creature: EntityId,
        idle: bool,
    },
    /// Spell cast request; execution belongs to the combat system.
    SpellCast {
        caster: EntityId,
        target: EntityId,
        spell: String,
        min: i32,
        max: i32,
    },
    SummonPlaced {
        master: EntityId,
        summon: EntityId,
        position: Position,
    },
    CreatureDied {
        creature: EntityId,
        position: Position,
    },
    CorpseCreated {
        creature: EntityId,
        position: Position,
        owner: Option<EntityId>,
        reward_container: bool,
        drops_loot: bool,
    },
    ItemMoved {
        item: ItemId,
        from: Position,
        to: Position,
    },
    ItemRemoved {
        item: ItemId,
        position: Position,
    },
    TextMessage {
        recipient: EntityId,
        text: String,
    },
}

/// Creature change that other monsters must react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Appeared {
        creature: EntityId,
    },
    Moved {
        creature: EntityId,
        from: Position,
        to: Position,
    },
    /// Carries the detached body so observers can still classify it.
    Removed {
        creature: Box<Creature>,
    },
    Spoke {
        creature: EntityId,
        kind: SpeakKind,
        text: String,
    },
}

/// Work scheduled for after the current think step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredTask {
    /// Run an immediate, zero-interval attack phase.
    CheckAttack(EntityId),
    /// Handle a creature whose health dropped to zero.
    ResolveDeath(EntityId),
}

/// Reward container waiting for durable storage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingReward {
    pub player_guid: u32,
    pub container: RewardContainer,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outbox {
    pub events: Vec<WorldEvent>,
    pub notifications: VecDeque<Notification>,
    pub tasks: VecDeque<DeferredTask>,
    pub pending_rewards: Vec<PendingReward>,
}

impl Outbox {
    pub fn emit(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    pub fn effect(&mut self, position: Position, effect: MagicEffect) {
        if !effect.is_none() {
            self.emit(WorldEvent::MagicEffect { position, effect });
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    pub fn defer(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_pending_rewards(&mut self) -> Vec<PendingReward> {
        std::mem::take(&mut self.pending_rewards)
    }
}
