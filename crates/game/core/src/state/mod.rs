//! Authoritative world state.
//!
//! Creature bodies, monster brains, ground items, the active-think schedule and
//! the side-effect outbox. Runtime layers query this state but mutate it only
//! through [`crate::engine::GameEngine`].
mod error;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};

pub use error::SpawnError;
pub use types::{
    Conditions, Creature, CreatureKind, CreatureRegistry, DeferredTask, Direction, EntityId,
    GroundItems, ItemFlags, ItemId, ItemState, MagicEffect, MonsterBody, Notification, Outbox,
    PendingReward, PlayerFlags, PlayerProfile, Position, SpeakKind, Tick, WorldEvent, Zone,
};

use crate::env::PcgRng;
use crate::monster::Monster;
use crate::reward::RewardTracker;

/// Canonical snapshot of one world instance.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Current world time.
    pub clock: Tick,
    pub creatures: CreatureRegistry,
    /// AI state of every monster, keyed by the id of its creature body.
    pub monsters: BTreeMap<EntityId, Monster>,
    pub ground: GroundItems,
    /// Monsters registered for active thinking (not idle).
    pub active: BTreeSet<EntityId>,
    pub outbox: Outbox,
    /// Damage/healing score tables of reward bosses.
    pub rewards: RewardTracker,
    pub rng: PcgRng,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            clock: Tick::ZERO,
            creatures: CreatureRegistry::new(),
            monsters: BTreeMap::new(),
            ground: GroundItems::new(),
            active: BTreeSet::new(),
            outbox: Outbox::default(),
            rewards: RewardTracker::default(),
            rng: PcgRng::seeded(seed),
        }
    }

    /// Advances world time by `interval` milliseconds.
    pub fn advance(&mut self, interval: u64) {
        self.clock = self.clock + interval;
    }

    pub fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Active monsters in id order.
    pub fn active_monsters(&self) -> Vec<EntityId> {
        self.active.iter().copied().collect()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}
