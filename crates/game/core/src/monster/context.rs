use std::collections::{BTreeMap, BTreeSet};

use crate::config::GameConfig;
use crate::env::{MapOracle, PathOracle, RngOracle, ScriptOracle, SpeciesOracle};
use crate::reward::RewardTracker;
use crate::state::{
    Creature, CreatureRegistry, DeferredTask, EntityId, GroundItems, Notification, Outbox,
    Position, Tick, WorldEvent,
};

use super::Monster;

/// Everything a monster may read or touch while it runs one step.
///
/// The engine lifts the running monster's brain out of the world before
/// building the context, so `monsters` holds every *other* brain and the
/// running one is passed separately as `&mut Monster`.
pub struct AiContext<'a> {
    pub now: Tick,
    pub creatures: &'a mut CreatureRegistry,
    pub monsters: &'a mut BTreeMap<EntityId, Monster>,
    pub ground: &'a mut GroundItems,
    pub active: &'a mut BTreeSet<EntityId>,
    pub outbox: &'a mut Outbox,
    pub rewards: &'a mut RewardTracker,
    pub rng: &'a mut dyn RngOracle,
    pub map: &'a dyn MapOracle,
    pub paths: &'a dyn PathOracle,
    pub species: &'a dyn SpeciesOracle,
    pub scripts: &'a dyn ScriptOracle,
    pub config: &'a GameConfig,
}

impl AiContext<'_> {
    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(id)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.creatures.get(id).map(|creature| creature.position)
    }

    pub fn emit(&mut self, event: WorldEvent) {
        self.outbox.emit(event);
    }

    pub fn is_sight_clear(&self, from: Position, to: Position) -> bool {
        self.map.is_sight_clear(from, to, true)
    }

    /// `true` with `chance` percent probability.
    pub fn chance(&mut self, chance: u32) -> bool {
        chance >= self.rng.roll_d100()
    }

    pub fn coin(&mut self) -> bool {
        self.rng.range(0, 1) == 1
    }

    /// Drops a creature to zero health. Death is resolved by the engine once
    /// the current step finished.
    pub fn kill(&mut self, id: EntityId) {
        let Some(creature) = self.creatures.get_mut(id) else {
            return;
        };
        if creature.is_dead() {
            return;
        }
        creature.health = 0;
        let event = WorldEvent::HealthChanged {
            creature: id,
            health: 0,
            health_max: creature.health_max,
        };
        self.outbox.emit(event);
        self.outbox.defer(DeferredTask::ResolveDeath(id));
    }

    /// Detaches a creature and, recursively, its summons from the world.
    pub fn remove_creature(&mut self, id: EntityId) {
        let Some(body) = self.creatures.get(id) else {
            return;
        };
        let summons = body.summons.clone();
        let master = body.master;
        for summon in summons {
            self.remove_creature(summon);
        }
        if let Some(owner) = master.and_then(|master| self.creatures.get_mut(master)) {
            owner.summons.retain(|summon| *summon != id);
        }

        let Some(body) = self.creatures.remove(id) else {
            return;
        };
        self.monsters.remove(&id);
        self.active.remove(&id);
        self.rewards.untrack(id);
        self.outbox.emit(WorldEvent::CreatureRemoved {
            creature: id,
            position: body.position,
        });
        self.outbox.notify(Notification::Removed {
            creature: Box::new(body),
        });
    }

    pub fn teleport(&mut self, id: EntityId, to: Position) {
        let Some(creature) = self.creatures.get_mut(id) else {
            return;
        };
        let from = creature.position;
        creature.position = to;
        self.outbox.emit(WorldEvent::CreatureTeleported {
            creature: id,
            from,
            to,
        });
        self.outbox.notify(Notification::Moved {
            creature: id,
            from,
            to,
        });
    }

    /// Moves a creature one tile, emitting the move and queueing the
    /// notification for nearby monsters.
    pub fn relocate(&mut self, id: EntityId, to: Position) -> bool {
        let now = self.now;
        let Some(creature) = self.creatures.get_mut(id) else {
            return false;
        };
        let from = creature.position;
        creature.position = to;
        creature.last_move_at = now;
        if from.z == to.z && from != to {
            creature.direction = crate::state::Direction::towards(from, to);
        }
        self.outbox.emit(WorldEvent::CreatureMoved {
            creature: id,
            from,
            to,
        });
        self.outbox.notify(Notification::Moved {
            creature: id,
            from,
            to,
        });
        true
    }
}
