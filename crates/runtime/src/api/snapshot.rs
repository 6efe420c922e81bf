//! Read-only views of the world handed to clients.
use serde::{Deserialize, Serialize};

use game_core::{Creature, EntityId, GameState, Position, Tick};

/// Summary of one creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureView {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub health: i32,
    pub health_max: i32,
    pub is_monster: bool,
    pub attacked: Option<EntityId>,
    pub follow: Option<EntityId>,
    pub master: Option<EntityId>,
    /// Monster targets in priority order; empty for other creatures.
    pub targets: Vec<EntityId>,
    pub idle: bool,
}

impl CreatureView {
    fn new(state: &GameState, creature: &Creature) -> Self {
        let brain = state.monster(creature.id);
        Self {
            id: creature.id,
            name: creature.name.clone(),
            position: creature.position,
            health: creature.health,
            health_max: creature.health_max,
            is_monster: creature.is_monster(),
            attacked: creature.attacked,
            follow: creature.follow,
            master: creature.master,
            targets: brain
                .map(|brain| brain.targets.iter().copied().collect())
                .unwrap_or_default(),
            idle: brain.is_some_and(|brain| brain.is_idle()),
        }
    }
}

/// Point-in-time view of the whole world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub creatures: Vec<CreatureView>,
    pub active_monsters: Vec<EntityId>,
}

impl WorldSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            tick: state.clock,
            creatures: state
                .creatures
                .iter()
                .map(|creature| CreatureView::new(state, creature))
                .collect(),
            active_monsters: state.active_monsters(),
        }
    }

    pub fn creature(&self, id: EntityId) -> Option<&CreatureView> {
        self.creatures.iter().find(|view| view.id == id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &CreatureView> + '_ {
        self.creatures.iter().filter(|view| view.is_monster)
    }
}
