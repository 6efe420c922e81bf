use std::collections::BTreeMap;

use super::common::{EntityId, Position};
use super::creature::Creature;

/// Arena of live creatures, the resolution point for every [`EntityId`] handle.
///
/// A handle whose id is no longer present is expired. Iteration order is by id,
/// which keeps spectator enumeration deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureRegistry {
    creatures: BTreeMap<EntityId, Creature>,
    next_player_id: u32,
    next_monster_id: u32,
}

impl CreatureRegistry {
    pub fn new() -> Self {
        Self {
            creatures: BTreeMap::new(),
            next_player_id: 1,
            next_monster_id: EntityId::FIRST_MONSTER.0,
        }
    }

    pub fn allocate_player_id(&mut self) -> EntityId {
        let id = EntityId(self.next_player_id.max(1));
        self.next_player_id = id.0 + 1;
        id
    }

    pub fn allocate_monster_id(&mut self) -> EntityId {
        let id = EntityId(self.next_monster_id.max(EntityId::FIRST_MONSTER.0));
        self.next_monster_id = id.0 + 1;
        id
    }

    pub fn insert(&mut self, creature: Creature) {
        self.creatures.insert(creature.id, creature);
    }

    /// Detaches a creature from the world, marking the returned body removed.
    pub fn remove(&mut self, id: EntityId) -> Option<Creature> {
        let mut creature = self.creatures.remove(&id)?;
        creature.removed = true;
        Some(creature)
    }

    pub fn get(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.creatures.contains_key(&id)
    }

    /// Resolves a handle to a creature that is still alive.
    pub fn alive(&self, id: EntityId) -> Option<&Creature> {
        self.get(id).filter(|creature| !creature.is_dead())
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.creatures.keys().copied().collect()
    }

    pub fn player_by_guid(&self, guid: u32) -> Option<&Creature> {
        self.iter()
            .find(|creature| creature.profile().is_some_and(|profile| profile.guid == guid))
    }

    pub fn player_by_guid_mut(&mut self, guid: u32) -> Option<&mut Creature> {
        self.creatures
            .values_mut()
            .find(|creature| creature.profile().is_some_and(|profile| profile.guid == guid))
    }

    /// Creatures standing exactly on `position`, in id order.
    pub fn creatures_at(&self, position: Position) -> Vec<EntityId> {
        self.iter()
            .filter(|creature| creature.position == position)
            .map(|creature| creature.id)
            .collect()
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.iter().any(|creature| creature.position == position)
    }

    /// Topmost creature on a tile that `viewer_sees_invisible` allows to be seen.
    pub fn top_visible_creature(
        &self,
        position: Position,
        viewer_sees_invisible: bool,
    ) -> Option<&Creature> {
        self.iter()
            .filter(|creature| creature.position == position)
            .filter(|creature| viewer_sees_invisible || !creature.is_invisible())
            .last()
    }

    /// Creatures within the viewport around `center`, across visible floors.
    pub fn spectators(&self, center: Position, range_x: i32, range_y: i32) -> Vec<EntityId> {
        self.iter()
            .filter(|creature| center.can_see(creature.position, range_x, range_y))
            .map(|creature| creature.id)
            .collect()
    }

    /// Live summons of `master` whose species matches `species` (lower-case).
    pub fn summon_count(&self, master: EntityId, species: &str) -> usize {
        let Some(owner) = self.get(master) else {
            return 0;
        };
        owner
            .summons
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|summon| {
                summon
                    .monster_body()
                    .is_some_and(|body| body.species.eq_ignore_ascii_case(species))
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::creature::{CreatureKind, MonsterBody};

    fn monster(id: EntityId, species: &str, position: Position) -> Creature {
        Creature::new(
            id,
            species,
            CreatureKind::Monster(MonsterBody {
                species: species.to_lowercase(),
                pushable: false,
                hostile: true,
            }),
            position,
            100,
        )
    }

    #[test]
    fn removed_bodies_are_flagged_and_handles_expire() {
        let mut registry = CreatureRegistry::new();
        let id = registry.allocate_monster_id();
        registry.insert(monster(id, "Rat", Position::new(1, 1, 7)));

        let body = registry.remove(id).expect("present");
        assert!(body.removed);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn summon_count_matches_species_case_insensitively() {
        let mut registry = CreatureRegistry::new();
        let master = registry.allocate_monster_id();
        let first = registry.allocate_monster_id();
        let second = registry.allocate_monster_id();
        let mut owner = monster(master, "Necromancer", Position::new(5, 5, 7));
        owner.summons = vec![first, second];
        registry.insert(owner);
        registry.insert(monster(first, "Ghoul", Position::new(5, 6, 7)));
        registry.insert(monster(second, "Skeleton", Position::new(6, 6, 7)));

        assert_eq!(registry.summon_count(master, "GHOUL"), 1);
        assert_eq!(registry.summon_count(master, "bat"), 0);
    }
}
