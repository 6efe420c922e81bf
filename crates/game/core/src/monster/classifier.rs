//! Friend / opponent / target classification.
//!
//! Pure functions of the current registry; nothing here mutates state.
use crate::config::GameConfig;
use crate::state::{Creature, CreatureRegistry, Position};
use crate::traits::{Combatant, Positioned};

use super::Monster;

impl Monster {
    /// Viewport check from the monster's current position.
    pub fn can_see(&self, creatures: &CreatureRegistry, position: Position) -> bool {
        creatures
            .get(self.id)
            .is_some_and(|body| sees(body.position, position))
    }

    /// Invisibility check, independent of distance.
    pub fn can_see_creature(&self, other: &Creature) -> bool {
        self.species.sees_invisible || !other.is_invisible()
    }

    pub fn is_friend(&self, creatures: &CreatureRegistry, other: &Creature) -> bool {
        let Some(body) = creatures.get(self.id) else {
            return false;
        };
        if let Some(master) = player_master(creatures, body) {
            let owner = if other.is_player() {
                Some(other.id)
            } else {
                other
                    .master
                    .and_then(|id| creatures.get(id))
                    .filter(|creature| creature.is_player())
                    .map(|creature| creature.id)
            };
            return owner.is_some_and(|owner| {
                owner == master.id
                    || master
                        .profile()
                        .is_some_and(|profile| profile.is_partner(owner))
            });
        }
        other.is_monster() && !other.is_summon()
    }

    pub fn is_opponent(&self, creatures: &CreatureRegistry, other: &Creature) -> bool {
        let Some(body) = creatures.get(self.id) else {
            return false;
        };
        if let Some(master) = player_master(creatures, body) {
            return other.id != master.id;
        }
        let hunted_player = other
            .profile()
            .is_some_and(|profile| !profile.ignored_by_monsters());
        let player_summon = other
            .master
            .and_then(|id| creatures.get(id))
            .is_some_and(Creature::is_player);
        hunted_player || player_summon
    }

    /// Whether `other` may currently be attacked or followed.
    pub fn is_target(&self, creatures: &CreatureRegistry, other: &Creature) -> bool {
        if other.removed
            || other.is_dead()
            || !other.can_be_attacked()
            || !self.can_see_creature(other)
        {
            return false;
        }
        creatures
            .get(self.id)
            .is_some_and(|body| body.same_floor(other.position))
    }
}

/// Monster viewport between two positions.
pub fn sees(from: Position, to: Position) -> bool {
    from.can_see(to, GameConfig::VIEWPORT_X, GameConfig::VIEWPORT_Y)
}

/// The player owning `body`, when `body` is a player's summon.
fn player_master<'r>(creatures: &'r CreatureRegistry, body: &Creature) -> Option<&'r Creature> {
    body.master
        .and_then(|id| creatures.get(id))
        .filter(|master| master.is_player())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Conditions, EntityId, PlayerFlags, Zone};
    use crate::testing::{brain, monster_body, player_body};

    fn registry() -> CreatureRegistry {
        CreatureRegistry::new()
    }

    #[test]
    fn wild_monster_hunts_players_and_befriends_monsters() {
        let mut creatures = registry();
        let me = EntityId(0x4000_0001);
        creatures.insert(monster_body(me, "orc", Position::new(10, 10, 7)));
        let player = player_body(EntityId(1), Position::new(12, 10, 7));
        let ally = monster_body(EntityId(0x4000_0002), "orc", Position::new(9, 10, 7));
        creatures.insert(player.clone());
        creatures.insert(ally.clone());
        let monster = brain(me, "orc");

        assert!(monster.is_opponent(&creatures, &player));
        assert!(!monster.is_friend(&creatures, &player));
        assert!(monster.is_friend(&creatures, &ally));
        assert!(!monster.is_opponent(&creatures, &ally));
    }

    #[test]
    fn ignored_players_are_not_opponents_but_their_summons_are() {
        let mut creatures = registry();
        let me = EntityId(0x4000_0001);
        creatures.insert(monster_body(me, "orc", Position::new(10, 10, 7)));
        let mut player = player_body(EntityId(1), Position::new(12, 10, 7));
        if let Some(profile) = player.profile_mut() {
            profile.flags |= PlayerFlags::IGNORED_BY_MONSTERS;
        }
        creatures.insert(player.clone());
        let mut pet = monster_body(EntityId(0x4000_0005), "wolf", Position::new(11, 10, 7));
        pet.master = Some(player.id);
        creatures.insert(pet.clone());
        let monster = brain(me, "orc");

        assert!(!monster.is_opponent(&creatures, &player));
        assert!(monster.is_opponent(&creatures, &pet));
        assert!(!monster.is_friend(&creatures, &pet));
    }

    #[test]
    fn player_summon_sides_with_master_and_partners() {
        let mut creatures = registry();
        let owner = EntityId(1);
        let partner = EntityId(2);
        let stranger = EntityId(3);
        let me = EntityId(0x4000_0001);
        let mut owner_body = player_body(owner, Position::new(10, 10, 7));
        if let Some(profile) = owner_body.profile_mut() {
            profile.partners.insert(partner);
        }
        owner_body.summons.push(me);
        creatures.insert(owner_body.clone());
        let partner_body = player_body(partner, Position::new(11, 11, 7));
        let stranger_body = player_body(stranger, Position::new(12, 12, 7));
        creatures.insert(partner_body.clone());
        creatures.insert(stranger_body.clone());
        let mut summon = monster_body(me, "wolf", Position::new(10, 11, 7));
        summon.master = Some(owner);
        creatures.insert(summon);
        let monster = brain(me, "wolf");

        assert!(monster.is_friend(&creatures, &owner_body));
        assert!(monster.is_friend(&creatures, &partner_body));
        assert!(!monster.is_friend(&creatures, &stranger_body));
        assert!(!monster.is_opponent(&creatures, &owner_body));
        assert!(monster.is_opponent(&creatures, &partner_body));
    }

    #[test]
    fn targets_must_be_visible_attackable_and_on_same_floor() {
        let mut creatures = registry();
        let me = EntityId(0x4000_0001);
        creatures.insert(monster_body(me, "orc", Position::new(10, 10, 7)));
        let monster = brain(me, "orc");

        let mut player = player_body(EntityId(1), Position::new(12, 10, 7));
        assert!(monster.is_target(&creatures, &player));

        player.conditions |= Conditions::INVISIBLE;
        assert!(!monster.is_target(&creatures, &player));
        player.conditions = Conditions::empty();

        player.zone = Zone::Protection;
        assert!(!monster.is_target(&creatures, &player));
        player.zone = Zone::Normal;

        player.position.z = 6;
        assert!(!monster.is_target(&creatures, &player));
        player.position.z = 7;

        player.health = 0;
        assert!(!monster.is_target(&creatures, &player));
    }
}
