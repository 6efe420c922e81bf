//! Creature placement shared by world spawns and summon casts.
use crate::env::{MapOracle, RngOracle, shuffle};
use crate::species::Species;
use crate::state::{
    Creature, CreatureKind, CreatureRegistry, Direction, EntityId, GroundItems, ItemFlags,
    MonsterBody, Position, SpawnError,
};

/// Picks the tile a new monster lands on: `center` when it is free (or when
/// `forced`), otherwise a shuffled neighbour, straight ones first.
pub fn find_placement(
    map: &dyn MapOracle,
    creatures: &CreatureRegistry,
    ground: &GroundItems,
    rng: &mut dyn RngOracle,
    center: Position,
    forced: bool,
) -> Result<Position, SpawnError> {
    if map.tile(center).is_some() && (forced || is_free(map, creatures, ground, center)) {
        return Ok(center);
    }

    let mut straight = Direction::CARDINAL;
    let mut diagonal = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];
    shuffle(rng, &mut straight);
    shuffle(rng, &mut diagonal);

    straight
        .into_iter()
        .chain(diagonal)
        .map(|direction| center.step(direction))
        .find(|&position| is_free(map, creatures, ground, position))
        .ok_or(SpawnError::NoFreeTile { position: center })
}

fn is_free(
    map: &dyn MapOracle,
    creatures: &CreatureRegistry,
    ground: &GroundItems,
    position: Position,
) -> bool {
    let Some(tile) = map.tile(position) else {
        return false;
    };
    tile.is_walkable()
        && !tile.is_protection_zone()
        && !ground.any_with(position, ItemFlags::BLOCK_SOLID)
        && !creatures.is_occupied(position)
}

/// Fresh body for a monster of `species`.
pub fn monster_creature(id: EntityId, species: &Species, position: Position) -> Creature {
    let kind = CreatureKind::Monster(MonsterBody {
        species: species.key(),
        pushable: species.pushable,
        hostile: species.hostile,
    });
    let mut body = Creature::new(id, species.name.clone(), kind, position, species.health);
    body.speed = species.speed;
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use crate::testing::{OpenMap, monster_body};

    #[test]
    fn occupied_center_spills_to_a_neighbour() {
        let map = OpenMap::new(32, 32);
        let mut creatures = CreatureRegistry::new();
        let center = Position::new(10, 10, 7);
        creatures.insert(monster_body(EntityId(0x4000_0001), "orc", center));
        let mut rng = PcgRng::seeded(3);

        let placed =
            find_placement(&map, &creatures, &GroundItems::new(), &mut rng, center, false);
        let placed = placed.expect("free neighbour");
        assert_ne!(placed, center);
        assert_eq!(placed.chebyshev(center), 1);
    }

    #[test]
    fn forced_placement_shares_the_center() {
        let map = OpenMap::new(32, 32);
        let mut creatures = CreatureRegistry::new();
        let center = Position::new(10, 10, 7);
        creatures.insert(monster_body(EntityId(0x4000_0001), "orc", center));
        let mut rng = PcgRng::seeded(3);

        let placed = find_placement(&map, &creatures, &GroundItems::new(), &mut rng, center, true);
        assert_eq!(placed, Ok(center));
    }

    #[test]
    fn walled_in_center_reports_no_free_tile() {
        let mut map = OpenMap::new(32, 32);
        let mut creatures = CreatureRegistry::new();
        let center = Position::new(10, 10, 7);
        creatures.insert(monster_body(EntityId(0x4000_0001), "orc", center));
        for direction in Direction::ALL {
            map.wall(center.step(direction));
        }
        let mut rng = PcgRng::seeded(3);

        let placed =
            find_placement(&map, &creatures, &GroundItems::new(), &mut rng, center, false);
        assert_eq!(placed, Err(SpawnError::NoFreeTile { position: center }));
    }
}
