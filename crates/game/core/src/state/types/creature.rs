//! Creature bodies shared by players, monsters and npcs.
//!
//! Behavior that differs by kind dispatches on [`CreatureKind`]; AI-specific
//! state for monsters lives in [`crate::monster::Monster`] keyed by the same id.
use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;

use super::common::{Direction, EntityId, Position, Tick};
use crate::reward::RewardContainer;

bitflags! {
    /// Active conditions on a creature.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Conditions: u16 {
        const FIRE = 1 << 0;
        const POISON = 1 << 1;
        const ENERGY = 1 << 2;
        const BLEEDING = 1 << 3;
        const INVISIBLE = 1 << 4;
        const PARALYZE = 1 << 5;
        const HASTE = 1 << 6;
        const IN_FIGHT = 1 << 7;
    }
}

impl Conditions {
    /// Damage-over-time conditions keep a monster awake.
    pub const AGGRESSIVE: Conditions = Conditions::FIRE
        .union(Conditions::POISON)
        .union(Conditions::ENERGY)
        .union(Conditions::BLEEDING);

    pub fn has_aggressive(self) -> bool {
        self.intersects(Self::AGGRESSIVE)
    }
}

bitflags! {
    /// Account-level player flags relevant to monster behavior.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PlayerFlags: u8 {
        const IGNORED_BY_MONSTERS = 1 << 0;
        const CANNOT_BE_ATTACKED = 1 << 1;
    }
}

/// Zone type of the tile a creature stands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Zone {
    #[default]
    Normal,
    Protection,
    NoPvp,
}

/// Player-only data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerProfile {
    /// Persistent character id used by the reward storage.
    pub guid: u32,
    pub flags: PlayerFlags,
    /// Players sharing a party with this one.
    pub partners: BTreeSet<EntityId>,
    pub reward_chest: Vec<RewardContainer>,
}

impl PlayerProfile {
    pub fn new(guid: u32) -> Self {
        Self {
            guid,
            ..Self::default()
        }
    }

    pub fn is_partner(&self, other: EntityId) -> bool {
        self.partners.contains(&other)
    }

    pub fn ignored_by_monsters(&self) -> bool {
        self.flags.contains(PlayerFlags::IGNORED_BY_MONSTERS)
    }
}

/// Monster data other creatures need to inspect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterBody {
    /// Lower-case species name, used for summon bookkeeping.
    pub species: String,
    pub pushable: bool,
    pub hostile: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureKind {
    Player(PlayerProfile),
    Monster(MonsterBody),
    Npc,
}

/// A creature present in (or just removed from) the world.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    pub id: EntityId,
    pub name: String,
    pub kind: CreatureKind,
    pub position: Position,
    pub direction: Direction,
    pub health: i32,
    pub health_max: i32,
    pub speed: u32,
    pub master: Option<EntityId>,
    pub summons: Vec<EntityId>,
    pub attacked: Option<EntityId>,
    pub follow: Option<EntityId>,
    pub zone: Zone,
    pub conditions: Conditions,
    pub attackable: bool,
    pub removed: bool,
    pub drop_loot: bool,
    pub skill_loss: bool,
    pub last_move_at: Tick,
    /// Accumulated damage received per attacker.
    pub damage_map: BTreeMap<EntityId, i64>,
}

impl Creature {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        kind: CreatureKind,
        position: Position,
        health: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            position,
            direction: Direction::default(),
            health,
            health_max: health,
            speed: 220,
            master: None,
            summons: Vec::new(),
            attacked: None,
            follow: None,
            zone: Zone::Normal,
            conditions: Conditions::empty(),
            attackable: true,
            removed: false,
            drop_loot: true,
            skill_loss: true,
            last_move_at: Tick::ZERO,
            damage_map: BTreeMap::new(),
        }
    }

    pub fn player(
        id: EntityId,
        name: impl Into<String>,
        guid: u32,
        position: Position,
        health: i32,
    ) -> Self {
        Self::new(
            id,
            name,
            CreatureKind::Player(PlayerProfile::new(guid)),
            position,
            health,
        )
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CreatureKind::Player(_))
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CreatureKind::Monster(_))
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        match &self.kind {
            CreatureKind::Player(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn profile_mut(&mut self) -> Option<&mut PlayerProfile> {
        match &mut self.kind {
            CreatureKind::Player(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn monster_body(&self) -> Option<&MonsterBody> {
        match &self.kind {
            CreatureKind::Monster(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_summon(&self) -> bool {
        self.master.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn is_invisible(&self) -> bool {
        self.conditions.contains(Conditions::INVISIBLE)
    }

    pub fn is_pushable(&self) -> bool {
        self.monster_body().is_some_and(|body| body.pushable)
    }

    /// Attacker with the highest accumulated damage; the lowest id wins ties.
    pub fn most_damage_attacker(&self) -> Option<EntityId> {
        let mut best: Option<(EntityId, i64)> = None;
        for (&attacker, &total) in &self.damage_map {
            if best.is_none_or(|(_, top)| total > top) {
                best = Some((attacker, total));
            }
        }
        best.map(|(attacker, _)| attacker)
    }
}
