//! Immutable species definitions shared by every monster of a kind.
//!
//! A [`Species`] is loaded once by the content layer and handed out as
//! `Arc<Species>`; monster instances never mutate it.
use std::collections::BTreeMap;

use crate::state::MagicEffect;

/// Damage or healing channel of a combat value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CombatType {
    Physical,
    Energy,
    Earth,
    Fire,
    Ice,
    Holy,
    Death,
    Drown,
    LifeDrain,
    ManaDrain,
    Healing,
}

/// One attack or defense entry of a species.
///
/// The spell itself is executed by the combat system; the AI only decides when
/// to cast it and emits a cast request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellBlock {
    pub spell: String,
    /// Cooldown in milliseconds.
    pub speed: u32,
    /// Percent chance to cast once the cooldown elapsed.
    pub chance: u32,
    /// Maximum Chebyshev distance to the target; 0 means unlimited.
    pub range: u32,
    pub min_combat_value: i32,
    pub max_combat_value: i32,
    pub melee: bool,
}

impl SpellBlock {
    pub fn melee(speed: u32, min: i32, max: i32) -> Self {
        Self {
            spell: "melee".to_owned(),
            speed,
            chance: 100,
            range: 1,
            min_combat_value: min,
            max_combat_value: max,
            melee: true,
        }
    }

    pub fn ranged(spell: impl Into<String>, speed: u32, chance: u32, range: u32) -> Self {
        Self {
            spell: spell.into(),
            speed,
            chance,
            range,
            ..Self::default()
        }
    }
}

impl Default for SpellBlock {
    fn default() -> Self {
        Self {
            spell: String::new(),
            speed: 2000,
            chance: 100,
            range: 0,
            min_combat_value: 0,
            max_combat_value: 0,
            melee: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SummonBlock {
    pub name: String,
    /// Maximum concurrent summons of this name.
    pub max: u32,
    pub chance: u32,
    pub speed: u32,
    pub effect: MagicEffect,
    pub master_effect: MagicEffect,
    /// Place the summon even when the tile next to the summoner is taken.
    pub force: bool,
}

impl Default for SummonBlock {
    fn default() -> Self {
        Self {
            name: String::new(),
            max: 1,
            chance: 100,
            speed: 1000,
            effect: MagicEffect::Teleport,
            master_effect: MagicEffect::None,
            force: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoiceBlock {
    pub text: String,
    pub yell: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LootBlock {
    pub item_type: u16,
    /// Drop chance out of 100 000.
    pub chance: u32,
    pub count_max: u16,
    /// Only the top contributor of a reward boss may roll this entry.
    pub unique: bool,
}

impl Default for LootBlock {
    fn default() -> Self {
        Self {
            item_type: 0,
            chance: 0,
            count_max: 1,
            unique: false,
        }
    }
}

/// Script handler names bound to a species.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeciesScripts {
    pub appear: Option<String>,
    pub disappear: Option<String>,
    pub r#move: Option<String>,
    pub say: Option<String>,
    pub think: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Species {
    pub name: String,
    pub health: i32,
    pub speed: u32,
    pub hostile: bool,
    pub pushable: bool,
    pub can_push_items: bool,
    pub can_push_creatures: bool,
    pub challengeable: bool,
    pub reward_boss: bool,
    pub sees_invisible: bool,
    /// Preferred distance to the followed target.
    pub target_distance: i32,
    /// Percent chance per step to hold position next to the target.
    pub static_attack_chance: u32,
    /// Health at or below which the monster flees.
    pub run_away_health: i32,
    /// Retarget cadence in milliseconds; 0 disables retargeting.
    pub change_target_speed: i32,
    pub change_target_chance: u32,
    pub yell_speed_ticks: u32,
    pub yell_chance: u32,
    pub voices: Vec<VoiceBlock>,
    pub attack_spells: Vec<SpellBlock>,
    pub defense_spells: Vec<SpellBlock>,
    pub summons: Vec<SummonBlock>,
    pub max_summons: u32,
    pub loot: Vec<LootBlock>,
    /// Percent damage reduction per combat type (negative amplifies).
    pub element_mods: BTreeMap<CombatType, i32>,
    pub scripts: SpeciesScripts,
}

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Lower-case name used to key summon bookkeeping.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn element_mod(&self, combat: CombatType) -> i32 {
        self.element_mods.get(&combat).copied().unwrap_or(0)
    }

    /// Damage after the element modifier, never negative.
    pub fn scale_damage(&self, combat: CombatType, damage: i32) -> i32 {
        let modifier = self.element_mod(combat);
        if modifier == 0 {
            return damage.max(0);
        }
        let scaled = (damage as f64 * (100 - modifier) as f64 / 100.0).round();
        (scaled as i32).max(0)
    }
}

impl Default for Species {
    fn default() -> Self {
        Self {
            name: String::new(),
            health: 100,
            speed: 220,
            hostile: true,
            pushable: true,
            can_push_items: false,
            can_push_creatures: false,
            challengeable: true,
            reward_boss: false,
            sees_invisible: false,
            target_distance: 1,
            static_attack_chance: 95,
            run_away_health: 0,
            change_target_speed: 0,
            change_target_chance: 0,
            yell_speed_ticks: 0,
            yell_chance: 0,
            voices: Vec::new(),
            attack_spells: Vec::new(),
            defense_spells: Vec::new(),
            summons: Vec::new(),
            max_summons: 0,
            loot: Vec::new(),
            element_mods: BTreeMap::new(),
            scripts: SpeciesScripts::default(),
        }
    }
}
