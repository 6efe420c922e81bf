//! Reward boss score tracking and loot distribution.
//!
//! Every tracked boss keeps a table of per-player contributions. When the boss
//! dies the table is turned into one [`RewardShare`] per contributor; the
//! lifecycle code delivers the resulting containers and resets the table.
use std::collections::BTreeMap;
use std::fmt;

use crate::config::GameConfig;
use crate::env::RngOracle;
use crate::species::LootBlock;
use crate::state::{EntityId, Tick};

/// One stack of items inside a reward container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardItem {
    pub item_type: u16,
    pub count: u16,
}

impl fmt::Display for RewardItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count > 1 {
            write!(f, "{} x item {}", self.count, self.item_type)
        } else {
            write!(f, "item {}", self.item_type)
        }
    }
}

/// Loot earned from one boss kill by one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardContainer {
    /// Id of the boss the loot came from.
    pub boss: EntityId,
    pub boss_name: String,
    pub created_at: Tick,
    pub items: Vec<RewardItem>,
}

impl RewardContainer {
    pub fn new(boss: EntityId, boss_name: impl Into<String>, created_at: Tick) -> Self {
        Self {
            boss,
            boss_name: boss_name.into(),
            created_at,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Comma separated content listing used in loot messages.
    pub fn description(&self) -> String {
        if self.items.is_empty() {
            return "nothing".to_owned();
        }
        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Contribution of one player to a boss fight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub damage_done: i64,
    pub damage_taken: i64,
    pub healing_done: i64,
}

impl Score {
    pub fn total(&self) -> i64 {
        self.damage_done + self.damage_taken + self.healing_done
    }
}

/// Scores of one boss, keyed by player guid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BossScoreTable {
    pub scores: BTreeMap<u32, Score>,
}

impl BossScoreTable {
    /// Contributor with the strictly highest positive score; the lowest guid
    /// wins ties.
    pub fn top_contributor(&self) -> Option<u32> {
        let mut top: Option<(u32, i64)> = None;
        for (&guid, score) in &self.scores {
            let total = score.total();
            if total > top.map_or(0, |(_, best)| best) {
                top = Some((guid, total));
            }
        }
        top.map(|(guid, _)| guid)
    }

    pub fn total(&self) -> i64 {
        self.scores.values().map(Score::total).sum()
    }
}

/// Score tables of every reward boss currently alive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardTracker {
    tables: BTreeMap<EntityId, BossScoreTable>,
}

impl RewardTracker {
    pub fn track(&mut self, boss: EntityId) {
        self.tables.entry(boss).or_default();
    }

    pub fn untrack(&mut self, boss: EntityId) {
        self.tables.remove(&boss);
    }

    pub fn is_tracked(&self, boss: EntityId) -> bool {
        self.tables.contains_key(&boss)
    }

    pub fn table(&self, boss: EntityId) -> Option<&BossScoreTable> {
        self.tables.get(&boss)
    }

    pub fn record_damage_done(&mut self, boss: EntityId, guid: u32, amount: i64) {
        if let Some(table) = self.tables.get_mut(&boss) {
            table.scores.entry(guid).or_default().damage_done += amount;
        }
    }

    pub fn record_damage_taken(&mut self, boss: EntityId, guid: u32, amount: i64) {
        if let Some(table) = self.tables.get_mut(&boss) {
            table.scores.entry(guid).or_default().damage_taken += amount;
        }
    }

    /// Credits healing to every boss fight the healer already takes part in.
    pub fn record_healing(&mut self, guid: u32, amount: i64) {
        for table in self.tables.values_mut() {
            if let Some(score) = table.scores.get_mut(&guid) {
                score.healing_done += amount;
            }
        }
    }

    pub fn reset(&mut self, boss: EntityId) {
        if let Some(table) = self.tables.get_mut(&boss) {
            table.scores.clear();
        }
    }
}

/// Weights applied to each kind of contribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardRates {
    pub base: f64,
    pub damage_done: f64,
    pub damage_taken: f64,
    pub healing_done: f64,
}

impl From<&GameConfig> for RewardRates {
    fn from(config: &GameConfig) -> Self {
        Self {
            base: config.reward_base_rate,
            damage_done: config.reward_rate_damage_done,
            damage_taken: config.reward_rate_damage_taken,
            healing_done: config.reward_rate_healing_done,
        }
    }
}

/// Result of the distribution for one contributor.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardShare {
    pub guid: u32,
    pub contribution: f64,
    /// Whether the player pulled enough weight to roll for loot.
    pub qualified: bool,
    pub items: Vec<RewardItem>,
}

/// Where a non-empty reward container ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewardDelivery {
    /// Added to the chest of a player currently in the world.
    Online {
        player: EntityId,
        container: RewardContainer,
    },
    /// Handed to persistence for a player who is offline.
    Persist {
        player_guid: u32,
        container: RewardContainer,
    },
}

/// Rolls the loot of every contributor in guid order.
pub fn distribute(
    table: &BossScoreTable,
    loot: &[LootBlock],
    rates: RewardRates,
    rng: &mut dyn RngOracle,
) -> Vec<RewardShare> {
    let contributors = table.scores.len();
    let total = table.total() as f64;
    let top = table.top_contributor();
    let loot_rate = rates.base.max(1.0) as i64;

    let mut shares = Vec::with_capacity(contributors);
    for (&guid, score) in &table.scores {
        // Healing carries its own rate; configs wanting it to count like damage
        // set `healing_done` equal to `damage_done`.
        let contribution = score.damage_done as f64 * rates.damage_done
            + score.damage_taken as f64 * rates.damage_taken
            + score.healing_done as f64 * rates.healing_done;
        let expected = if contribution != 0.0 {
            total / (contributors as f64 * 3.0)
        } else {
            0.0
        };

        let qualified = contribution >= expected;
        let mut items = Vec::new();
        if qualified {
            for block in loot {
                if block.unique && top != Some(guid) {
                    continue;
                }
                let chance = rng.range(1, GameConfig::MAX_LOOT_CHANCE as i64);
                let count = rng.range(1, block.count_max.max(1) as i64) as u16;
                if chance <= block.chance as i64 * loot_rate {
                    items.push(RewardItem {
                        item_type: block.item_type,
                        count,
                    });
                }
            }
        }
        shares.push(RewardShare {
            guid,
            contribution,
            qualified,
            items,
        });
    }
    shares
}
