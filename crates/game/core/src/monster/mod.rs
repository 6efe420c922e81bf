//! Monster decision loop.
//!
//! A [`Monster`] is the AI half of a monster creature: target and friend
//! lists, cooldown counters and walk state. Its body (position, health,
//! attacked/follow handles) lives in the creature registry under the same id.
//!
//! The loop is split by concern:
//! - [`classifier`]: friend/opponent/target decisions
//! - [`registry`]: target and friend list maintenance
//! - [`selector`]: choosing the attacked/followed creature
//! - [`combat`]: attack, defense, summon, retarget and yell cadences
//! - [`movement`], [`distance`], [`pursuit`]: step selection and pathing
//! - [`lifecycle`]: spawn range, idle toggling, death and rewards
//! - [`spawn`]: placing new monsters and summons
//! - [`events`]: reactions to other creatures appearing, moving or leaving
mod classifier;
mod combat;
mod context;
mod distance;
mod events;
mod lifecycle;
mod movement;
mod pursuit;
mod registry;
mod selector;
mod spawn;

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

pub use classifier::sees;
pub use combat::facing;
pub use context::AiContext;
pub use distance::DistanceStep;
pub use lifecycle::corpse_owner;
pub use selector::{TargetSearch, assign_attacked};
pub use spawn::{find_placement, monster_creature};

use crate::env::{HookOutcome, ScriptError, ScriptEvent};
use crate::species::Species;
use crate::state::{Creature, Direction, EntityId, Position, Tick};

/// Per-mechanic cooldown counters, all in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatTicks {
    pub attack: u64,
    pub defense: u64,
    pub target_change: i64,
    pub target_change_cooldown: i64,
    pub challenge_focus: i64,
    pub yell: u64,
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: EntityId,
    pub species: Arc<Species>,
    /// Spawn anchor; `None` for summons and scripted spawns.
    pub spawn: Option<Position>,
    pub idle: bool,
    pub master_in_range: bool,
    pub walking_to_spawn: bool,
    pub has_follow_path: bool,
    pub is_updating_path: bool,
    pub force_update_follow_path: bool,
    pub walk_update_ticks: u64,
    pub friends: BTreeSet<EntityId>,
    /// Opponents in priority order; the front is preferred on ties.
    pub targets: VecDeque<EntityId>,
    pub walk_path: VecDeque<Direction>,
    pub ticks: CombatTicks,
    pub last_melee_attack: Option<Tick>,
    pub min_combat_value: i32,
    pub max_combat_value: i32,
    /// Extra step delay near the target, 0..=2.
    pub step_slowdown: u8,
}

impl Monster {
    pub fn new(id: EntityId, species: Arc<Species>, spawn: Option<Position>) -> Self {
        Self {
            id,
            species,
            spawn,
            idle: true,
            master_in_range: false,
            walking_to_spawn: false,
            has_follow_path: false,
            is_updating_path: false,
            force_update_follow_path: false,
            walk_update_ticks: 0,
            friends: BTreeSet::new(),
            targets: VecDeque::new(),
            walk_path: VecDeque::new(),
            ticks: CombatTicks::default(),
            last_melee_attack: None,
            min_combat_value: 0,
            max_combat_value: 0,
            step_slowdown: 0,
        }
    }

    pub fn body<'c>(&self, ctx: &'c AiContext<'_>) -> Option<&'c Creature> {
        ctx.creatures.get(self.id)
    }

    pub fn position(&self, ctx: &AiContext<'_>) -> Position {
        ctx.position_of(self.id).unwrap_or_default()
    }

    pub fn master(&self, ctx: &AiContext<'_>) -> Option<EntityId> {
        self.body(ctx).and_then(|body| body.master)
    }

    pub fn is_summon(&self, ctx: &AiContext<'_>) -> bool {
        self.master(ctx).is_some()
    }

    /// Current attacked creature, if its handle resolves to a living body.
    pub fn attacked(&self, ctx: &AiContext<'_>) -> Option<EntityId> {
        self.body(ctx)
            .and_then(|body| body.attacked)
            .filter(|id| ctx.creatures.alive(*id).is_some())
    }

    /// Current follow creature, if its handle resolves to a living body.
    pub fn follow(&self, ctx: &AiContext<'_>) -> Option<EntityId> {
        self.body(ctx)
            .and_then(|body| body.follow)
            .filter(|id| ctx.creatures.alive(*id).is_some())
    }

    pub fn is_hostile(&self) -> bool {
        self.species.hostile
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Low on health, not summoned and not held by a challenge.
    pub fn is_fleeing(&self, ctx: &AiContext<'_>) -> bool {
        let Some(body) = self.body(ctx) else {
            return false;
        };
        body.master.is_none()
            && body.health <= self.species.run_away_health
            && self.ticks.challenge_focus <= 0
    }

    /// Combat values of the last spell cast, if any.
    pub fn combat_values(&self) -> Option<(i32, i32)> {
        if self.min_combat_value == 0 && self.max_combat_value == 0 {
            return None;
        }
        Some((self.min_combat_value, self.max_combat_value))
    }

    /// Whether this monster, or its monster master, pushes items out of the way.
    pub fn can_push_items(&self, ctx: &AiContext<'_>) -> bool {
        self.master_species(ctx)
            .map_or(self.species.can_push_items, |species| species.can_push_items)
    }

    pub fn can_push_creatures(&self, ctx: &AiContext<'_>) -> bool {
        self.master_species(ctx)
            .map_or(self.species.can_push_creatures, |species| {
                species.can_push_creatures
            })
    }

    fn master_species<'c>(&self, ctx: &'c AiContext<'_>) -> Option<&'c Species> {
        let master = self.master(ctx)?;
        ctx.monsters.get(&master).map(|brain| brain.species.as_ref())
    }

    /// Runs a script hook bound to this species. Returns `true` when the
    /// handler vetoed the default logic.
    pub(crate) fn run_hook(
        &self,
        ctx: &AiContext<'_>,
        handler: Option<&str>,
        event: ScriptEvent,
    ) -> bool {
        let Some(handler) = handler else {
            return false;
        };
        match ctx.scripts.invoke(handler, &event, ctx.creatures) {
            Ok(HookOutcome::Stop) => true,
            Ok(HookOutcome::Continue | HookOutcome::NoHook) => false,
            Err(error @ ScriptError::CallStackOverflow(_)) => {
                tracing::error!(
                    target: "game_core::ai",
                    monster = %self.id,
                    event = event.name(),
                    %error,
                    "script hook aborted"
                );
                false
            }
            Err(error) => {
                tracing::warn!(
                    target: "game_core::ai",
                    monster = %self.id,
                    event = event.name(),
                    %error,
                    "script hook failed"
                );
                false
            }
        }
    }
}
