//! Attack, defense, summon, retarget and yell cadences.
use std::sync::Arc;

use tracing::{debug, trace};

use crate::species::SpellBlock;
use crate::state::{
    Direction, EntityId, MagicEffect, Notification, Position, SpeakKind, WorldEvent,
};

use super::spawn::{find_placement, monster_creature};
use super::{AiContext, Monster, TargetSearch};

/// Outcome of gating one spell block for the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SpellGate {
    usable: bool,
    in_range: bool,
    /// The block is still cooling down; the phase counter must not reset.
    cooling: bool,
}

impl SpellGate {
    const READY: Self = Self {
        usable: true,
        in_range: true,
        cooling: false,
    };

    const fn blocked() -> Self {
        Self {
            usable: false,
            ..Self::READY
        }
    }
}

impl Monster {
    /// Attack phase. `interval` is 0 for the deferred check scheduled by a
    /// fresh target selection.
    pub fn do_attacking(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        let Some(target) = self.attacked(ctx) else {
            return;
        };
        if target == self.id && self.is_summon(ctx) {
            return;
        }
        let position = self.position(ctx);
        let Some(target_position) = ctx.position_of(target) else {
            return;
        };
        if !ctx.is_sight_clear(position, target_position) {
            return;
        }

        let mut reset_ticks = interval != 0;
        self.ticks.attack += interval;
        let mut update_look = true;
        let fleeing = self.is_fleeing(ctx);
        let distance = position.chebyshev(target_position).unsigned_abs();
        let species = Arc::clone(&self.species);

        for block in &species.attack_spells {
            let gate = self.spell_gate(ctx, block, distance, self.ticks.attack, interval, fleeing);
            if gate.cooling {
                reset_ticks = false;
            }
            if gate.usable && ctx.chance(block.chance) {
                if update_look {
                    self.update_look_direction(ctx);
                    update_look = false;
                }
                self.cast(ctx, block, target);
                if block.melee {
                    self.last_melee_attack = Some(ctx.now);
                }
            }
            if block.melee && !gate.in_range {
                self.last_melee_attack = None;
            }
        }

        if update_look && self.last_melee_attack.is_none() {
            self.update_look_direction(ctx);
        }
        if reset_ticks {
            self.ticks.attack = 0;
        }
    }

    /// Defense spells and summon casts.
    pub fn on_think_defense(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        let mut reset_ticks = true;
        self.ticks.defense += interval;
        let ticks = self.ticks.defense;
        let species = Arc::clone(&self.species);

        for block in &species.defense_spells {
            let gate = self.spell_gate(ctx, block, 0, ticks, interval, false);
            if gate.cooling {
                reset_ticks = false;
            }
            if gate.usable && ctx.chance(block.chance) {
                self.cast(ctx, block, self.id);
            }
        }

        let cap = species.max_summons as usize;
        if !self.is_summon(ctx) && self.has_follow_path && self.live_summons(ctx) < cap {
            for block in &species.summons {
                let speed = u64::from(block.speed);
                if speed == 0 {
                    continue;
                }
                if speed > ticks {
                    reset_ticks = false;
                    continue;
                }
                if self.live_summons(ctx) >= cap || ticks % speed >= interval {
                    continue;
                }
                if ctx.creatures.summon_count(self.id, &block.name) >= block.max as usize {
                    continue;
                }
                if !ctx.chance(block.chance) {
                    continue;
                }
                self.place_summon(ctx, &block.name, block.force, block.effect, block.master_effect);
            }
        }

        if reset_ticks {
            self.ticks.defense = 0;
        }
    }

    /// Periodic retarget for monsters with a target change cadence.
    pub fn on_think_target(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        let speed = i64::from(self.species.change_target_speed);
        if self.is_summon(ctx) || speed == 0 {
            return;
        }
        let interval = interval as i64;
        let ticks = &mut self.ticks;

        if ticks.challenge_focus > 0 {
            ticks.challenge_focus = (ticks.challenge_focus - interval).max(0);
        }
        if ticks.target_change_cooldown > 0 {
            ticks.target_change_cooldown -= interval;
            if ticks.target_change_cooldown > 0 {
                return;
            }
            ticks.target_change_cooldown = 0;
            ticks.target_change = speed;
        }

        ticks.target_change += interval;
        if ticks.target_change < speed {
            return;
        }
        ticks.target_change = 0;
        ticks.target_change_cooldown = speed;
        ticks.challenge_focus = 0;

        if ctx.chance(self.species.change_target_chance) {
            let search = if self.species.target_distance <= 1 {
                TargetSearch::Random
            } else {
                TargetSearch::Nearest
            };
            debug!(target: "game_core::combat", monster = %self.id, %search, "retarget");
            self.search_target(ctx, search);
        }
    }

    pub fn on_think_yell(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        let speed = u64::from(self.species.yell_speed_ticks);
        if speed == 0 {
            return;
        }
        self.ticks.yell += interval;
        if self.ticks.yell < speed {
            return;
        }
        self.ticks.yell = 0;

        if self.species.voices.is_empty() || !ctx.chance(self.species.yell_chance) {
            return;
        }
        let voice = &self.species.voices[ctx.rng.index(self.species.voices.len())];
        let kind = if voice.yell {
            SpeakKind::MonsterYell
        } else {
            SpeakKind::MonsterSay
        };
        let text = voice.text.clone();
        ctx.emit(WorldEvent::CreatureSay {
            speaker: self.id,
            kind,
            text: text.clone(),
        });
        ctx.outbox.notify(Notification::Spoke {
            creature: self.id,
            kind,
            text,
        });
    }

    /// Turns towards the attacked creature along the dominant axis.
    pub fn update_look_direction(&self, ctx: &mut AiContext<'_>) {
        let Some(target) = self.attacked(ctx).and_then(|id| ctx.position_of(id)) else {
            return;
        };
        let direction = facing(self.position(ctx), target);
        let Some(body) = ctx.creatures.get_mut(self.id) else {
            return;
        };
        if body.direction == direction {
            return;
        }
        body.direction = direction;
        ctx.emit(WorldEvent::CreatureTurn {
            creature: self.id,
            direction,
        });
    }

    fn spell_gate(
        &self,
        ctx: &AiContext<'_>,
        block: &SpellBlock,
        distance: u32,
        ticks: u64,
        interval: u64,
        fleeing: bool,
    ) -> SpellGate {
        if block.melee {
            if fleeing {
                return SpellGate::blocked();
            }
            let speed = u64::from(block.speed);
            let ready = self
                .last_melee_attack
                .is_none_or(|at| ctx.now.since(at) >= speed);
            if !ready {
                return SpellGate::blocked();
            }
        } else {
            let speed = u64::from(block.speed);
            if speed == 0 {
                return SpellGate::blocked();
            }
            if speed > ticks {
                return SpellGate {
                    cooling: true,
                    ..SpellGate::blocked()
                };
            }
            if ticks % speed >= interval {
                return SpellGate::blocked();
            }
        }

        if block.range != 0 && distance > block.range {
            return SpellGate {
                in_range: false,
                ..SpellGate::blocked()
            };
        }
        SpellGate::READY
    }

    fn cast(&mut self, ctx: &mut AiContext<'_>, block: &SpellBlock, target: EntityId) {
        self.min_combat_value = block.min_combat_value;
        self.max_combat_value = block.max_combat_value;
        trace!(
            target: "game_core::combat",
            monster = %self.id,
            %target,
            spell = %block.spell,
            "cast"
        );
        ctx.emit(WorldEvent::SpellCast {
            caster: self.id,
            target,
            spell: block.spell.clone(),
            min: block.min_combat_value,
            max: block.max_combat_value,
        });
    }

    fn live_summons(&self, ctx: &AiContext<'_>) -> usize {
        self.body(ctx).map_or(0, |body| {
            body.summons
                .iter()
                .filter(|id| ctx.creatures.contains(**id))
                .count()
        })
    }

    /// Creates and places one summon next to this monster. Unknown species or
    /// a crowded neighbourhood skip the cast.
    fn place_summon(
        &mut self,
        ctx: &mut AiContext<'_>,
        name: &str,
        force: bool,
        effect: MagicEffect,
        master_effect: MagicEffect,
    ) {
        let Some(species) = ctx.species.species(name) else {
            debug!(target: "game_core::combat", monster = %self.id, name, "unknown summon species");
            return;
        };
        let center = self.position(ctx);
        let Ok(position) =
            find_placement(ctx.map, ctx.creatures, ctx.ground, ctx.rng, center, force)
        else {
            return;
        };

        let id = ctx.creatures.allocate_monster_id();
        let mut body = monster_creature(id, &species, position);
        body.drop_loot = false;
        body.skill_loss = false;
        body.master = Some(self.id);
        ctx.creatures.insert(body);
        if let Some(master) = ctx.creatures.get_mut(self.id) {
            master.summons.push(id);
        }

        let mut brain = Monster::new(id, species, None);
        brain.idle = false;
        brain.master_in_range = true;
        ctx.monsters.insert(id, brain);
        ctx.active.insert(id);

        debug!(target: "game_core::combat", monster = %self.id, summon = %id, %position, "summon placed");
        ctx.emit(WorldEvent::CreatureAppeared {
            creature: id,
            position,
        });
        ctx.emit(WorldEvent::SummonPlaced {
            master: self.id,
            summon: id,
            position,
        });
        ctx.outbox.effect(position, effect);
        ctx.outbox.effect(center, master_effect);
        ctx.outbox.notify(Notification::Appeared { creature: id });
    }
}

/// Direction from `from` that faces `target`; exact diagonals face west or
/// east.
pub fn facing(from: Position, target: Position) -> Direction {
    let offset_x = target.x - from.x;
    let offset_y = target.y - from.y;
    if offset_y.abs() > offset_x.abs() {
        if offset_y < 0 {
            Direction::North
        } else {
            Direction::South
        }
    } else if offset_x < 0 {
        Direction::West
    } else {
        Direction::East
    }
}
