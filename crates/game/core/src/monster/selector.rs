//! Choosing which registered target to attack and follow.
use crate::config::GameConfig;
use crate::state::{CreatureRegistry, DeferredTask, EntityId, Position};

use super::{AiContext, Monster};

/// Strategy used when picking a new target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TargetSearch {
    #[default]
    Default,
    Random,
    /// Smallest Manhattan distance; earlier entries win ties.
    Nearest,
    /// Only targets an attack can reach right now, no fallback.
    AttackRange,
}

impl Monster {
    /// Makes `id` the attacked (when hostile or summoned) and followed creature.
    /// Returns whether following succeeded.
    pub fn select_target(&mut self, ctx: &mut AiContext<'_>, id: EntityId) -> bool {
        let Some(other) = ctx.creatures.get(id) else {
            return false;
        };
        if !self.is_target(ctx.creatures, other) || !self.targets.contains(&id) {
            return false;
        }

        let summon = self.is_summon(ctx);
        if (self.is_hostile() || summon) && self.set_attacked(ctx, Some(id)) && !summon {
            ctx.outbox.defer(DeferredTask::CheckAttack(self.id));
        }
        tracing::trace!(target: "game_core::ai", monster = %self.id, target = %id, "target selected");
        self.set_follow(ctx, Some(id))
    }

    pub fn search_target(&mut self, ctx: &mut AiContext<'_>, search: TargetSearch) -> bool {
        let origin = self.position(ctx);
        let follow = self.follow(ctx);

        let mut candidates = Vec::new();
        for &id in &self.targets {
            if Some(id) == follow {
                continue;
            }
            let Some(other) = ctx.creatures.get(id) else {
                continue;
            };
            if !self.is_target(ctx.creatures, other) {
                continue;
            }
            if search == TargetSearch::Random || self.can_use_attack(ctx, origin, id) {
                candidates.push((id, other.position));
            }
        }

        match search {
            TargetSearch::Nearest => {
                let nearest = nearest_of(origin, candidates.iter().copied()).or_else(|| {
                    let everyone = self.targets.iter().filter_map(|&id| {
                        ctx.creatures
                            .get(id)
                            .filter(|other| self.is_target(ctx.creatures, other))
                            .map(|other| (id, other.position))
                    });
                    nearest_of(origin, everyone)
                });
                if let Some(id) = nearest {
                    if self.select_target(ctx, id) {
                        return true;
                    }
                }
            }
            TargetSearch::Default | TargetSearch::Random | TargetSearch::AttackRange => {
                if !candidates.is_empty() {
                    let (id, _) = candidates[ctx.rng.index(candidates.len())];
                    return self.select_target(ctx, id);
                }
                if search == TargetSearch::AttackRange {
                    return false;
                }
            }
        }

        let queue: Vec<EntityId> = self.targets.iter().copied().collect();
        for id in queue {
            if Some(id) != follow && ctx.creatures.contains(id) && self.select_target(ctx, id) {
                return true;
            }
        }
        false
    }

    /// Whether some attack could hit `target` if the monster stood on `from`.
    pub fn can_use_attack(&self, ctx: &AiContext<'_>, from: Position, target: EntityId) -> bool {
        if !self.is_hostile() {
            return true;
        }
        let Some(target_position) = ctx.position_of(target) else {
            return false;
        };
        let distance = from.chebyshev(target_position) as u32;
        self.species
            .attack_spells
            .iter()
            .find(|block| block.range != 0 && distance <= block.range)
            .is_some_and(|_| ctx.is_sight_clear(from, target_position))
    }

    pub fn set_attacked(&mut self, ctx: &mut AiContext<'_>, target: Option<EntityId>) -> bool {
        assign_attacked(ctx.creatures, self.id, target)
    }

    pub fn set_follow(&mut self, ctx: &mut AiContext<'_>, target: Option<EntityId>) -> bool {
        let Some(body) = ctx.creatures.get(self.id) else {
            return false;
        };
        let origin = body.position;
        let current = body.follow;

        let Some(target) = target else {
            self.is_updating_path = false;
            if let Some(body) = ctx.creatures.get_mut(self.id) {
                body.follow = None;
            }
            return true;
        };
        if current == Some(target) {
            return true;
        }

        let reachable = ctx
            .position_of(target)
            .is_some_and(|position| position.z == origin.z && super::sees(origin, position));
        let Some(body) = ctx.creatures.get_mut(self.id) else {
            return false;
        };
        if !reachable {
            body.follow = None;
            return false;
        }
        body.follow = Some(target);
        self.walk_path.clear();
        self.has_follow_path = false;
        self.force_update_follow_path = false;
        self.is_updating_path = true;
        true
    }

    /// Forces this monster onto `target`. Challenged monsters hold the target
    /// and stop fleeing for a while.
    pub fn challenge(&mut self, ctx: &mut AiContext<'_>, target: EntityId, force: bool) -> bool {
        if self.is_summon(ctx) {
            return false;
        }
        if !self.species.challengeable && !force {
            return false;
        }
        let selected = self.select_target(ctx, target);
        if selected {
            self.ticks.target_change_cooldown = GameConfig::CHALLENGE_FOCUS_MS;
            self.ticks.challenge_focus = GameConfig::CHALLENGE_FOCUS_MS;
            self.ticks.target_change = 0;
        }
        selected
    }

    /// Keeps a summon attacking what its master attacks, or at its master's
    /// side when there is nothing to attack.
    pub fn steer_summon(&mut self, ctx: &mut AiContext<'_>) {
        let Some(master) = self.master(ctx) else {
            return;
        };
        let attacked = self.attacked(ctx);
        let follow = self.follow(ctx);

        match attacked {
            None => {
                let master_target = ctx
                    .creatures
                    .get(master)
                    .and_then(|body| body.attacked)
                    .filter(|id| ctx.creatures.contains(*id));
                if let Some(target) = master_target {
                    self.select_target(ctx, target);
                } else if follow != Some(master) {
                    self.set_follow(ctx, Some(master));
                }
            }
            Some(target) if target == self.id => {
                self.set_follow(ctx, None);
            }
            Some(target) => {
                if follow != Some(target) {
                    self.set_follow(ctx, Some(target));
                }
            }
        }
    }
}

/// Sets the attacked creature of `owner` and, on success or clear, of all its
/// summons. Fails when the target is on another floor or out of view.
pub fn assign_attacked(
    creatures: &mut CreatureRegistry,
    owner: EntityId,
    target: Option<EntityId>,
) -> bool {
    let Some(body) = creatures.get(owner) else {
        return false;
    };
    let origin = body.position;
    let summons = body.summons.clone();

    if let Some(target) = target {
        let visible = creatures
            .get(target)
            .is_some_and(|other| other.position.z == origin.z && super::sees(origin, other.position));
        if !visible {
            if let Some(body) = creatures.get_mut(owner) {
                body.attacked = None;
            }
            return false;
        }
    }

    if let Some(body) = creatures.get_mut(owner) {
        body.attacked = target;
    }
    for summon in summons {
        assign_attacked(creatures, summon, target);
    }
    true
}

fn nearest_of(
    origin: Position,
    candidates: impl Iterator<Item = (EntityId, Position)>,
) -> Option<EntityId> {
    let mut best: Option<(EntityId, i32)> = None;
    for (id, position) in candidates {
        let distance = origin.manhattan(position);
        if best.is_none_or(|(_, min)| distance < min) {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}
