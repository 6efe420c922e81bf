//! Think step and reactions to other creatures.
use tracing::trace;

use crate::env::ScriptEvent;
use crate::state::{Creature, Direction, EntityId, Position, SpeakKind};

use super::{AiContext, Monster, TargetSearch};

impl Monster {
    /// One think step: pursuit bookkeeping, spawn zone, target upkeep and the
    /// retarget, yell and defense cadences.
    pub fn on_think(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        let event = ScriptEvent::Think {
            monster: self.id,
            interval,
        };
        if self.run_hook(ctx, self.species.scripts.think.as_deref(), event) {
            return;
        }

        self.update_follow(ctx, interval);

        if self.check_despawn(ctx) {
            return;
        }
        self.update_target_list(ctx);
        self.update_idle_status(ctx);
        if self.is_idle() {
            return;
        }

        if self.is_summon(ctx) {
            self.steer_summon(ctx);
        } else if !self.targets.is_empty() {
            let follow = self.follow(ctx);
            if follow.is_none() || !self.has_follow_path {
                self.search_target(ctx, TargetSearch::Default);
            } else if self.is_fleeing(ctx) {
                let position = self.position(ctx);
                let out_of_reach = self
                    .attacked(ctx)
                    .is_some_and(|attacked| !self.can_use_attack(ctx, position, attacked));
                if out_of_reach {
                    self.search_target(ctx, TargetSearch::AttackRange);
                }
            }
        }

        self.on_think_target(ctx, interval);
        self.on_think_yell(ctx, interval);
        self.on_think_defense(ctx, interval);
    }

    /// `id` was added to the world. Called for the monster itself as well.
    pub fn on_creature_appear(&mut self, ctx: &mut AiContext<'_>, id: EntityId) {
        let event = ScriptEvent::Appear {
            monster: self.id,
            creature: id,
        };
        if self.run_hook(ctx, self.species.scripts.appear.as_deref(), event) {
            return;
        }

        if id == self.id {
            self.refresh_master_in_range(ctx);
            self.update_target_list(ctx);
            self.update_idle_status(ctx);
        } else {
            self.on_creature_enter(ctx, id);
        }
    }

    /// `other` left the world; the body is already detached.
    pub fn on_creature_remove(&mut self, ctx: &mut AiContext<'_>, other: &Creature) {
        let event = ScriptEvent::Disappear {
            monster: self.id,
            creature: other.id,
        };
        if self.run_hook(ctx, self.species.scripts.disappear.as_deref(), event) {
            return;
        }

        self.forget_handles(ctx, other.id);
        if other.id != self.id {
            self.on_creature_leave(ctx, other);
        }
    }

    pub fn on_creature_move(
        &mut self,
        ctx: &mut AiContext<'_>,
        id: EntityId,
        from: Position,
        to: Position,
    ) {
        self.track_handles_after_move(ctx, id);

        let event = ScriptEvent::Move {
            monster: self.id,
            creature: id,
            from,
            to,
        };
        if self.run_hook(ctx, self.species.scripts.r#move.as_deref(), event) {
            return;
        }

        if id == self.id {
            self.refresh_master_in_range(ctx);
            self.update_target_list(ctx);
            self.update_idle_status(ctx);
            return;
        }

        let sees_new = self.can_see(ctx.creatures, to);
        let sees_old = self.can_see(ctx.creatures, from);
        if sees_new && !sees_old {
            self.on_creature_enter(ctx, id);
        } else if !sees_new && sees_old {
            if let Some(other) = ctx.creatures.get(id).cloned() {
                self.on_creature_leave(ctx, &other);
            }
        }
        if sees_new && self.master(ctx) == Some(id) {
            self.master_in_range = true;
        }
        self.update_idle_status(ctx);

        if !self.is_summon(ctx) {
            self.retarget_on_move(ctx, id);
        }
    }

    /// Say hooks observe speech but cannot change what the monster does.
    pub fn on_creature_say(
        &self,
        ctx: &AiContext<'_>,
        id: EntityId,
        kind: SpeakKind,
        text: &str,
    ) {
        let event = ScriptEvent::Say {
            monster: self.id,
            creature: id,
            kind,
            text: text.to_owned(),
        };
        self.run_hook(ctx, self.species.scripts.say.as_deref(), event);
    }

    fn refresh_master_in_range(&mut self, ctx: &AiContext<'_>) {
        if let Some(master) = self.master(ctx).and_then(|id| ctx.position_of(id)) {
            self.master_in_range = self.can_see(ctx.creatures, master);
        }
    }

    fn forget_handles(&mut self, ctx: &mut AiContext<'_>, id: EntityId) {
        let Some(body) = self.body(ctx) else {
            return;
        };
        let (attacked, follow) = (body.attacked, body.follow);
        if attacked == Some(id) {
            self.set_attacked(ctx, None);
        }
        if follow == Some(id) {
            self.set_follow(ctx, None);
        }
    }

    /// Keeps the attacked and followed handles honest after `id` moved:
    /// refreshes the follow path and drops handles that went out of view.
    fn track_handles_after_move(&mut self, ctx: &mut AiContext<'_>, id: EntityId) {
        let origin = self.position(ctx);
        let concerned = |handle: &EntityId| *handle == id || id == self.id;
        let follow = self.follow(ctx).filter(concerned);
        let attacked = self.attacked(ctx).filter(concerned);

        let lost = |handle: EntityId| {
            ctx.position_of(handle)
                .is_none_or(|position| position.z != origin.z || !super::sees(origin, position))
        };
        let follow_lost = follow.is_some_and(|handle| lost(handle));
        let attacked_lost = attacked.is_some_and(|handle| lost(handle));

        if follow.is_some() && self.has_follow_path {
            self.is_updating_path = true;
        }
        if follow_lost {
            self.set_follow(ctx, None);
        }
        if attacked_lost {
            self.set_attacked(ctx, None);
        }
    }

    /// Switches to a creature blocking the way to the follow target, or
    /// picks up an opponent when there is nothing to follow.
    fn retarget_on_move(&mut self, ctx: &mut AiContext<'_>, mover: EntityId) {
        let Some(follow) = self.follow(ctx) else {
            let opponent = ctx
                .creatures
                .get(mover)
                .is_some_and(|other| self.is_opponent(ctx.creatures, other));
            if opponent {
                self.select_target(ctx, mover);
            }
            return;
        };

        let position = self.position(ctx);
        let Some(follow_position) = ctx.position_of(follow) else {
            return;
        };
        let far = position.distance_x(follow_position) > 1
            || position.distance_y(follow_position) > 1;
        if !far || self.species.change_target_chance == 0 {
            return;
        }

        let ahead = position.step(Direction::towards(position, follow_position));
        let blocker = ctx
            .creatures
            .top_visible_creature(ahead, true)
            .filter(|other| other.id != follow && self.is_opponent(ctx.creatures, other))
            .map(|other| other.id);
        if let Some(blocker) = blocker {
            trace!(target: "game_core::ai", monster = %self.id, %blocker, "blocked, switching target");
            self.select_target(ctx, blocker);
        }
    }
}
