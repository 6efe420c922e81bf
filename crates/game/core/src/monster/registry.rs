//! Friend and target list maintenance.
//!
//! Lists hold bare [`EntityId`] handles. A handle is only trusted after it
//! resolves through the creature registry, and reconciliation drops every
//! handle that no longer does.
use crate::config::GameConfig;
use crate::state::{Creature, EntityId};

use super::{AiContext, Monster};

impl Monster {
    /// Reconciles both lists with the world, then scans the viewport for new
    /// friends and opponents.
    pub fn update_target_list(&mut self, ctx: &mut AiContext<'_>) {
        let creatures = &*ctx.creatures;
        let Some(me) = creatures.get(self.id) else {
            return;
        };
        let origin = me.position;
        let sees_invisible = self.species.sees_invisible;
        let keep = |id: &EntityId| {
            creatures.alive(*id).is_some_and(|other| {
                (sees_invisible || !other.is_invisible()) && super::sees(origin, other.position)
            })
        };
        self.friends.retain(|id| keep(id));
        self.targets.retain(|id| keep(id));

        let spectators: Vec<EntityId> = creatures
            .spectators(origin, GameConfig::VIEWPORT_X, GameConfig::VIEWPORT_Y)
            .into_iter()
            .filter(|id| *id != self.id)
            .collect();
        for id in spectators {
            self.on_creature_found(ctx, id, false);
        }
    }

    pub fn on_creature_found(&mut self, ctx: &mut AiContext<'_>, id: EntityId, push_front: bool) {
        let Some(other) = ctx.creatures.get(id) else {
            return;
        };
        if id == self.id
            || other.is_dead()
            || !self.can_see_creature(other)
            || !self.can_see(ctx.creatures, other.position)
        {
            return;
        }
        let friend = self.is_friend(ctx.creatures, other);
        let opponent = self.is_opponent(ctx.creatures, other);

        if friend {
            self.friends.insert(id);
        }
        if opponent {
            self.add_target(id, push_front);
        }
        self.update_idle_status(ctx);
    }

    pub fn on_creature_enter(&mut self, ctx: &mut AiContext<'_>, id: EntityId) {
        if self.master(ctx) == Some(id) {
            self.master_in_range = true;
        }
        self.on_creature_found(ctx, id, true);
    }

    /// Forgets a creature that left the viewport or the world. `other` may be
    /// a detached body that no longer resolves.
    pub fn on_creature_leave(&mut self, ctx: &mut AiContext<'_>, other: &Creature) {
        if self.master(ctx) == Some(other.id) {
            self.master_in_range = false;
        }
        if self.is_friend(ctx.creatures, other) {
            self.friends.remove(&other.id);
        }
        if !self.is_opponent(ctx.creatures, other) {
            return;
        }

        self.remove_target(other.id);
        self.update_idle_status(ctx);

        if self.is_summon(ctx) || !self.targets.is_empty() {
            return;
        }
        let radius = ctx.config.walk_to_spawn_radius;
        let Some(anchor) = self.spawn else {
            return;
        };
        if radius > 0 && !self.position(ctx).in_range(anchor, radius, radius) {
            self.walk_to_spawn(ctx);
        }
    }

    /// Requeues the followed creature: to the front while a path to it
    /// exists, to the back otherwise. Summons drop it.
    pub fn on_follow_complete(&mut self, ctx: &AiContext<'_>, id: EntityId) {
        let Some(index) = self.targets.iter().position(|target| *target == id) else {
            return;
        };
        self.targets.remove(index);
        if self.has_follow_path {
            self.targets.push_front(id);
        } else if !self.is_summon(ctx) {
            self.targets.push_back(id);
        }
    }

    pub fn add_target(&mut self, id: EntityId, push_front: bool) {
        if id == self.id || self.targets.contains(&id) {
            return;
        }
        if push_front {
            self.targets.push_front(id);
        } else {
            self.targets.push_back(id);
        }
    }

    pub fn remove_target(&mut self, id: EntityId) {
        self.targets.retain(|target| *target != id);
    }

    /// Drops every reference to `id`: list entries and the attacked and
    /// follow handles.
    pub fn forget(&mut self, ctx: &mut AiContext<'_>, id: EntityId) {
        let was_friend = self.friends.remove(&id);
        let was_target = self.targets.contains(&id);
        self.remove_target(id);
        let (attacked, follow) = ctx
            .creatures
            .get(self.id)
            .map_or((false, false), |body| {
                (body.attacked == Some(id), body.follow == Some(id))
            });
        if attacked {
            self.set_attacked(ctx, None);
        }
        if follow {
            self.set_follow(ctx, None);
        }
        if was_friend || was_target || attacked || follow {
            self.update_idle_status(ctx);
        }
    }

    pub fn clear_lists(&mut self) {
        self.targets.clear();
        self.friends.clear();
    }
}
