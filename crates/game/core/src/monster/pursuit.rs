//! Follow path maintenance.
use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::env::FindPathParams;
use crate::state::{Direction, EntityId, Position};

use super::{AiContext, DistanceStep, Monster};

impl Monster {
    /// Think-time pursuit bookkeeping: drops handles to creatures that died,
    /// left or turned invisible, and refreshes the follow path when it is due.
    pub fn update_follow(&mut self, ctx: &mut AiContext<'_>, interval: u64) {
        self.drop_stale_handles(ctx);

        if self.follow(ctx).is_some() {
            self.walk_update_ticks += interval;
            if self.force_update_follow_path
                || self.walk_update_ticks >= GameConfig::FOLLOW_PATH_INTERVAL_MS
            {
                self.walk_update_ticks = 0;
                self.force_update_follow_path = false;
                self.is_updating_path = true;
            }
        }

        if self.is_updating_path {
            self.is_updating_path = false;
            self.go_to_follow_creature(ctx);
        }
    }

    fn drop_stale_handles(&mut self, ctx: &mut AiContext<'_>) {
        let Some(body) = self.body(ctx) else {
            return;
        };
        let master = body.master;
        let stale = |id: Option<EntityId>| {
            id.is_some_and(|id| match ctx.creatures.alive(id) {
                None => true,
                Some(other) => Some(id) != master && !self.can_see_creature(other),
            })
        };
        let drop_follow = stale(body.follow);
        let drop_attacked = stale(body.attacked);

        if drop_follow {
            self.set_follow(ctx, None);
        }
        if drop_attacked {
            self.set_attacked(ctx, None);
        }
    }

    /// Recomputes the walk towards (or away from) the follow target.
    pub fn go_to_follow_creature(&mut self, ctx: &mut AiContext<'_>) {
        let Some(follow) = self.follow(ctx) else {
            return;
        };
        let Some(target) = ctx.position_of(follow) else {
            return;
        };

        let params = self.path_search_params(ctx, follow);
        let fleeing = self.is_fleeing(ctx);
        if !self.is_summon(ctx) && (fleeing || params.max_target_dist > 1) {
            match self.distance_step(ctx, target, fleeing) {
                DistanceStep::Step(direction) => {
                    self.walk_path.clear();
                    self.walk_path.push_back(direction);
                    self.has_follow_path = true;
                }
                DistanceStep::InPosition | DistanceStep::Exhausted => {}
                DistanceStep::Failed => {
                    if !fleeing {
                        self.has_follow_path = self.path_to_follow(ctx, target, &params);
                        return;
                    }
                }
            }
        } else {
            self.has_follow_path = self.path_to_follow(ctx, target, &params);
        }

        self.on_follow_complete(ctx, follow);
    }

    fn path_to_follow(
        &mut self,
        ctx: &AiContext<'_>,
        target: Position,
        params: &FindPathParams,
    ) -> bool {
        match self.find_path(ctx, target, params) {
            Some(path) => {
                self.walk_path = path;
                true
            }
            None => {
                self.walk_path.clear();
                false
            }
        }
    }

    /// Path query parameters for chasing `follow`.
    pub fn path_search_params(&self, ctx: &AiContext<'_>, follow: EntityId) -> FindPathParams {
        let mut params = FindPathParams {
            full_path_search: !self.has_follow_path,
            clear_sight: true,
            allow_diagonal: true,
            keep_distance: false,
            max_search_dist: GameConfig::FOLLOW_SEARCH_DIST,
            min_target_dist: 1,
            max_target_dist: self.species.target_distance,
        };
        let position = self.position(ctx);

        if self.is_summon(ctx) {
            if self.master(ctx) == Some(follow) {
                params.max_target_dist = 2;
                params.full_path_search = true;
            } else if self.species.target_distance <= 1 {
                params.full_path_search = true;
            } else {
                params.full_path_search = !self.can_use_attack(ctx, position, follow);
            }
        } else if self.is_fleeing(ctx) {
            params.max_target_dist = GameConfig::MAX_VIEWPORT_X;
            params.clear_sight = false;
            params.keep_distance = true;
            params.full_path_search = false;
        } else if self.species.target_distance <= 1 {
            params.full_path_search = true;
        } else {
            params.full_path_search = !self.can_use_attack(ctx, position, follow);
        }
        params
    }

    pub(crate) fn find_path(
        &self,
        ctx: &AiContext<'_>,
        to: Position,
        params: &FindPathParams,
    ) -> Option<VecDeque<Direction>> {
        let from = self.position(ctx);
        let walkable = |position: Position| self.can_path_through(ctx, position);
        ctx.paths
            .find_path(from, to, params, &walkable)
            .map(VecDeque::from)
    }

    /// Tile rules used by path queries. Unlike wander steps, visible creatures
    /// this monster would push aside do not block.
    fn can_path_through(&self, ctx: &AiContext<'_>, position: Position) -> bool {
        if !self.is_in_spawn_range(ctx, position) || !self.tile_admits(ctx, position) {
            return false;
        }
        !self.creatures_block(ctx, position)
    }
}
