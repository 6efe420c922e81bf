//! Step selection, walking and pushing blockers out of the way.
use arrayvec::ArrayVec;
use tracing::trace;

use crate::config::GameConfig;
use crate::env::shuffle;
use crate::state::{Direction, EntityId, ItemFlags, ItemId, MagicEffect, Position, WorldEvent};
use crate::traits::Mobile;

use super::{AiContext, Monster};

const BLOCKING: ItemFlags = ItemFlags::BLOCK_PATH.union(ItemFlags::BLOCK_SOLID);

impl Monster {
    /// Whether the tile one step from `from` is a valid wander or flee
    /// destination.
    pub fn can_walk_to(&self, ctx: &AiContext<'_>, from: Position, direction: Direction) -> bool {
        let to = from.step(direction);
        self.is_in_spawn_range(ctx, to)
            && self.tile_admits(ctx, to)
            && ctx
                .creatures
                .top_visible_creature(to, self.species.sees_invisible)
                .is_none()
            && !self.creatures_block(ctx, to)
    }

    /// Whether live creatures on `position` keep this monster off it. Monsters
    /// that push creatures, unless summoned, only stop at unpushable ones.
    pub(crate) fn creatures_block(&self, ctx: &AiContext<'_>, position: Position) -> bool {
        let pushes = self.can_push_creatures(ctx) && !self.is_summon(ctx);
        ctx.creatures.iter().any(|other| {
            other.position == position
                && other.id != self.id
                && !other.is_dead()
                && !(pushes && other.is_pushable())
        })
    }

    /// Static tile and item rules for entering `position`.
    pub(crate) fn tile_admits(&self, ctx: &AiContext<'_>, position: Position) -> bool {
        let Some(tile) = ctx.map.tile(position) else {
            return false;
        };
        if tile.blocks_path() || tile.is_protection_zone() || tile.changes_floor() {
            return false;
        }
        let pushes_items = self.can_push_items(ctx);
        !ctx.ground.at(position).iter().any(|item| {
            item.flags.intersects(BLOCKING)
                && !(pushes_items && item.flags.contains(ItemFlags::MOVEABLE))
        })
    }

    /// First walkable direction of the shuffled cardinals.
    pub fn random_step(&self, ctx: &mut AiContext<'_>, from: Position) -> Option<Direction> {
        let mut directions = Direction::CARDINAL;
        shuffle(ctx.rng, &mut directions);
        directions
            .into_iter()
            .find(|&direction| self.can_walk_to(ctx, from, direction))
    }

    /// Sidestep around the attacked creature that keeps the Chebyshev
    /// distance unchanged.
    pub fn dance_step(
        &self,
        ctx: &mut AiContext<'_>,
        from: Position,
        keep_attack: bool,
        keep_distance: bool,
    ) -> Option<Direction> {
        let attacked = self.attacked(ctx)?;
        let center = ctx.position_of(attacked)?;
        let can_attack_now = self.can_use_attack(ctx, from, attacked);

        let offset_x = from.offset_x(center);
        let offset_y = from.offset_y(center);
        let center_distance = from.chebyshev(center);

        let considered = [
            (Direction::North, !keep_distance || offset_y >= 0),
            (Direction::South, !keep_distance || offset_y <= 0),
            (Direction::East, !keep_distance || offset_x <= 0),
            (Direction::West, !keep_distance || offset_x >= 0),
        ];
        let candidates: ArrayVec<Direction, 4> = considered
            .into_iter()
            .filter(|&(_, considered)| considered)
            .map(|(direction, _)| direction)
            .filter(|&direction| {
                let next = from.step(direction);
                next.chebyshev(center) == center_distance
                    && self.can_walk_to(ctx, from, direction)
                    && (!keep_attack || !can_attack_now || self.can_use_attack(ctx, next, attacked))
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[ctx.rng.index(candidates.len())])
    }

    /// Decides the next step, if any, and clears blockers on its destination.
    pub fn next_step(&mut self, ctx: &mut AiContext<'_>) -> Option<Direction> {
        let body = self.body(ctx)?;
        let (position, dead, last_move_at) = (body.position, body.is_dead(), body.last_move_at);
        if !self.walking_to_spawn && (self.idle || dead) {
            return None;
        }

        let follow = self.follow(ctx);
        let summon = self.is_summon(ctx);
        let mut step = None;

        if !self.walking_to_spawn
            && (follow.is_none() || !self.has_follow_path)
            && (!summon || !self.master_in_range)
        {
            if ctx.now.since(last_move_at) >= GameConfig::RANDOM_STEP_INTERVAL_MS {
                step = self.random_step(ctx, position);
            }
        } else if (summon && self.master_in_range) || follow.is_some() || self.walking_to_spawn {
            let monster_master = self
                .master(ctx)
                .and_then(|master| ctx.creatures.get(master))
                .is_some_and(|master| !master.is_player());
            if !self.has_follow_path && monster_master {
                step = self.random_step(ctx, position);
            } else {
                step = self.walk_path.pop_front();
                if step.is_none() {
                    step = self.target_dance(ctx, position, follow);
                }
            }
        }

        if let Some(direction) = step {
            let destination = position.step(direction);
            if self.can_push_items(ctx) {
                self.push_items(ctx, destination);
            }
            if self.can_push_creatures(ctx) {
                self.push_creatures(ctx, destination);
            }
        }
        step
    }

    fn target_dance(
        &self,
        ctx: &mut AiContext<'_>,
        position: Position,
        follow: Option<EntityId>,
    ) -> Option<Direction> {
        let attacked = self.attacked(ctx);
        if attacked.is_none() || attacked != follow {
            return None;
        }
        if self.is_fleeing(ctx) {
            return self.dance_step(ctx, position, false, false);
        }
        if self.species.static_attack_chance < ctx.rng.roll_d100() {
            return self.dance_step(ctx, position, true, true);
        }
        None
    }

    /// Milliseconds between two steps, stretched while close to the target.
    pub fn step_interval(&self, ctx: &AiContext<'_>) -> u64 {
        let base = self.body(ctx).map_or(0, |body| body.step_duration());
        base + base * u64::from(self.step_slowdown) / 2
    }

    pub fn is_step_due(&self, ctx: &AiContext<'_>) -> bool {
        let interval = self.step_interval(ctx);
        interval > 0
            && self
                .body(ctx)
                .is_some_and(|body| ctx.now.since(body.last_move_at) >= interval)
    }

    /// Takes one step when due. Returns whether the monster moved.
    pub fn walk(&mut self, ctx: &mut AiContext<'_>) -> bool {
        if !self.is_step_due(ctx) {
            return false;
        }
        let position = self.position(ctx);

        let Some(direction) = self.next_step(ctx) else {
            if self.walk_path.is_empty() {
                self.on_walk_complete(ctx);
            }
            return false;
        };

        let destination = position.step(direction);
        if !self.tile_admits(ctx, destination) || self.creatures_block(ctx, destination) {
            self.force_update_follow_path = true;
            return false;
        }
        trace!(target: "game_core::ai", monster = %self.id, %direction, "step");
        ctx.relocate(self.id, destination)
    }

    /// Throws moveable blockers off `position`, destroying what cannot be
    /// thrown.
    pub fn push_items(&self, ctx: &mut AiContext<'_>, position: Position) {
        let blockers: Vec<ItemId> = ctx
            .ground
            .at(position)
            .iter()
            .rev()
            .filter(|item| item.is_pushable_blocker())
            .map(|item| item.id)
            .collect();

        let mut moved = 0;
        let mut removed = 0;
        for item in blockers {
            if moved < GameConfig::MAX_PUSHED_ITEMS && throw_item(ctx, item, position) {
                moved += 1;
            } else if ctx.ground.remove(item).is_some() {
                ctx.emit(WorldEvent::ItemRemoved { item, position });
                removed += 1;
            }
        }
        if removed > 0 {
            ctx.outbox.effect(position, MagicEffect::Poff);
        }
    }

    /// Shoves pushable monsters off `position`; the ones that cannot move die.
    pub fn push_creatures(&self, ctx: &mut AiContext<'_>, position: Position) {
        let occupants: Vec<EntityId> = ctx
            .creatures
            .creatures_at(position)
            .into_iter()
            .filter(|id| *id != self.id)
            .collect();

        let mut killed = 0;
        let mut last_pushed = None;
        for id in occupants {
            let pushable = ctx
                .creatures
                .get(id)
                .is_some_and(|other| other.is_pushable() && !other.is_dead());
            if !pushable {
                continue;
            }
            if last_pushed != Some(id) && push_creature(ctx, id) {
                last_pushed = Some(id);
                continue;
            }
            if let Some(other) = ctx.creatures.get_mut(id) {
                other.drop_loot = false;
            }
            ctx.kill(id);
            killed += 1;
        }
        if killed > 0 {
            ctx.outbox.effect(position, MagicEffect::BlockHit);
        }
    }
}

fn occupied(ctx: &AiContext<'_>, position: Position) -> bool {
    ctx.creatures
        .iter()
        .any(|creature| creature.position == position && !creature.is_dead())
}

fn can_throw_to(ctx: &AiContext<'_>, from: Position, to: Position) -> bool {
    from.z == to.z
        && from.distance_x(to) <= GameConfig::THROW_RANGE_X
        && from.distance_y(to) <= GameConfig::THROW_RANGE_Y
        && ctx.map.is_sight_clear(from, to, false)
}

fn throw_item(ctx: &mut AiContext<'_>, item: ItemId, from: Position) -> bool {
    let mut offsets = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];
    shuffle(ctx.rng, &mut offsets);

    for (dx, dy) in offsets {
        let to = from.translate(dx, dy);
        let walkable = ctx.map.tile(to).is_some_and(|tile| tile.is_walkable());
        if !walkable || !can_throw_to(ctx, from, to) {
            continue;
        }
        if ctx.ground.relocate(item, to).is_some() {
            ctx.emit(WorldEvent::ItemMoved { item, from, to });
            return true;
        }
    }
    false
}

fn push_creature(ctx: &mut AiContext<'_>, id: EntityId) -> bool {
    let Some(from) = ctx.position_of(id) else {
        return false;
    };
    let mut directions = [
        Direction::North,
        Direction::West,
        Direction::East,
        Direction::South,
    ];
    shuffle(ctx.rng, &mut directions);

    for direction in directions {
        let to = from.step(direction);
        let open = ctx
            .map
            .tile(to)
            .is_some_and(|tile| !tile.blocks_path() && !tile.is_protection_zone());
        if open && !ctx.ground.any_with(to, BLOCKING) && !occupied(ctx, to) {
            return ctx.relocate(id, to);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use crate::state::Tick;
    use crate::testing::TestWorld;

    fn pusher() -> Species {
        Species {
            can_push_items: true,
            can_push_creatures: true,
            ..Species::new("behemoth")
        }
    }

    #[test]
    fn dance_step_keeps_chebyshev_distance() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        let alice = world.player("Alice", Position::new(13, 10, 7));

        for _ in 0..10 {
            let step = world.run(orc, |monster, ctx| {
                monster.add_target(alice, false);
                monster.select_target(ctx, alice);
                monster.dance_step(ctx, Position::new(10, 10, 7), true, true)
            });
            let direction = step.expect("a sidestep exists");
            assert!(matches!(direction, Direction::North | Direction::South));
            let next = Position::new(10, 10, 7).step(direction);
            assert_eq!(next.chebyshev(Position::new(13, 10, 7)), 3);
        }
    }

    #[test]
    fn idle_monsters_do_not_step() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        world.state.clock = Tick(5000);

        let step = world.run(orc, |monster, ctx| monster.next_step(ctx));
        assert_eq!(step, None);
    }

    #[test]
    fn wandering_waits_a_second_between_random_steps() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        world.state.clock = Tick(1500);
        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.last_move_at = Tick(1000);
        }

        let step = world.run(orc, |monster, ctx| {
            monster.idle = false;
            monster.next_step(ctx)
        });
        assert_eq!(step, None);

        world.state.clock = Tick(2000);
        let step = world.run(orc, |monster, ctx| monster.next_step(ctx));
        assert!(step.is_some());
    }

    #[test]
    fn step_interval_grows_with_slowdown() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.speed = 200;
        }

        world.run(orc, |monster, ctx| {
            assert_eq!(monster.step_interval(ctx), 500);
            monster.step_slowdown = 2;
            assert_eq!(monster.step_interval(ctx), 1000);
        });
    }

    #[test]
    fn blocking_items_are_thrown_to_a_neighbour() {
        let mut world = TestWorld::new();
        world.add_species(pusher());
        let me = world.monster("behemoth", Position::new(10, 10, 7));
        let target = Position::new(11, 10, 7);
        let barrel = world.state.ground.spawn(
            target,
            1774,
            1,
            ItemFlags::MOVEABLE | ItemFlags::BLOCK_SOLID,
        );

        world.run(me, |monster, ctx| monster.push_items(ctx, target));

        let landed = world.state.ground.find(barrel).map(|(at, _)| at);
        assert!(landed.is_some_and(|at| at != target && at.chebyshev(target) == 1));
    }

    #[test]
    fn unthrowable_items_are_destroyed_with_poff() {
        let mut world = TestWorld::new();
        world.add_species(pusher());
        let me = world.monster("behemoth", Position::new(10, 10, 7));
        let target = Position::new(11, 10, 7);
        for direction in Direction::ALL {
            world.wall(target.step(direction));
        }
        let heavy = world.state.ground.spawn(
            target,
            1739,
            1,
            ItemFlags::MOVEABLE | ItemFlags::BLOCK_SOLID,
        );

        world.run(me, |monster, ctx| monster.push_items(ctx, target));

        assert!(world.state.ground.find(heavy).is_none());
        assert!(world.state.outbox.events.contains(&WorldEvent::MagicEffect {
            position: target,
            effect: MagicEffect::Poff,
        }));
    }

    #[test]
    fn pushers_may_step_onto_pushable_creatures() {
        let mut world = TestWorld::new();
        world.add_species(pusher());
        let me = world.monster("behemoth", Position::new(10, 10, 7));
        let lurker = world.monster("orc", Position::new(11, 10, 7));
        let orc = world.monster("orc", Position::new(12, 10, 7));
        if let Some(body) = world.state.creatures.get_mut(lurker) {
            body.conditions |= crate::state::Conditions::INVISIBLE;
        }

        let pusher_passes = world.run(me, |monster, ctx| {
            monster.can_walk_to(ctx, Position::new(10, 10, 7), Direction::East)
        });
        let plain_passes = world.run(orc, |monster, ctx| {
            monster.can_walk_to(ctx, Position::new(12, 10, 7), Direction::West)
        });
        assert!(pusher_passes);
        assert!(!plain_passes);

        let south = Position::new(10, 11, 7);
        world.player("Alice", south);
        assert!(world.run(me, |monster, ctx| monster.creatures_block(ctx, south)));
    }

    #[test]
    fn boxed_in_creatures_are_crushed() {
        let mut world = TestWorld::new();
        world.add_species(pusher());
        let me = world.monster("behemoth", Position::new(10, 10, 7));
        let victim_at = Position::new(11, 10, 7);
        let victim = world.monster("orc", victim_at);
        for direction in Direction::CARDINAL {
            let around = victim_at.step(direction);
            if around != Position::new(10, 10, 7) {
                world.wall(around);
            }
        }

        world.run(me, |monster, ctx| monster.push_creatures(ctx, victim_at));

        assert!(world.state.creatures.get(victim).is_some_and(|body| body.is_dead()));
        assert!(world.state.outbox.events.contains(&WorldEvent::MagicEffect {
            position: victim_at,
            effect: MagicEffect::BlockHit,
        }));
    }

    #[test]
    fn pushable_creatures_are_shoved_aside() {
        let mut world = TestWorld::new();
        world.add_species(pusher());
        let me = world.monster("behemoth", Position::new(10, 10, 7));
        let victim_at = Position::new(11, 10, 7);
        let victim = world.monster("orc", victim_at);

        world.run(me, |monster, ctx| monster.push_creatures(ctx, victim_at));

        let body = world.state.creatures.get(victim).expect("victim");
        assert!(!body.is_dead());
        assert_ne!(body.position, victim_at);
    }
}
