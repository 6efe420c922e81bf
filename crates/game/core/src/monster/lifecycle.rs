//! Spawn zone, idle scheduling, health changes and death.
use tracing::debug;

use crate::env::FindPathParams;
use crate::reward::{self, RewardContainer, RewardDelivery, RewardRates};
use crate::species::CombatType;
use crate::state::{
    Conditions, Creature, CreatureRegistry, DeferredTask, EntityId, MagicEffect, PendingReward,
    Position, WorldEvent,
};

use super::{AiContext, Monster};

const NO_LOOT_MESSAGE: &str = "You did not receive any loot.";

impl Monster {
    pub fn is_in_spawn_range(&self, ctx: &AiContext<'_>, position: Position) -> bool {
        let Some(anchor) = self.spawn else {
            return true;
        };
        let radius = ctx.config.despawn_radius;
        if radius == 0 {
            return true;
        }
        if !anchor.in_range(position, radius, radius) {
            return false;
        }
        let range = ctx.config.despawn_range;
        range == 0 || anchor.distance_z(position) <= range
    }

    /// Sends a monster that strayed from its spawn zone home, or removes it.
    /// Returns whether it was despawned.
    pub fn check_despawn(&mut self, ctx: &mut AiContext<'_>) -> bool {
        let position = self.position(ctx);
        if self.is_in_spawn_range(ctx, position) {
            return false;
        }
        let Some(anchor) = self.spawn else {
            return false;
        };

        debug!(target: "game_core::lifecycle", monster = %self.id, %position, "left spawn zone");
        ctx.outbox.effect(position, MagicEffect::Poff);
        if ctx.config.remove_on_despawn {
            ctx.remove_creature(self.id);
        } else {
            ctx.teleport(self.id, anchor);
            self.set_idle(ctx, true);
        }
        true
    }

    pub fn set_idle(&mut self, ctx: &mut AiContext<'_>, idle: bool) {
        let Some(body) = self.body(ctx) else {
            return;
        };
        if body.removed || body.is_dead() {
            return;
        }
        self.switch_idle(ctx, idle);
    }

    /// The idle transition itself, without the liveness guard of
    /// [`Monster::set_idle`].
    fn switch_idle(&mut self, ctx: &mut AiContext<'_>, idle: bool) {
        let changed = self.idle != idle;
        self.idle = idle;
        if idle {
            self.on_idle_status(ctx);
            self.clear_lists();
            ctx.active.remove(&self.id);
        } else {
            ctx.active.insert(self.id);
        }

        if changed {
            debug!(target: "game_core::lifecycle", monster = %self.id, idle, "idle status changed");
            ctx.emit(WorldEvent::IdleChanged {
                creature: self.id,
                idle,
            });
        }
    }

    /// Idle when wild, without targets and without aggressive conditions.
    pub fn update_idle_status(&mut self, ctx: &mut AiContext<'_>) {
        let aggressive = self
            .body(ctx)
            .is_some_and(|body| body.conditions.has_aggressive());
        let idle = !self.is_summon(ctx) && self.targets.is_empty() && !aggressive;
        self.set_idle(ctx, idle);
    }

    fn on_idle_status(&mut self, ctx: &mut AiContext<'_>) {
        if let Some(body) = ctx.creatures.get_mut(self.id) {
            if body.health > 0 {
                body.damage_map.clear();
            }
        }
    }

    /// Starts walking back to the spawn anchor. Returns whether a path was
    /// found.
    pub fn walk_to_spawn(&mut self, ctx: &mut AiContext<'_>) -> bool {
        if self.walking_to_spawn || !self.targets.is_empty() {
            return false;
        }
        let Some(anchor) = self.spawn else {
            return false;
        };
        let position = self.position(ctx);
        let distance = position.chebyshev(anchor);
        if distance == 0 {
            return false;
        }

        let params = FindPathParams {
            full_path_search: true,
            clear_sight: true,
            allow_diagonal: true,
            keep_distance: false,
            max_search_dist: distance,
            min_target_dist: 0,
            max_target_dist: (distance - 5).max(0),
        };
        let Some(path) = self.find_path(ctx, anchor, &params) else {
            return false;
        };
        debug!(target: "game_core::lifecycle", monster = %self.id, steps = path.len(), "walking to spawn");
        self.walk_path = path;
        self.walking_to_spawn = true;
        true
    }

    pub fn on_walk_complete(&mut self, ctx: &mut AiContext<'_>) {
        if self.walking_to_spawn {
            self.walking_to_spawn = false;
            self.walk_to_spawn(ctx);
        }
    }

    /// Applies a health change from `source`; negative amounts are damage.
    /// Returns the change actually applied.
    pub fn change_health(
        &mut self,
        ctx: &mut AiContext<'_>,
        source: Option<EntityId>,
        combat: CombatType,
        amount: i32,
    ) -> i32 {
        self.set_idle(ctx, false);

        let Some(body) = ctx.creatures.get_mut(self.id) else {
            return 0;
        };
        if body.is_dead() {
            return 0;
        }

        let applied = if amount < 0 {
            let damage = self.species.scale_damage(combat, -amount);
            body.conditions.remove(Conditions::INVISIBLE);
            body.health = (body.health - damage).max(0);
            if let Some(source) = source {
                *body.damage_map.entry(source).or_default() += damage as i64;
            }
            -damage
        } else {
            let before = body.health;
            body.health = (body.health + amount).min(body.health_max);
            body.health - before
        };
        let (health, health_max) = (body.health, body.health_max);

        ctx.emit(WorldEvent::HealthChanged {
            creature: self.id,
            health,
            health_max,
        });
        if applied < 0 && self.species.reward_boss {
            let guid = source
                .and_then(|id| ctx.creatures.get(id))
                .and_then(Creature::profile)
                .map(|profile| profile.guid);
            if let Some(guid) = guid {
                ctx.rewards
                    .record_damage_done(self.id, guid, -applied as i64);
            }
        }
        if health == 0 {
            ctx.outbox.defer(DeferredTask::ResolveDeath(self.id));
        }
        applied
    }

    /// Death bookkeeping: rewards, summon cleanup and list reset.
    pub fn death(&mut self, ctx: &mut AiContext<'_>) {
        if self.species.reward_boss && ctx.rewards.is_tracked(self.id) {
            self.distribute_rewards(ctx);
            ctx.rewards.reset(self.id);
        }

        self.set_attacked(ctx, None);
        let summons = ctx
            .creatures
            .get_mut(self.id)
            .map(|body| std::mem::take(&mut body.summons))
            .unwrap_or_default();
        for summon in summons {
            ctx.kill(summon);
            if let Some(body) = ctx.creatures.get_mut(summon) {
                body.master = None;
            }
        }

        self.switch_idle(ctx, true);
        debug!(target: "game_core::lifecycle", monster = %self.id, "monster died");
    }

    fn distribute_rewards(&mut self, ctx: &mut AiContext<'_>) {
        let Some(table) = ctx.rewards.table(self.id) else {
            return;
        };
        let shares = reward::distribute(
            table,
            &self.species.loot,
            RewardRates::from(ctx.config),
            ctx.rng,
        );

        for share in shares {
            let online = ctx.creatures.player_by_guid(share.guid).map(|player| player.id);
            if !share.qualified {
                if let Some(player) = online {
                    ctx.emit(WorldEvent::TextMessage {
                        recipient: player,
                        text: NO_LOOT_MESSAGE.to_owned(),
                    });
                }
                continue;
            }
            if share.items.is_empty() {
                continue;
            }

            let mut container = RewardContainer::new(self.id, &self.species.name, ctx.now);
            container.items = share.items;
            let delivery = match online {
                Some(player) => RewardDelivery::Online { player, container },
                None => RewardDelivery::Persist {
                    player_guid: share.guid,
                    container,
                },
            };
            self.deliver(ctx, delivery);
        }
    }

    fn deliver(&self, ctx: &mut AiContext<'_>, delivery: RewardDelivery) {
        match delivery {
            RewardDelivery::Online { player, container } => {
                let text = format!(
                    "The following items dropped by {} are available in your reward chest: {}.",
                    container.boss_name,
                    container.description()
                );
                let Some(profile) = ctx.creatures.get_mut(player).and_then(Creature::profile_mut)
                else {
                    return;
                };
                profile.reward_chest.push(container);
                ctx.emit(WorldEvent::TextMessage {
                    recipient: player,
                    text,
                });
            }
            RewardDelivery::Persist {
                player_guid,
                container,
            } => {
                debug!(
                    target: "game_core::lifecycle",
                    boss = %self.id,
                    player_guid,
                    "reward queued for offline player"
                );
                ctx.outbox.pending_rewards.push(PendingReward {
                    player_guid,
                    container,
                });
            }
        }
    }
}

/// Owner of a corpse: the top damage dealer when it is a player, otherwise
/// that creature's player master.
pub fn corpse_owner(creatures: &CreatureRegistry, body: &Creature) -> Option<EntityId> {
    let attacker = creatures.get(body.most_damage_attacker()?)?;
    if attacker.is_player() {
        return Some(attacker.id);
    }
    attacker
        .master
        .and_then(|master| creatures.get(master))
        .filter(|master| master.is_player())
        .map(|master| master.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::species::{LootBlock, Species};
    use crate::testing::TestWorld;

    #[test]
    fn idle_follows_target_list_and_conditions() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        let alice = world.player("Alice", Position::new(12, 10, 7));

        world.run(orc, |monster, ctx| monster.update_idle_status(ctx));
        assert!(world.brain(orc).is_idle());
        assert!(!world.state.is_active(orc));

        world.run(orc, |monster, ctx| monster.on_creature_found(ctx, alice, false));
        assert!(!world.brain(orc).is_idle());
        assert!(world.state.is_active(orc));

        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.conditions |= Conditions::POISON;
        }
        world.run(orc, |monster, ctx| {
            monster.remove_target(alice);
            monster.update_idle_status(ctx);
        });
        assert!(!world.brain(orc).is_idle());
    }

    #[test]
    fn going_idle_clears_lists() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        let alice = world.player("Alice", Position::new(12, 10, 7));

        world.run(orc, |monster, ctx| {
            monster.on_creature_found(ctx, alice, false);
            monster.set_idle(ctx, true);
        });

        assert!(world.brain(orc).targets.is_empty());
        assert!(world.brain(orc).friends.is_empty());
    }

    #[test]
    fn spawn_range_checks_square_then_floor() {
        let mut world = TestWorld::new();
        world.config.despawn_radius = 5;
        world.config.despawn_range = 1;
        let orc = world.monster("orc", Position::new(10, 10, 7));

        world.run(orc, |monster, ctx| {
            assert!(monster.is_in_spawn_range(ctx, Position::new(15, 5, 7)));
            assert!(!monster.is_in_spawn_range(ctx, Position::new(16, 10, 7)));
            assert!(monster.is_in_spawn_range(ctx, Position::new(10, 10, 6)));
            assert!(!monster.is_in_spawn_range(ctx, Position::new(10, 10, 5)));
        });
    }

    #[test]
    fn despawn_teleports_home_when_removal_is_off() {
        let mut world = TestWorld::new();
        world.config.despawn_radius = 3;
        world.config.remove_on_despawn = false;
        let orc = world.monster("orc", Position::new(10, 10, 7));
        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.position = Position::new(20, 10, 7);
        }

        let despawned = world.run(orc, |monster, ctx| monster.check_despawn(ctx));

        assert!(despawned);
        assert_eq!(
            world.state.creatures.get(orc).map(|body| body.position),
            Some(Position::new(10, 10, 7))
        );
        assert!(world.brain(orc).is_idle());
    }

    #[test]
    fn despawn_removes_when_configured() {
        let mut world = TestWorld::new();
        world.config.despawn_radius = 3;
        let orc = world.monster("orc", Position::new(10, 10, 7));
        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.position = Position::new(20, 10, 7);
        }

        world.run(orc, |monster, ctx| monster.check_despawn(ctx));

        assert!(!world.state.creatures.contains(orc));
    }

    #[test]
    fn element_modifiers_scale_damage() {
        let mut world = TestWorld::new();
        let mut species = Species::new("ice golem");
        species.element_mods.insert(CombatType::Ice, 50);
        species.element_mods.insert(CombatType::Fire, -25);
        world.add_species(species);
        let golem = world.monster("ice golem", Position::new(10, 10, 7));

        world.run(golem, |monster, ctx| {
            assert_eq!(monster.change_health(ctx, None, CombatType::Ice, -15), -8);
            assert_eq!(monster.change_health(ctx, None, CombatType::Fire, -20), -25);
        });
        assert!(!world.brain(golem).is_idle());
    }

    #[test]
    fn lethal_damage_defers_death() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));

        world.run(orc, |monster, ctx| {
            monster.change_health(ctx, None, CombatType::Physical, -1000);
        });

        assert!(
            world
                .state
                .outbox
                .tasks
                .contains(&DeferredTask::ResolveDeath(orc))
        );
    }

    #[test]
    fn death_kills_summons_and_delivers_rewards() {
        let mut world = TestWorld::new();
        world.add_species(Species {
            reward_boss: true,
            loot: vec![LootBlock {
                item_type: 2160,
                chance: GameConfig::MAX_LOOT_CHANCE,
                count_max: 1,
                unique: false,
            }],
            ..Species::new("warlord")
        });
        let boss = world.monster("warlord", Position::new(10, 10, 7));
        let minion = world.monster("orc", Position::new(11, 10, 7));
        world.bind_summon(boss, minion);
        let alice = world.player("Alice", Position::new(12, 10, 7));
        world.state.rewards.track(boss);
        world.state.rewards.record_damage_done(boss, 1, 90);
        world.state.rewards.record_damage_done(boss, 42, 80);

        world.run(boss, |monster, ctx| monster.death(ctx));

        assert!(world.state.creatures.get(minion).is_some_and(|body| body.is_dead()));
        let chest = world
            .state
            .creatures
            .get(alice)
            .and_then(Creature::profile)
            .map(|profile| profile.reward_chest.len());
        assert_eq!(chest, Some(1));
        assert_eq!(world.state.outbox.pending_rewards.len(), 1);
        assert_eq!(world.state.outbox.pending_rewards[0].player_guid, 42);
        assert!(
            world
                .state
                .rewards
                .table(boss)
                .is_some_and(|table| table.scores.is_empty())
        );
    }

    #[test]
    fn corpse_goes_to_player_master_of_top_attacker() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        let pet = world.monster("orc", Position::new(11, 10, 7));
        let alice = world.player("Alice", Position::new(12, 10, 7));
        world.bind_summon(alice, pet);
        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.damage_map.insert(pet, 50);
            body.damage_map.insert(alice, 20);
        }

        let body = world.state.creatures.get(orc).cloned().expect("orc");
        assert_eq!(corpse_owner(&world.state.creatures, &body), Some(alice));
    }

    #[test]
    fn dying_leaves_the_active_set_through_the_idle_transition() {
        let mut world = TestWorld::new();
        let orc = world.monster("orc", Position::new(10, 10, 7));
        let alice = world.player("Alice", Position::new(12, 10, 7));
        world.run(orc, |monster, ctx| monster.on_creature_found(ctx, alice, false));
        assert!(world.state.is_active(orc));
        world.state.outbox.events.clear();

        if let Some(body) = world.state.creatures.get_mut(orc) {
            body.health = 0;
        }
        world.run(orc, |monster, ctx| monster.death(ctx));

        let brain = world.brain(orc);
        assert!(brain.is_idle());
        assert!(brain.targets.is_empty());
        assert!(!world.state.is_active(orc));
        assert!(world.state.outbox.events.iter().any(|event| matches!(
            event,
            WorldEvent::IdleChanged { creature, idle: true } if *creature == orc
        )));
    }
}
