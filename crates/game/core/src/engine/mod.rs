//! Engine façade over [`GameState`].
//!
//! The [`GameEngine`] is the only writer of world state. Each operation lifts
//! the affected monster brain out of the world, runs it against an
//! [`AiContext`] and puts it back, so AI code never observes a brain that is
//! mid-update. Side effects collected in the outbox are settled by
//! [`GameEngine::run_deferred`].

mod errors;

pub use errors::EngineError;

use tracing::{debug, trace};

use crate::env::GameEnv;
use crate::monster::{
    AiContext, Monster, assign_attacked, corpse_owner, find_placement, monster_creature, sees,
};
use crate::species::CombatType;
use crate::state::{
    Creature, DeferredTask, Direction, EntityId, GameState, Notification, Position, SpawnError,
    SpeakKind, WorldEvent,
};

/// Upper bound of settle passes per [`GameEngine::run_deferred`] call.
const MAX_PASSES: usize = 10;

pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// One world tick: every active monster thinks, attacks and walks, then
    /// deferred work settles.
    pub fn tick(&mut self, env: &GameEnv<'_>, interval: u64) -> Result<(), EngineError> {
        self.state.advance(interval);

        for id in self.state.active_monsters() {
            if !self.is_thinking(id) {
                continue;
            }
            self.think(env, id, interval)?;
            if self.is_thinking(id) {
                self.attack(env, id, interval)?;
            }
            if self.is_thinking(id) {
                self.walk(env, id)?;
            }
        }

        self.run_deferred(env)?;
        Ok(())
    }

    pub fn think(&mut self, env: &GameEnv<'_>, id: EntityId, interval: u64) -> Result<(), EngineError> {
        self.with_monster(env, id, |monster, ctx| monster.on_think(ctx, interval))
    }

    /// Attack phase; an `interval` of 0 is the immediate check after a target
    /// was selected.
    pub fn attack(&mut self, env: &GameEnv<'_>, id: EntityId, interval: u64) -> Result<(), EngineError> {
        self.with_monster(env, id, |monster, ctx| monster.do_attacking(ctx, interval))
    }

    pub fn next_step(&mut self, env: &GameEnv<'_>, id: EntityId) -> Result<Option<Direction>, EngineError> {
        self.with_monster(env, id, |monster, ctx| monster.next_step(ctx))
    }

    /// Steps the monster when its step is due. Returns whether it moved.
    pub fn walk(&mut self, env: &GameEnv<'_>, id: EntityId) -> Result<bool, EngineError> {
        self.with_monster(env, id, |monster, ctx| monster.walk(ctx))
    }

    pub fn challenge(
        &mut self,
        env: &GameEnv<'_>,
        id: EntityId,
        challenger: EntityId,
        force: bool,
    ) -> Result<bool, EngineError> {
        self.with_monster(env, id, |monster, ctx| monster.challenge(ctx, challenger, force))
    }

    /// Applies a health change to any creature. Monsters run their own intake
    /// rules; players are updated directly and feed reward boss scores.
    pub fn change_health(
        &mut self,
        env: &GameEnv<'_>,
        target: EntityId,
        source: Option<EntityId>,
        combat: CombatType,
        amount: i32,
    ) -> Result<i32, EngineError> {
        let body = self
            .state
            .creatures
            .get(target)
            .ok_or(EngineError::UnknownCreature(target))?;
        let target_is_monster = self.state.monsters.contains_key(&target);
        let target_guid = body.profile().map(|profile| profile.guid);

        let applied = if target_is_monster {
            self.with_monster(env, target, |monster, ctx| {
                monster.change_health(ctx, source, combat, amount)
            })?
        } else {
            self.change_player_health(target, amount)
        };

        let source_guid = source
            .and_then(|id| self.state.creatures.get(id))
            .and_then(|body| body.profile().map(|profile| profile.guid));
        if applied > 0 {
            if let Some(guid) = source_guid {
                self.state.rewards.record_healing(guid, i64::from(applied));
            }
        } else if applied < 0 {
            let boss = source.filter(|id| self.state.rewards.is_tracked(*id));
            if let (Some(boss), Some(guid)) = (boss, target_guid) {
                self.state
                    .rewards
                    .record_damage_taken(boss, guid, i64::from(-applied));
            }
        }
        Ok(applied)
    }

    fn change_player_health(&mut self, target: EntityId, amount: i32) -> i32 {
        let Some(body) = self.state.creatures.get_mut(target) else {
            return 0;
        };
        if body.is_dead() {
            return 0;
        }
        let before = body.health;
        body.health = (body.health + amount).clamp(0, body.health_max);
        let applied = body.health - before;
        let event = WorldEvent::HealthChanged {
            creature: target,
            health: body.health,
            health_max: body.health_max,
        };
        let died = body.is_dead();
        self.state.outbox.emit(event);
        if died {
            self.state.outbox.defer(DeferredTask::ResolveDeath(target));
        }
        applied
    }

    /// Adds a monster of `species` at (or next to) `position`. Spawned
    /// monsters remember `position` as their spawn anchor.
    pub fn spawn_monster(
        &mut self,
        env: &GameEnv<'_>,
        species: &str,
        position: Position,
        from_spawn: bool,
    ) -> Result<EntityId, EngineError> {
        let species = env
            .species()?
            .species(species)
            .ok_or_else(|| SpawnError::UnknownSpecies(species.to_owned()))?;
        let map = env.map()?;
        let state = &mut *self.state;
        let placed = find_placement(
            map,
            &state.creatures,
            &state.ground,
            &mut state.rng,
            position,
            false,
        )?;

        let id = state.creatures.allocate_monster_id();
        state
            .creatures
            .insert(monster_creature(id, &species, placed));
        if species.reward_boss {
            state.rewards.track(id);
        }
        let anchor = from_spawn.then_some(position);
        debug!(target: "game_core::lifecycle", monster = %id, species = %species.name, position = %placed, "monster spawned");
        state.monsters.insert(id, Monster::new(id, species, anchor));
        self.announce(id, placed);
        Ok(id)
    }

    pub fn spawn_player(
        &mut self,
        name: &str,
        guid: u32,
        position: Position,
        health: i32,
    ) -> EntityId {
        let id = self.state.creatures.allocate_player_id();
        self.state
            .creatures
            .insert(Creature::player(id, name, guid, position, health));
        self.announce(id, position);
        id
    }

    fn announce(&mut self, id: EntityId, position: Position) {
        let outbox = &mut self.state.outbox;
        outbox.emit(WorldEvent::CreatureAppeared {
            creature: id,
            position,
        });
        outbox.notify(Notification::Appeared { creature: id });
    }

    /// Moves a non-monster creature one step or teleports it.
    pub fn move_player(&mut self, id: EntityId, to: Position) -> Result<(), EngineError> {
        let now = self.state.clock;
        let body = self
            .state
            .creatures
            .get_mut(id)
            .ok_or(EngineError::UnknownCreature(id))?;
        if !body.is_player() {
            return Err(EngineError::NotAPlayer(id));
        }
        let from = body.position;
        body.position = to;
        body.last_move_at = now;
        let event = if from.chebyshev(to) <= 1 && from.z == to.z {
            body.direction = Direction::towards(from, to);
            WorldEvent::CreatureMoved {
                creature: id,
                from,
                to,
            }
        } else {
            WorldEvent::CreatureTeleported {
                creature: id,
                from,
                to,
            }
        };
        self.state.outbox.emit(event);
        self.state
            .outbox
            .notify(Notification::Moved { creature: id, from, to });
        Ok(())
    }

    /// Sets what a player attacks; the player's summons follow suit.
    pub fn set_player_target(
        &mut self,
        id: EntityId,
        target: Option<EntityId>,
    ) -> Result<bool, EngineError> {
        if !self.state.creatures.contains(id) {
            return Err(EngineError::UnknownCreature(id));
        }
        Ok(assign_attacked(&mut self.state.creatures, id, target))
    }

    pub fn say(&mut self, id: EntityId, kind: SpeakKind, text: &str) -> Result<(), EngineError> {
        if !self.state.creatures.contains(id) {
            return Err(EngineError::UnknownCreature(id));
        }
        self.state.outbox.emit(WorldEvent::CreatureSay {
            speaker: id,
            kind,
            text: text.to_owned(),
        });
        self.state.outbox.notify(Notification::Spoke {
            creature: id,
            kind,
            text: text.to_owned(),
        });
        Ok(())
    }

    /// Detaches a creature (and its summons) from the world.
    pub fn remove_creature(&mut self, env: &GameEnv<'_>, id: EntityId) -> Result<(), EngineError> {
        if !self.state.creatures.contains(id) {
            return Err(EngineError::UnknownCreature(id));
        }
        self.with_context(env, |ctx| ctx.remove_creature(id))
    }

    /// Tells every monster that can see `id` that it appeared.
    pub fn creature_appear(&mut self, env: &GameEnv<'_>, id: EntityId) -> Result<(), EngineError> {
        let Some(position) = self.state.creatures.get(id).map(|body| body.position) else {
            return Ok(());
        };
        for observer in self.observers(|at| sees(at, position), Some(id)) {
            self.with_monster(env, observer, |monster, ctx| monster.on_creature_appear(ctx, id))?;
        }
        Ok(())
    }

    pub fn creature_remove(&mut self, env: &GameEnv<'_>, body: &Creature) -> Result<(), EngineError> {
        let position = body.position;
        for observer in self.observers(|at| sees(at, position), None) {
            self.with_monster(env, observer, |monster, ctx| monster.on_creature_remove(ctx, body))?;
        }
        Ok(())
    }

    pub fn creature_move(
        &mut self,
        env: &GameEnv<'_>,
        id: EntityId,
        from: Position,
        to: Position,
    ) -> Result<(), EngineError> {
        for observer in self.observers(|at| sees(at, from) || sees(at, to), Some(id)) {
            self.with_monster(env, observer, |monster, ctx| {
                monster.on_creature_move(ctx, id, from, to)
            })?;
        }
        Ok(())
    }

    pub fn creature_say(
        &mut self,
        env: &GameEnv<'_>,
        id: EntityId,
        kind: SpeakKind,
        text: &str,
    ) -> Result<(), EngineError> {
        let Some(position) = self.state.creatures.get(id).map(|body| body.position) else {
            return Ok(());
        };
        for observer in self.observers(|at| sees(at, position), None) {
            if observer == id {
                continue;
            }
            self.with_monster(env, observer, |monster, ctx| {
                monster.on_creature_say(ctx, id, kind, text)
            })?;
        }
        Ok(())
    }

    /// Settles deferred tasks and creature notifications until both queues
    /// are empty or the pass limit is hit. Returns the number of items handled.
    pub fn run_deferred(&mut self, env: &GameEnv<'_>) -> Result<usize, EngineError> {
        let mut handled = 0;
        for _ in 0..MAX_PASSES {
            let tasks: Vec<DeferredTask> = self.state.outbox.tasks.drain(..).collect();
            let notifications: Vec<Notification> =
                self.state.outbox.notifications.drain(..).collect();
            if tasks.is_empty() && notifications.is_empty() {
                return Ok(handled);
            }
            handled += tasks.len() + notifications.len();

            for task in tasks {
                match task {
                    DeferredTask::CheckAttack(id) if self.is_thinking(id) => {
                        self.attack(env, id, 0)?;
                    }
                    DeferredTask::CheckAttack(_) => {}
                    DeferredTask::ResolveDeath(id) => self.resolve_death(env, id)?,
                }
            }
            for notification in notifications {
                self.dispatch(env, notification)?;
            }
        }

        let left = self.state.outbox.tasks.len() + self.state.outbox.notifications.len();
        if left > 0 {
            debug!(target: "game_core::ai", left, "deferred work carried over to the next tick");
        }
        Ok(handled)
    }

    fn dispatch(&mut self, env: &GameEnv<'_>, notification: Notification) -> Result<(), EngineError> {
        trace!(target: "game_core::ai", ?notification, "dispatch");
        match notification {
            Notification::Appeared { creature } => self.creature_appear(env, creature),
            Notification::Moved { creature, from, to } => self.creature_move(env, creature, from, to),
            Notification::Removed { creature } => self.creature_remove(env, &creature),
            Notification::Spoke {
                creature,
                kind,
                text,
            } => self.creature_say(env, creature, kind, &text),
        }
    }

    fn resolve_death(&mut self, env: &GameEnv<'_>, id: EntityId) -> Result<(), EngineError> {
        let Some(body) = self.state.creatures.get(id) else {
            return Ok(());
        };
        if !body.is_dead() {
            return Ok(());
        }
        let position = body.position;

        if !self.state.monsters.contains_key(&id) {
            self.state.outbox.emit(WorldEvent::CreatureDied {
                creature: id,
                position,
            });
            let hunters: Vec<EntityId> = self.state.monsters.keys().copied().collect();
            for hunter in hunters {
                if self.state.creatures.contains(hunter) {
                    self.with_monster(env, hunter, |monster, ctx| monster.forget(ctx, id))?;
                }
            }
            return Ok(());
        }

        let reward_boss = self
            .state
            .monsters
            .get(&id)
            .is_some_and(|brain| brain.species.reward_boss);
        self.with_monster(env, id, |monster, ctx| monster.death(ctx))?;

        let Some(body) = self.state.creatures.get(id) else {
            return Ok(());
        };
        let owner = corpse_owner(&self.state.creatures, body);
        let drops_loot = body.drop_loot && !reward_boss;
        debug!(target: "game_core::lifecycle", monster = %id, ?owner, "monster died");
        let outbox = &mut self.state.outbox;
        outbox.emit(WorldEvent::CreatureDied {
            creature: id,
            position,
        });
        outbox.emit(WorldEvent::CorpseCreated {
            creature: id,
            position,
            owner,
            reward_container: reward_boss,
            drops_loot,
        });
        self.with_context(env, |ctx| ctx.remove_creature(id))
    }

    fn is_thinking(&self, id: EntityId) -> bool {
        self.state.monsters.contains_key(&id)
            && self
                .state
                .creatures
                .get(id)
                .is_some_and(|body| !body.is_dead() && !body.removed)
    }

    /// Living monsters whose position satisfies `sees`, plus `including` when
    /// it is a monster itself.
    fn observers(
        &self,
        sees: impl Fn(Position) -> bool,
        including: Option<EntityId>,
    ) -> Vec<EntityId> {
        self.state
            .monsters
            .keys()
            .copied()
            .filter(|id| {
                self.state.creatures.get(*id).is_some_and(|body| {
                    !body.is_dead() && (Some(*id) == including || sees(body.position))
                })
            })
            .collect()
    }

    fn with_context<R>(
        &mut self,
        env: &GameEnv<'_>,
        f: impl FnOnce(&mut AiContext<'_>) -> R,
    ) -> Result<R, EngineError> {
        let map = env.map()?;
        let paths = env.paths()?;
        let species = env.species()?;
        let scripts = env.scripts()?;
        let config = env.config()?.game_config();

        let state = &mut *self.state;
        let mut ctx = AiContext {
            now: state.clock,
            creatures: &mut state.creatures,
            monsters: &mut state.monsters,
            ground: &mut state.ground,
            active: &mut state.active,
            outbox: &mut state.outbox,
            rewards: &mut state.rewards,
            rng: &mut state.rng,
            map,
            paths,
            species,
            scripts,
            config,
        };
        Ok(f(&mut ctx))
    }

    /// Runs `f` on the brain of `id`. The brain is put back only if the body
    /// is still in the world afterwards.
    fn with_monster<R>(
        &mut self,
        env: &GameEnv<'_>,
        id: EntityId,
        f: impl FnOnce(&mut Monster, &mut AiContext<'_>) -> R,
    ) -> Result<R, EngineError> {
        if !self.state.creatures.contains(id) {
            return Err(EngineError::UnknownCreature(id));
        }
        let mut brain = self
            .state
            .monsters
            .remove(&id)
            .ok_or(EngineError::NotAMonster(id))?;

        let result = self.with_context(env, |ctx| f(&mut brain, ctx));
        if self.state.creatures.contains(id) {
            self.state.monsters.insert(id, brain);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{LootBlock, Species};
    use crate::testing::TestWorld;

    #[test]
    fn spawned_monsters_notice_players_and_chase_them() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();
        let alice = engine.spawn_player("Alice", 1, Position::new(13, 10, 7), 150);
        let orc = engine
            .spawn_monster(&env, "orc", Position::new(10, 10, 7), true)
            .expect("spawn");
        engine.run_deferred(&env).expect("settle");

        assert!(engine.state().is_active(orc));
        for _ in 0..4 {
            engine.tick(&env, 1000).expect("tick");
        }

        let body = engine.state().creatures.get(orc).expect("orc");
        assert_eq!(body.follow, Some(alice));
        assert!(body.position.chebyshev(Position::new(13, 10, 7)) < 3);
    }

    #[test]
    fn unknown_species_is_a_spawn_error() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();

        let error = engine
            .spawn_monster(&env, "dragon lord", Position::new(10, 10, 7), true)
            .expect_err("unknown species");
        assert!(matches!(error, EngineError::Spawn(_)));
    }

    #[test]
    fn players_are_not_driven_as_monsters() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();
        let alice = engine.spawn_player("Alice", 1, Position::new(13, 10, 7), 150);

        assert_eq!(engine.think(&env, alice, 1000), Err(EngineError::NotAMonster(alice)));
    }

    #[test]
    fn lethal_damage_leaves_a_corpse_for_the_killer() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();
        let alice = engine.spawn_player("Alice", 1, Position::new(11, 10, 7), 150);
        let orc = engine
            .spawn_monster(&env, "orc", Position::new(10, 10, 7), true)
            .expect("spawn");
        engine.run_deferred(&env).expect("settle");

        engine
            .change_health(&env, orc, Some(alice), CombatType::Physical, -1000)
            .expect("damage");
        engine.run_deferred(&env).expect("settle");

        let state = engine.state();
        assert!(!state.creatures.contains(orc));
        assert!(!state.monsters.contains_key(&orc));
        assert!(state.outbox.events.iter().any(|event| matches!(
            event,
            WorldEvent::CorpseCreated { creature, owner: Some(owner), drops_loot: true, .. }
                if *creature == orc && *owner == alice
        )));
    }

    #[test]
    fn monsters_let_go_of_a_dead_player() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();
        let orc = engine
            .spawn_monster(&env, "orc", Position::new(10, 10, 7), true)
            .expect("spawn");
        let alice = engine.spawn_player("Alice", 1, Position::new(11, 10, 7), 150);
        engine.run_deferred(&env).expect("settle");
        for _ in 0..3 {
            engine.tick(&env, 1000).expect("tick");
        }
        assert_eq!(engine.state().creatures.get(orc).and_then(|body| body.attacked), Some(alice));

        engine
            .change_health(&env, alice, None, CombatType::Physical, -1000)
            .expect("damage");
        engine.run_deferred(&env).expect("settle");
        for _ in 0..10 {
            engine.tick(&env, 1000).expect("tick");
        }

        let state = engine.state();
        let body = state.creatures.get(orc).expect("orc");
        assert!(state.creatures.get(alice).is_some_and(Creature::is_dead));
        assert_eq!(body.attacked, None);
        assert_eq!(body.follow, None);
        assert!(state.monsters[&orc].is_idle());
        assert!(!state.is_active(orc));
    }

    #[test]
    fn reward_boss_scores_every_kind_of_contribution() {
        let mut world = TestWorld::new();
        world.add_species(Species {
            reward_boss: true,
            loot: vec![LootBlock {
                item_type: 2160,
                chance: 100_000,
                ..LootBlock::default()
            }],
            ..Species::new("warlord")
        });
        let (mut engine, env) = world.engine();
        let alice = engine.spawn_player("Alice", 7, Position::new(11, 10, 7), 150);
        let boss = engine
            .spawn_monster(&env, "warlord", Position::new(10, 10, 7), true)
            .expect("spawn");

        engine
            .change_health(&env, boss, Some(alice), CombatType::Physical, -30)
            .expect("hit boss");
        engine
            .change_health(&env, alice, Some(boss), CombatType::Physical, -20)
            .expect("hit alice");
        engine
            .change_health(&env, alice, Some(alice), CombatType::Healing, 5)
            .expect("heal");

        let score = engine.state().rewards.table(boss).expect("tracked").scores[&7];
        assert_eq!(score.damage_done, 30);
        assert_eq!(score.damage_taken, 20);
        assert_eq!(score.healing_done, 5);
    }

    #[test]
    fn removal_notifies_observers() {
        let mut world = TestWorld::new();
        let (mut engine, env) = world.engine();
        let alice = engine.spawn_player("Alice", 1, Position::new(12, 10, 7), 150);
        let orc = engine
            .spawn_monster(&env, "orc", Position::new(10, 10, 7), true)
            .expect("spawn");
        engine.run_deferred(&env).expect("settle");
        assert!(engine.state().monster(orc).is_some_and(|m| m.targets.contains(&alice)));

        engine.remove_creature(&env, alice).expect("remove");
        engine.run_deferred(&env).expect("settle");

        let brain = engine.state().monster(orc).expect("orc");
        assert!(brain.targets.is_empty());
        assert!(brain.is_idle());
    }
}
