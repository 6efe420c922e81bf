//! Builders shared by the unit tests of this crate.
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::env::{
    ConfigOracle, Env, FindPathParams, GameEnv, HookOutcome, MapDimensions, MapOracle,
    PathOracle, ScriptError, ScriptEvent, ScriptOracle, SpeciesOracle, StaticTile, TileFlags,
};
use crate::monster::{AiContext, Monster, monster_creature};
use crate::species::{Species, SpellBlock};
use crate::state::{Creature, CreatureRegistry, Direction, EntityId, GameState, Position};

/// Open floor with optional walls. Doubles as a breadth-first path oracle.
pub struct OpenMap {
    dimensions: MapDimensions,
    walls: BTreeSet<Position>,
}

impl OpenMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            walls: BTreeSet::new(),
        }
    }

    pub fn wall(&mut self, position: Position) {
        self.walls.insert(position);
    }
}

impl MapOracle for OpenMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        if !self.dimensions.contains(position) {
            return None;
        }
        if self.walls.contains(&position) {
            Some(StaticTile::wall())
        } else {
            Some(StaticTile::floor())
        }
    }

    fn is_sight_clear(&self, from: Position, to: Position, _same_floor: bool) -> bool {
        if from.z != to.z {
            return false;
        }
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = dx.abs().max(dy.abs());
        (1..steps).all(|i| {
            let x = from.x + (dx * i + dx.signum() * steps / 2) / steps;
            let y = from.y + (dy * i + dy.signum() * steps / 2) / steps;
            self.tile(Position::new(x, y, from.z))
                .is_some_and(|tile| !tile.flags.contains(TileFlags::BLOCK_SIGHT))
        })
    }
}

impl PathOracle for OpenMap {
    fn find_path(
        &self,
        from: Position,
        to: Position,
        params: &FindPathParams,
        walkable: &dyn Fn(Position) -> bool,
    ) -> Option<Vec<Direction>> {
        if from.z != to.z {
            return None;
        }
        let min = params.min_target_dist.max(0);
        let max = if params.max_target_dist < 0 {
            i32::MAX
        } else {
            params.max_target_dist
        };
        let is_goal = |position: Position| {
            let distance = position.chebyshev(to);
            let in_band = if params.keep_distance {
                distance == max
            } else {
                (min..=max).contains(&distance)
            };
            in_band && (!params.clear_sight || self.is_sight_clear(position, to, true))
        };
        if is_goal(from) {
            return Some(Vec::new());
        }

        let directions: &[Direction] = if params.allow_diagonal {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };
        let mut parents: BTreeMap<Position, (Position, Direction)> = BTreeMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for &direction in directions {
                let next = current.step(direction);
                if next == from || parents.contains_key(&next) {
                    continue;
                }
                if params.max_search_dist > 0 && next.chebyshev(from) > params.max_search_dist {
                    continue;
                }
                if next == to && min > 0 {
                    continue;
                }
                if !self.tile(next).is_some_and(StaticTile::is_walkable) || !walkable(next) {
                    continue;
                }
                parents.insert(next, (current, direction));
                if is_goal(next) {
                    let mut path = Vec::new();
                    let mut at = next;
                    while let Some(&(parent, step)) = parents.get(&at) {
                        path.push(step);
                        at = parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}

/// Species lookup with an "orc" melee brawler preloaded.
pub struct Catalog {
    species: BTreeMap<String, Arc<Species>>,
}

impl Catalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            species: BTreeMap::new(),
        };
        catalog.add(Species {
            attack_spells: vec![SpellBlock::melee(2000, 0, -20)],
            ..Species::new("orc")
        });
        catalog
    }

    pub fn add(&mut self, species: Species) {
        self.species.insert(species.key(), Arc::new(species));
    }
}

impl SpeciesOracle for Catalog {
    fn species(&self, name: &str) -> Option<Arc<Species>> {
        self.species.get(&name.to_lowercase()).cloned()
    }
}

enum Binding {
    Outcome(HookOutcome),
    Overflow,
}

/// Script oracle with canned outcomes per handler name.
#[derive(Default)]
pub struct TestScripts {
    bindings: BTreeMap<String, Binding>,
    calls: Mutex<BTreeMap<String, usize>>,
}

impl TestScripts {
    pub fn bind(&mut self, handler: &str, outcome: HookOutcome) {
        self.bindings
            .insert(handler.to_owned(), Binding::Outcome(outcome));
    }

    /// Makes `handler` fail as if it re-entered itself too deep.
    pub fn overflow(&mut self, handler: &str) {
        self.bindings.insert(handler.to_owned(), Binding::Overflow);
    }

    pub fn calls(&self, handler: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(handler).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ScriptOracle for TestScripts {
    fn invoke(
        &self,
        handler: &str,
        _event: &ScriptEvent,
        _creatures: &CreatureRegistry,
    ) -> Result<HookOutcome, ScriptError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(handler.to_owned()).or_default() += 1;
        }
        match self.bindings.get(handler) {
            Some(Binding::Outcome(outcome)) => Ok(*outcome),
            Some(Binding::Overflow) => Err(ScriptError::CallStackOverflow(handler.to_owned())),
            None => Ok(HookOutcome::NoHook),
        }
    }
}

pub fn brain(id: EntityId, species: &str) -> Monster {
    Monster::new(id, Arc::new(Species::new(species)), None)
}

pub fn monster_body(id: EntityId, species: &str, position: Position) -> Creature {
    monster_creature(id, &Species::new(species), position)
}

pub fn player_body(id: EntityId, position: Position) -> Creature {
    Creature::player(id, format!("Player {}", id.0), id.0, position, 150)
}

/// A 64x64 open world with its oracles.
pub struct TestWorld {
    pub state: GameState,
    pub map: OpenMap,
    pub catalog: Catalog,
    pub scripts: TestScripts,
    pub config: GameConfig,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            state: GameState::new(7),
            map: OpenMap::new(64, 64),
            catalog: Catalog::new(),
            scripts: TestScripts::default(),
            config: GameConfig::default(),
        }
    }

    pub fn add_species(&mut self, species: Species) {
        self.catalog.add(species);
    }

    pub fn wall(&mut self, position: Position) {
        self.map.wall(position);
    }

    /// Places an idle monster whose spawn anchor is `position`.
    pub fn monster(&mut self, species: &str, position: Position) -> EntityId {
        let species = self
            .catalog
            .species(species)
            .unwrap_or_else(|| panic!("species {species} is not in the catalog"));
        let id = self.state.creatures.allocate_monster_id();
        self.state
            .creatures
            .insert(monster_creature(id, &species, position));
        self.state
            .monsters
            .insert(id, Monster::new(id, species, Some(position)));
        id
    }

    pub fn player(&mut self, name: &str, position: Position) -> EntityId {
        let id = self.state.creatures.allocate_player_id();
        self.state
            .creatures
            .insert(Creature::player(id, name, id.0, position, 150));
        id
    }

    /// Makes `summon` a summon of `master`.
    pub fn bind_summon(&mut self, master: EntityId, summon: EntityId) {
        if let Some(body) = self.state.creatures.get_mut(summon) {
            body.master = Some(master);
        }
        if let Some(body) = self.state.creatures.get_mut(master) {
            body.summons.push(summon);
        }
        if let Some(brain) = self.state.monsters.get_mut(&summon) {
            brain.spawn = None;
        }
    }

    pub fn brain(&self, id: EntityId) -> &Monster {
        self.state.monsters.get(&id).expect("monster brain")
    }

    /// Runs `f` on the brain of `id` the way the engine does.
    pub fn run<R>(&mut self, id: EntityId, f: impl FnOnce(&mut Monster, &mut AiContext<'_>) -> R) -> R {
        let mut brain = self.state.monsters.remove(&id).expect("monster brain");
        let state = &mut self.state;
        let mut ctx = AiContext {
            now: state.clock,
            creatures: &mut state.creatures,
            monsters: &mut state.monsters,
            ground: &mut state.ground,
            active: &mut state.active,
            outbox: &mut state.outbox,
            rewards: &mut state.rewards,
            rng: &mut state.rng,
            map: &self.map,
            paths: &self.map,
            species: &self.catalog,
            scripts: &self.scripts,
            config: &self.config,
        };
        let result = f(&mut brain, &mut ctx);
        if self.state.creatures.contains(id) {
            self.state.monsters.insert(id, brain);
        }
        result
    }

    pub fn engine(&mut self) -> (GameEngine<'_>, GameEnv<'_>) {
        let env = Env::with_all(
            &self.map as &dyn MapOracle,
            &self.map as &dyn PathOracle,
            &self.catalog as &dyn SpeciesOracle,
            &self.scripts as &dyn ScriptOracle,
            &self.config as &dyn ConfigOracle,
        );
        (GameEngine::new(&mut self.state), env)
    }
}
