//! A* path search over a [`GridMap`].
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use game_core::{Direction, FindPathParams, MapOracle, PathOracle, Position, StaticTile};

use super::GridMap;

/// Upper bound on expanded nodes per query.
const MAX_NODES: usize = 512;

/// Path oracle backed by a static grid.
///
/// Every step costs the same. The search never enters tiles that block
/// pathing or change floors, and skips whatever `walkable` rejects.
pub struct AStarPaths {
    map: Arc<GridMap>,
}

impl AStarPaths {
    pub fn new(map: Arc<GridMap>) -> Self {
        Self { map }
    }

    fn passable(&self, position: Position) -> bool {
        self.map
            .tile(position)
            .is_some_and(|tile: StaticTile| !tile.blocks_path() && !tile.changes_floor())
    }
}

struct Goal<'a> {
    map: &'a GridMap,
    target: Position,
    min: i32,
    max: i32,
    params: &'a FindPathParams,
}

impl Goal<'_> {
    fn accepts(&self, position: Position) -> bool {
        let distance = position.chebyshev(self.target);
        let in_band = if self.params.keep_distance {
            distance == self.max
        } else {
            (self.min..=self.max).contains(&distance)
        };
        in_band
            && (!self.params.clear_sight || self.map.is_sight_clear(position, self.target, true))
    }

    /// Tiles exactly at the far edge of the band are the best match.
    fn is_best(&self, position: Position) -> bool {
        self.max == i32::MAX || position.chebyshev(self.target) == self.max
    }

    fn estimate(&self, position: Position) -> i32 {
        (position.chebyshev(self.target) - self.max).max(0)
    }
}

fn unwind(parents: &HashMap<Position, (Position, Direction)>, mut at: Position) -> Vec<Direction> {
    let mut path = Vec::new();
    while let Some(&(parent, step)) = parents.get(&at) {
        path.push(step);
        at = parent;
    }
    path.reverse();
    path
}

impl PathOracle for AStarPaths {
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
        let goal = Goal {
            map: &self.map,
            target: to,
            min: params.min_target_dist.max(0),
            max: if params.max_target_dist < 0 {
                i32::MAX
            } else {
                params.max_target_dist
            },
            params,
        };
        if goal.accepts(from) && goal.is_best(from) {
            return Some(Vec::new());
        }

        let directions: &[Direction] = if params.allow_diagonal {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };

        let mut parents: HashMap<Position, (Position, Direction)> = HashMap::new();
        let mut costs: HashMap<Position, i32> = HashMap::from([(from, 0)]);
        let mut open = BinaryHeap::new();
        let mut sequence = 0u32;
        open.push(Reverse((goal.estimate(from), sequence, from)));
        let mut fallback = goal.accepts(from).then_some(from);
        let mut expanded = 0usize;

        while let Some(Reverse((_, _, current))) = open.pop() {
            expanded += 1;
            if expanded > MAX_NODES {
                break;
            }
            let cost = costs.get(&current).copied().unwrap_or(0);

            for &direction in directions {
                let next = current.step(direction);
                if next == from {
                    continue;
                }
                if params.max_search_dist > 0
                    && (next.distance_x(from) > params.max_search_dist
                        || next.distance_y(from) > params.max_search_dist)
                {
                    continue;
                }
                if next == to && goal.min > 0 {
                    continue;
                }
                if !self.passable(next) || !walkable(next) {
                    continue;
                }

                let next_cost = cost + 1;
                if costs.get(&next).is_some_and(|&known| known <= next_cost) {
                    continue;
                }
                costs.insert(next, next_cost);
                parents.insert(next, (current, direction));

                if goal.accepts(next) {
                    if !params.full_path_search || goal.is_best(next) {
                        return Some(unwind(&parents, next));
                    }
                    if fallback.is_none() {
                        fallback = Some(next);
                    }
                }

                sequence += 1;
                open.push(Reverse((next_cost + goal.estimate(next), sequence, next)));
            }
        }

        fallback.map(|at| unwind(&parents, at))
    }
}
