//! Single-step approach and flee decisions for ranged and fleeing monsters.
use crate::state::{Direction, Position};

use super::{AiContext, Monster};

/// Outcome of [`Monster::distance_step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceStep {
    Step(Direction),
    /// Already at the preferred distance; stay and let dancing take over.
    InPosition,
    /// Every candidate direction is blocked.
    Exhausted,
    /// Target out of reach for a single step; fall back to path search.
    Failed,
}

use Direction::{
    East as E, North as N, NorthEast as NE, NorthWest as NW, South as S, SouthEast as SE,
    SouthWest as SW, West as W,
};

impl Monster {
    /// Picks one step that keeps (or, when fleeing, grows) the distance to
    /// `target`.
    pub fn distance_step(
        &mut self,
        ctx: &mut AiContext<'_>,
        target: Position,
        flee: bool,
    ) -> DistanceStep {
        let position = self.position(ctx);
        let dx = position.distance_x(target);
        let dy = position.distance_y(target);
        let distance = dx.max(dy);

        if !flee {
            if distance > self.species.target_distance || !ctx.is_sight_clear(position, target) {
                return DistanceStep::Failed;
            }
            if distance == self.species.target_distance {
                return DistanceStep::InPosition;
            }
        }

        if dx <= 1 && dy <= 1 {
            self.step_slowdown = (self.step_slowdown + 1).min(2);
        } else {
            self.step_slowdown = self.step_slowdown.saturating_sub(1);
        }

        let offset_x = position.offset_x(target);
        let offset_y = position.offset_y(target);
        if offset_x == 0 && offset_y == 0 {
            return match self.random_step(ctx, position) {
                Some(direction) => DistanceStep::Step(direction),
                None => DistanceStep::Failed,
            };
        }

        let steps = StepTable {
            monster: self,
            position,
            flee,
        };
        let chosen = if dx == dy {
            steps.diagonal(ctx, offset_x, offset_y)
        } else if dy > dx {
            if offset_y < 0 {
                // target south
                steps.axis(ctx, Axis::new(S, N, (W, E), (NW, NE), offset_x))
            } else {
                steps.axis(ctx, Axis::new(N, S, (W, E), (SW, SE), offset_x))
            }
        } else if offset_x < 0 {
            // target east
            steps.axis(ctx, Axis::new(E, W, (N, S), (NW, SW), offset_y))
        } else {
            let axis = Axis {
                positive_first: true,
                ..Axis::new(W, E, (N, S), (NE, SE), offset_y)
            };
            steps.axis(ctx, axis)
        };

        chosen.map_or(DistanceStep::Exhausted, DistanceStep::Step)
    }
}

struct StepTable<'m> {
    monster: &'m Monster,
    position: Position,
    flee: bool,
}

impl StepTable<'_> {
    fn open(&self, ctx: &AiContext<'_>, direction: Direction) -> bool {
        self.monster.can_walk_to(ctx, self.position, direction)
    }

    /// Both open picks one at random, otherwise the first open one.
    fn either(
        &self,
        ctx: &mut AiContext<'_>,
        (first, first_open): (Direction, bool),
        (second, second_open): (Direction, bool),
    ) -> Option<Direction> {
        match (first_open, second_open) {
            (true, true) => Some(if ctx.coin() { first } else { second }),
            (true, false) => Some(first),
            (false, true) => Some(second),
            (false, false) => None,
        }
    }

    /// Target sits on an exact diagonal.
    fn diagonal(&self, ctx: &mut AiContext<'_>, offset_x: i32, offset_y: i32) -> Option<Direction> {
        // (away pair, away diagonal, toward pair, tail sidesteps)
        let (away, away_diagonal, toward, tails) = match (offset_x >= 1, offset_y >= 1) {
            // target north-west
            (true, true) => ((S, E), SE, (N, W), [(W, SW), (N, NE)]),
            // target south-east
            (false, false) => ((W, N), NW, (S, E), [(S, SW), (E, NE)]),
            // target south-west
            (true, false) => ((N, E), NE, (S, W), [(W, NW), (S, SE)]),
            // target north-east
            (false, true) => ((W, S), SW, (N, E), [(E, SE), (N, NW)]),
        };

        let first = (away.0, self.open(ctx, away.0));
        let second = (away.1, self.open(ctx, away.1));
        if let Some(direction) = self.either(ctx, first, second) {
            return Some(direction);
        }
        if self.open(ctx, away_diagonal) {
            return Some(away_diagonal);
        }

        let toward_first = (toward.0, self.open(ctx, toward.0));
        let toward_second = (toward.1, self.open(ctx, toward.1));
        if self.flee {
            if let Some(direction) = self.either(ctx, toward_first, toward_second) {
                return Some(direction);
            }
        }

        let open_toward = |direction: Direction| {
            if direction == toward_first.0 {
                toward_first.1
            } else {
                toward_second.1
            }
        };
        tails
            .into_iter()
            .find(|&(side, diagonal)| open_toward(side) && self.open(ctx, diagonal))
            .map(|(side, _)| side)
    }

    /// Target lies mostly along one axis.
    fn axis(&self, ctx: &mut AiContext<'_>, axis: Axis) -> Option<Direction> {
        if self.open(ctx, axis.away) {
            return Some(axis.away);
        }

        let (negative, positive) = axis.sides;
        let negative_open = self.open(ctx, negative);
        let positive_open = self.open(ctx, positive);
        if negative_open && positive_open && axis.offset == 0 {
            return Some(if ctx.coin() { negative } else { positive });
        }
        if negative_open && axis.offset <= 0 {
            return Some(negative);
        }
        if positive_open && axis.offset >= 0 {
            return Some(positive);
        }

        if self.flee {
            let side = self.either(ctx, (negative, negative_open), (positive, positive_open));
            if side.is_some() {
                return side;
            }
        }

        let mut tail = [
            (negative, negative_open, axis.backs.0, self.open(ctx, axis.backs.0)),
            (positive, positive_open, axis.backs.1, self.open(ctx, axis.backs.1)),
        ];
        if axis.positive_first {
            tail.swap(0, 1);
        }
        let [(side_a, side_a_open, back_a, back_a_open), (side_b, side_b_open, back_b, back_b_open)] =
            tail;
        if back_a_open || back_b_open {
            if back_a_open && back_b_open {
                return Some(if ctx.coin() { back_a } else { back_b });
            }
            return [
                (side_a, side_a_open),
                (back_a, back_a_open),
                (side_b, side_b_open),
                (back_b, back_b_open),
            ]
            .into_iter()
            .find(|&(_, open)| open)
            .map(|(direction, _)| direction);
        }

        if self.flee && self.open(ctx, axis.toward) {
            return Some(axis.toward);
        }
        None
    }
}

/// Directions involved when the target lies mostly along one axis.
struct Axis {
    toward: Direction,
    away: Direction,
    /// Perpendicular steps, negative coordinate first.
    sides: (Direction, Direction),
    /// Diagonals leading away on the matching side.
    backs: (Direction, Direction),
    /// Target offset along the perpendicular axis.
    offset: i32,
    /// Try the positive side first once only diagonals remain.
    positive_first: bool,
}

impl Axis {
    fn new(
        toward: Direction,
        away: Direction,
        sides: (Direction, Direction),
        backs: (Direction, Direction),
        offset: i32,
    ) -> Self {
        Self {
            toward,
            away,
            sides,
            backs,
            offset,
            positive_first: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{Species, SpellBlock};
    use crate::testing::TestWorld;

    fn archer() -> Species {
        Species {
            target_distance: 4,
            attack_spells: vec![SpellBlock::ranged("arrow", 2000, 100, 6)],
            ..Species::new("archer")
        }
    }

    #[test]
    fn out_of_range_targets_fall_back_to_path_search() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));

        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(16, 10, 7), false)
        });
        assert_eq!(step, DistanceStep::Failed);
    }

    #[test]
    fn preferred_distance_holds_position() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));

        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(14, 12, 7), false)
        });
        assert_eq!(step, DistanceStep::InPosition);
    }

    #[test]
    fn closer_targets_are_backed_away_from() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));

        // target to the east: step west
        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(12, 10, 7), false)
        });
        assert_eq!(step, DistanceStep::Step(Direction::West));

        // target to the north: step south
        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(10, 8, 7), false)
        });
        assert_eq!(step, DistanceStep::Step(Direction::South));
    }

    #[test]
    fn diagonal_target_prefers_orthogonal_escape() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));
        // block the south escape so the east one is forced
        world.wall(Position::new(10, 11, 7));

        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(9, 9, 7), false)
        });
        assert_eq!(step, DistanceStep::Step(Direction::East));
    }

    #[test]
    fn cornered_monster_reports_exhaustion() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));
        for direction in Direction::ALL {
            world.wall(Position::new(10, 10, 7).step(direction));
        }

        let step = world.run(me, |monster, ctx| {
            monster.distance_step(ctx, Position::new(12, 10, 7), true)
        });
        assert_eq!(step, DistanceStep::Exhausted);
    }

    #[test]
    fn adjacent_targets_raise_step_slowdown() {
        let mut world = TestWorld::new();
        world.add_species(archer());
        let me = world.monster("archer", Position::new(10, 10, 7));

        world.run(me, |monster, ctx| {
            for _ in 0..3 {
                monster.distance_step(ctx, Position::new(11, 10, 7), false);
            }
            assert_eq!(monster.step_slowdown, 2);
            monster.distance_step(ctx, Position::new(13, 10, 7), false);
            assert_eq!(monster.step_slowdown, 1);
        });
    }
}
