//! Capability traits over creature bodies.
//!
//! AI code asks a body for what it can do rather than what it is.

use crate::state::{Creature, CreatureKind, Position, Tick, Zone};

pub trait Positioned {
    fn position(&self) -> Position;

    /// Whether `other` lies on the same floor.
    fn same_floor(&self, other: Position) -> bool {
        self.position().z == other.z
    }
}

pub trait Combatant {
    fn health(&self) -> i32;
    fn health_max(&self) -> i32;

    /// Whether attacks against this body are allowed at all.
    fn can_be_attacked(&self) -> bool;

    fn is_dead(&self) -> bool {
        self.health() <= 0
    }
}

pub trait Mobile {
    /// Base speed, or zero for bodies that never move.
    fn speed(&self) -> u32;
    fn last_move_at(&self) -> Tick;

    /// Milliseconds between two steps, before slowdown.
    fn step_duration(&self) -> u64 {
        let speed = self.speed();
        if speed == 0 {
            return 0;
        }
        (100_000 / speed as u64).max(50)
    }
}

impl Positioned for Creature {
    fn position(&self) -> Position {
        self.position
    }
}

impl Combatant for Creature {
    fn health(&self) -> i32 {
        self.health
    }

    fn health_max(&self) -> i32 {
        self.health_max
    }

    fn can_be_attacked(&self) -> bool {
        if !self.attackable || self.zone == Zone::Protection {
            return false;
        }
        match &self.kind {
            CreatureKind::Player(profile) => !profile
                .flags
                .contains(crate::state::PlayerFlags::CANNOT_BE_ATTACKED),
            CreatureKind::Monster(_) => true,
            CreatureKind::Npc => false,
        }
    }
}

impl Mobile for Creature {
    fn speed(&self) -> u32 {
        self.speed
    }

    fn last_move_at(&self) -> Tick {
        self.last_move_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EntityId, PlayerFlags};

    #[test]
    fn step_duration_has_floor() {
        let mut body = Creature::player(EntityId(1), "Alice", 1, Position::new(0, 0, 7), 100);
        body.speed = 200;
        assert_eq!(body.step_duration(), 500);
        body.speed = 5000;
        assert_eq!(body.step_duration(), 50);
    }

    #[test]
    fn protected_players_cannot_be_attacked() {
        let mut body = Creature::player(EntityId(1), "Alice", 1, Position::new(0, 0, 7), 100);
        assert!(body.can_be_attacked());
        if let Some(profile) = body.profile_mut() {
            profile.flags |= PlayerFlags::CANNOT_BE_ATTACKED;
        }
        assert!(!body.can_be_attacked());
    }
}
