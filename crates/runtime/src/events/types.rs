use game_core::{Tick, WorldEvent};
use serde::{Deserialize, Serialize};

/// A world change stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEventRecord {
    pub tick: Tick,
    pub event: WorldEvent,
}

/// A reward container reached the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStored {
    pub player_guid: u32,
    pub boss_name: String,
    pub item_count: usize,
}

/// One simulation tick finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCompleted {
    pub tick: Tick,
    /// Monsters still registered for thinking after the tick.
    pub active_monsters: usize,
    pub events: usize,
}
