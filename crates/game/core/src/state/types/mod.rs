pub mod common;
pub mod creature;
pub mod entities;
pub mod item;
pub mod outbox;

pub use common::{Direction, EntityId, Position, Tick};
pub use creature::{
    Conditions, Creature, CreatureKind, MonsterBody, PlayerFlags, PlayerProfile, Zone,
};
pub use entities::CreatureRegistry;
pub use item::{GroundItems, ItemFlags, ItemId, ItemState};
pub use outbox::{
    DeferredTask, MagicEffect, Notification, Outbox, PendingReward, SpeakKind, WorldEvent,
};
