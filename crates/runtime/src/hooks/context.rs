use game_core::{Creature, CreatureRegistry, EntityId, HookOutcome, ScriptError, ScriptEvent};

use super::HookRegistry;

/// What a running handler can see: the world's creatures and the registry
/// for chaining.
pub struct HookContext<'a> {
    pub(super) registry: &'a HookRegistry,
    pub creatures: &'a CreatureRegistry,
    pub(super) depth: usize,
}

impl<'a> HookContext<'a> {
    /// Number of handlers on the call stack, this one included.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn creature(&self, id: EntityId) -> Option<&'a Creature> {
        self.creatures.get(id)
    }

    /// Invokes another handler on behalf of the current one.
    pub fn chain(&self, handler: &str, event: &ScriptEvent) -> Result<HookOutcome, ScriptError> {
        self.registry
            .dispatch(handler, event, self.creatures, self.depth + 1)
    }
}
