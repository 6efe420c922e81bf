//! Hook registry resolving handler names for the engine.

use std::collections::HashMap;
use std::sync::Arc;

use game_core::{CreatureRegistry, HookOutcome, ScriptError, ScriptEvent, ScriptOracle};
use tracing::{debug, error, warn};

use super::{HookContext, HookCriticality, MAX_CALL_DEPTH, ScriptHook};

/// Registry of script handlers keyed by name.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn ScriptHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `hook` to `name`, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn ScriptHook>) -> &mut Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    pub fn with_hook(mut self, name: impl Into<String>, hook: Arc<dyn ScriptHook>) -> Self {
        self.register(name, hook);
        self
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn ScriptHook>> {
        self.hooks.get(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over all hook names (for debugging).
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.hooks.keys().map(String::as_str)
    }

    pub(super) fn dispatch(
        &self,
        handler: &str,
        event: &ScriptEvent,
        creatures: &CreatureRegistry,
        depth: usize,
    ) -> Result<HookOutcome, ScriptError> {
        if depth > MAX_CALL_DEPTH {
            warn!(
                target: "runtime::hooks",
                handler,
                depth,
                "script call stack overflow"
            );
            return Err(ScriptError::CallStackOverflow(handler.to_owned()));
        }
        let Some(hook) = self.hooks.get(handler) else {
            return Ok(HookOutcome::NoHook);
        };

        let ctx = HookContext {
            registry: self,
            creatures,
            depth,
        };
        match hook.call(event, &ctx) {
            Ok(HookOutcome::NoHook) => Ok(HookOutcome::Continue),
            Ok(outcome) => {
                debug!(
                    target: "runtime::hooks",
                    handler,
                    event = event.name(),
                    ?outcome,
                    "script handler ran"
                );
                Ok(outcome)
            }
            Err(overflow @ ScriptError::CallStackOverflow(_)) => Err(overflow),
            Err(failure) => self.handle_hook_error(handler, hook.criticality(), failure),
        }
    }

    /// Returns Ok(Continue) for Important/Optional hooks, Err for Critical hooks.
    fn handle_hook_error(
        &self,
        handler: &str,
        criticality: HookCriticality,
        failure: ScriptError,
    ) -> Result<HookOutcome, ScriptError> {
        match criticality {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    handler,
                    criticality = "critical",
                    error = %failure,
                    "Critical script handler failed"
                );
                Err(failure)
            }
            HookCriticality::Important => {
                error!(
                    target: "runtime::hooks",
                    handler,
                    criticality = "important",
                    error = %failure,
                    "Script handler failed, continuing"
                );
                Ok(HookOutcome::Continue)
            }
            HookCriticality::Optional => {
                debug!(
                    target: "runtime::hooks",
                    handler,
                    criticality = "optional",
                    error = %failure,
                    "Optional script handler failed"
                );
                Ok(HookOutcome::Continue)
            }
        }
    }
}

impl ScriptOracle for HookRegistry {
    fn invoke(
        &self,
        handler: &str,
        event: &ScriptEvent,
        creatures: &CreatureRegistry,
    ) -> Result<HookOutcome, ScriptError> {
        self.dispatch(handler, event, creatures, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FnHook;
    use game_core::EntityId;

    fn think() -> ScriptEvent {
        ScriptEvent::Think {
            monster: EntityId(1 << 30),
            interval: 1000,
        }
    }

    fn invoke(registry: &HookRegistry, handler: &str) -> Result<HookOutcome, ScriptError> {
        registry.invoke(handler, &think(), &CreatureRegistry::new())
    }

    #[test]
    fn unbound_handler_reports_no_hook() {
        let registry = HookRegistry::new();
        assert_eq!(invoke(&registry, "onThink"), Ok(HookOutcome::NoHook));
    }

    #[test]
    fn handler_outcome_is_passed_through() {
        let registry = HookRegistry::new()
            .with_hook("veto", Arc::new(FnHook::new(|_, _| Ok(HookOutcome::Stop))))
            .with_hook("allow", Arc::new(FnHook::new(|_, _| Ok(HookOutcome::Continue))));

        assert_eq!(invoke(&registry, "veto"), Ok(HookOutcome::Stop));
        assert_eq!(invoke(&registry, "allow"), Ok(HookOutcome::Continue));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn chained_handler_sees_the_same_event() {
        let registry = HookRegistry::new()
            .with_hook(
                "outer",
                Arc::new(FnHook::new(|event, ctx| ctx.chain("inner", event))),
            )
            .with_hook(
                "inner",
                Arc::new(FnHook::new(|event, ctx| {
                    assert_eq!(ctx.depth(), 2);
                    assert_eq!(event.name(), "think");
                    Ok(HookOutcome::Stop)
                })),
            );

        assert_eq!(invoke(&registry, "outer"), Ok(HookOutcome::Stop));
    }

    #[test]
    fn self_recursion_overflows() {
        let registry = HookRegistry::new().with_hook(
            "loop",
            Arc::new(FnHook::new(|event, ctx| ctx.chain("loop", event))),
        );

        assert_eq!(
            invoke(&registry, "loop"),
            Err(ScriptError::CallStackOverflow("loop".to_owned()))
        );
    }

    #[test]
    fn failures_follow_criticality() {
        let failing = |_: &ScriptEvent, _: &HookContext<'_>| -> Result<HookOutcome, ScriptError> {
            Err(ScriptError::Failed("boom".into()))
        };
        let registry = HookRegistry::new()
            .with_hook("soft", Arc::new(FnHook::new(failing)))
            .with_hook(
                "hard",
                Arc::new(FnHook::new(failing).with_criticality(HookCriticality::Critical)),
            );

        assert_eq!(invoke(&registry, "soft"), Ok(HookOutcome::Continue));
        assert!(matches!(invoke(&registry, "hard"), Err(ScriptError::Failed(_))));
    }
}
