//! Named script handlers bound to monster lifecycle events.
//!
//! Species name a handler per event (`think`, `appear`, `disappear`, `move`,
//! `say`). The [`HookRegistry`] resolves those names to [`ScriptHook`]s and
//! serves them to the engine as its [`game_core::ScriptOracle`].
//!
//! Handlers may chain into other handlers through [`HookContext::chain`].
//! Chains deeper than [`MAX_CALL_DEPTH`] fail with
//! [`ScriptError::CallStackOverflow`](game_core::ScriptError::CallStackOverflow),
//! which aborts the monster's current step.
mod context;
mod registry;

use game_core::{HookOutcome, ScriptError, ScriptEvent};

pub use context::HookContext;
pub use registry::HookRegistry;

/// Deepest allowed handler chain.
pub const MAX_CALL_DEPTH: usize = 16;

/// Defines the criticality level of a hook for error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookCriticality {
    /// Failure propagates to the engine.
    Critical,
    /// Failure is logged as an error and the default logic proceeds.
    #[default]
    Important,
    /// Failure is logged at debug level and the default logic proceeds.
    Optional,
}

/// A script handler.
pub trait ScriptHook: Send + Sync {
    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    /// Runs the handler. Returning [`HookOutcome::Stop`] vetoes the default
    /// behaviour tied to the event.
    fn call(&self, event: &ScriptEvent, ctx: &HookContext<'_>) -> Result<HookOutcome, ScriptError>;
}

/// Adapts a closure into a [`ScriptHook`].
pub struct FnHook<F> {
    criticality: HookCriticality,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&ScriptEvent, &HookContext<'_>) -> Result<HookOutcome, ScriptError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            criticality: HookCriticality::default(),
            f,
        }
    }

    pub fn with_criticality(mut self, criticality: HookCriticality) -> Self {
        self.criticality = criticality;
        self
    }
}

impl<F> ScriptHook for FnHook<F>
where
    F: Fn(&ScriptEvent, &HookContext<'_>) -> Result<HookOutcome, ScriptError> + Send + Sync,
{
    fn criticality(&self) -> HookCriticality {
        self.criticality
    }

    fn call(&self, event: &ScriptEvent, ctx: &HookContext<'_>) -> Result<HookOutcome, ScriptError> {
        (self.f)(event, ctx)
    }
}
