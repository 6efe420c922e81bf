//! Script hook boundary.
//!
//! Species may bind named handlers to lifecycle events. The AI invokes them
//! through [`ScriptOracle`] and only interprets the tri-state outcome; how a
//! handler runs is up to the implementation.
use crate::error::{ErrorSeverity, GameError};
use crate::state::{CreatureRegistry, EntityId, Position, SpeakKind};

/// Event handed to a script handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptEvent {
    Think {
        monster: EntityId,
        interval: u64,
    },
    Appear {
        monster: EntityId,
        creature: EntityId,
    },
    Disappear {
        monster: EntityId,
        creature: EntityId,
    },
    Move {
        monster: EntityId,
        creature: EntityId,
        from: Position,
        to: Position,
    },
    Say {
        monster: EntityId,
        creature: EntityId,
        kind: SpeakKind,
        text: String,
    },
}

impl ScriptEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Think { .. } => "think",
            Self::Appear { .. } => "appear",
            Self::Disappear { .. } => "disappear",
            Self::Move { .. } => "move",
            Self::Say { .. } => "say",
        }
    }
}

/// Result of invoking a hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// No handler is registered under that name.
    NoHook,
    /// The handler ran; default logic proceeds.
    Continue,
    /// The handler ran and vetoed the default logic.
    Stop,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script call stack overflow while dispatching '{0}'")]
    CallStackOverflow(String),

    #[error("script handler failed: {0}")]
    Failed(String),
}

impl GameError for ScriptError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CallStackOverflow(_) => ErrorSeverity::Internal,
            Self::Failed(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CallStackOverflow(_) => "SCRIPT_CALL_STACK_OVERFLOW",
            Self::Failed(_) => "SCRIPT_FAILED",
        }
    }
}

pub trait ScriptOracle: Send + Sync {
    fn invoke(
        &self,
        handler: &str,
        event: &ScriptEvent,
        creatures: &CreatureRegistry,
    ) -> Result<HookOutcome, ScriptError>;
}

/// Script oracle with no handlers at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScripts;

impl ScriptOracle for NoScripts {
    fn invoke(
        &self,
        _handler: &str,
        _event: &ScriptEvent,
        _creatures: &CreatureRegistry,
    ) -> Result<HookOutcome, ScriptError> {
        Ok(HookOutcome::NoHook)
    }
}
