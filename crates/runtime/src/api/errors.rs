//! Errors surfaced by the runtime API.
//!
//! Worker coordination failures sit next to wrapped engine and repository
//! errors. All of them classify through [`GameError`] so the worker can choose
//! how loudly to report a failure and whether to keep ticking.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{EngineError, ErrorSeverity, GameError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(error) => error.severity(),
            Self::Repository(error) => error.severity(),
            Self::InvalidConfig(_) => ErrorSeverity::Validation,
            Self::CommandChannelClosed
            | Self::ReplyChannelClosed(_)
            | Self::WorkerJoin(_)
            | Self::MissingOracles => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Engine(error) => error.error_code(),
            Self::Repository(error) => error.error_code(),
            Self::MissingOracles => "RUNTIME_MISSING_ORACLES",
            Self::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EntityId, OracleError};

    #[test]
    fn wrapped_errors_keep_their_engine_class() {
        let unknown = RuntimeError::from(EngineError::UnknownCreature(EntityId(3)));
        assert_eq!(unknown.severity(), ErrorSeverity::Validation);
        assert_eq!(unknown.error_code(), "ENGINE_UNKNOWN_CREATURE");

        let blind = RuntimeError::from(EngineError::from(OracleError::MapNotAvailable));
        assert!(blind.severity().is_fatal());
    }

    #[test]
    fn disk_trouble_is_retried_but_poisoned_stores_are_not() {
        let disk = RuntimeError::from(RepositoryError::Io(std::io::Error::other("full")));
        assert!(disk.severity().is_expected());
        assert_eq!(disk.error_code(), "REWARDS_IO");

        let poisoned = RuntimeError::from(RepositoryError::LockPoisoned);
        assert_eq!(poisoned.severity(), ErrorSeverity::Internal);
        assert!(RuntimeError::CommandChannelClosed.severity().is_fatal());
    }
}
