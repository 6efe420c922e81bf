//! Failures of the reward stores.

use game_core::{ErrorSeverity, GameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("reward repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failed write leaves the reward queued, so disk trouble is retried on the
/// next flush. Poisoned locks and unreadable files are not.
impl GameError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io(_) => ErrorSeverity::Recoverable,
            Self::LockPoisoned | Self::Json(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned => "REWARDS_LOCK_POISONED",
            Self::Io(_) => "REWARDS_IO",
            Self::Json(_) => "REWARDS_JSON",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
