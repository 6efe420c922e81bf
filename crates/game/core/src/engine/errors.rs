//! Errors surfaced by the engine façade.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, SpawnError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown creature {0}")]
    UnknownCreature(EntityId),

    #[error("creature {0} is not a monster")]
    NotAMonster(EntityId),

    #[error("creature {0} is not a player")]
    NotAPlayer(EntityId),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCreature(_) | Self::NotAMonster(_) | Self::NotAPlayer(_) => {
                ErrorSeverity::Validation
            }
            Self::Oracle(error) => error.severity(),
            Self::Spawn(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCreature(_) => "ENGINE_UNKNOWN_CREATURE",
            Self::NotAMonster(_) => "ENGINE_NOT_A_MONSTER",
            Self::NotAPlayer(_) => "ENGINE_NOT_A_PLAYER",
            Self::Oracle(error) => error.error_code(),
            Self::Spawn(error) => error.error_code(),
        }
    }
}
