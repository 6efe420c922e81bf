//! Errors raised while adding creatures to the world.

use crate::error::{ErrorSeverity, GameError};
use crate::state::Position;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnError {
    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("no free tile around {position}")]
    NoFreeTile { position: Position },
}

impl GameError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownSpecies(_) => ErrorSeverity::Validation,
            Self::NoFreeTile { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSpecies(_) => "SPAWN_UNKNOWN_SPECIES",
            Self::NoFreeTile { .. } => "SPAWN_NO_FREE_TILE",
        }
    }
}
