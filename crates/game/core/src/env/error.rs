//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};

/// A required oracle was not supplied to the [`Env`](super::Env).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("MapOracle not available")]
    MapNotAvailable,

    #[error("PathOracle not available")]
    PathNotAvailable,

    #[error("SpeciesOracle not available")]
    SpeciesNotAvailable,

    #[error("ScriptOracle not available")]
    ScriptsNotAvailable,

    #[error("ConfigOracle not available")]
    ConfigNotAvailable,
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            MapNotAvailable => "ORACLE_MAP_NOT_AVAILABLE",
            PathNotAvailable => "ORACLE_PATH_NOT_AVAILABLE",
            SpeciesNotAvailable => "ORACLE_SPECIES_NOT_AVAILABLE",
            ScriptsNotAvailable => "ORACLE_SCRIPTS_NOT_AVAILABLE",
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
        }
    }
}
