//! Failure classes shared by the engine's error enums.
//!
//! `EngineError`, `OracleError`, `ScriptError` and `SpawnError` live beside
//! the code raising them. The AI decision code itself never fails: stale
//! handles and ineligible targets are skipped. The runtime reads
//! [`GameError::severity`] to pick a log level and to decide whether its
//! worker may keep ticking.

/// How the host should react to a failed engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The world was fine, the request just could not be met right now
    /// (a summoner boxed in by walls).
    Recoverable,
    /// The caller named something that does not exist or has the wrong kind.
    Validation,
    /// The engine reached a state it should never reach, such as runaway
    /// script recursion.
    Internal,
    /// The environment is missing an oracle; no tick can succeed.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Caller mistakes and transient refusals; nothing to investigate.
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Classification every engine error enum provides.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier of the variant, for logs.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::env::{OracleError, ScriptError};
    use crate::state::{EntityId, Position, SpawnError};

    #[test]
    fn engine_errors_inherit_the_class_of_their_cause() {
        let missing = EngineError::from(OracleError::PathNotAvailable);
        assert!(missing.severity().is_fatal());
        assert_eq!(missing.error_code(), "ORACLE_PATH_NOT_AVAILABLE");

        let boxed_in = EngineError::from(SpawnError::NoFreeTile {
            position: Position::new(1, 1, 7),
        });
        assert_eq!(boxed_in.severity(), ErrorSeverity::Recoverable);
        assert!(boxed_in.severity().is_expected());

        let stranger = EngineError::UnknownCreature(EntityId(9));
        assert_eq!(stranger.severity().as_str(), "validation");

        let runaway = ScriptError::CallStackOverflow("onThink".into());
        assert!(!runaway.severity().is_expected());
        assert!(!runaway.severity().is_fatal());
    }
}
