//! Errors surfaced by the combat runtime.
use thiserror::Error;

use combat_core::{CombatError, ErrorSeverity, PhaseError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("a hit sequence is already playing")]
    PlaybackInFlight,

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("failed to install tracing subscriber: {0}")]
    Logging(String),
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PlaybackInFlight => ErrorSeverity::Recoverable,
            Self::Phase(err) => err.severity(),
            Self::Logging(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PlaybackInFlight => "RUNTIME_PLAYBACK_IN_FLIGHT",
            Self::Phase(err) => err.error_code(),
            Self::Logging(_) => "RUNTIME_LOGGING",
        }
    }
}
