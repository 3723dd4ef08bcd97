use super::machine::TurnPhase;
use crate::error::{CombatError, ErrorSeverity};

/// A guarded transition was requested from the wrong phase. The machine's
/// state is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("cannot enter {to} from {from}")]
    IllegalTransition { from: TurnPhase, to: TurnPhase },
}

impl CombatError for PhaseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::IllegalTransition { .. } => "PHASE_ILLEGAL_TRANSITION",
        }
    }
}
