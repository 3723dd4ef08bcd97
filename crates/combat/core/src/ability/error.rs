use crate::error::{CombatError, ErrorSeverity};

/// Why an ability produced no effect at all.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbilityError {
    #[error("custom ability '{key}' has no dispatch")]
    UnsupportedCustom { key: String },

    #[error("ability '{ability}' resolved no targets")]
    NoTargets { ability: String },
}

impl CombatError for AbilityError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedCustom { .. } => ErrorSeverity::Internal,
            Self::NoTargets { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedCustom { .. } => "ABILITY_UNSUPPORTED_CUSTOM",
            Self::NoTargets { .. } => "ABILITY_NO_TARGETS",
        }
    }
}
