use crate::entity::EntityId;
use crate::error::{CombatError, ErrorSeverity};

/// Why a vitals mutation was rejected. State is unchanged in every case.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VitalsError {
    #[error("entity {entity} is dead")]
    Dead { entity: EntityId },

    #[error("amount must be positive (got {amount})")]
    NonPositiveAmount { amount: f64 },
}

impl CombatError for VitalsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Dead { .. } => ErrorSeverity::Recoverable,
            Self::NonPositiveAmount { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Dead { .. } => "VITALS_DEAD",
            Self::NonPositiveAmount { .. } => "VITALS_NON_POSITIVE_AMOUNT",
        }
    }
}
