//! Common error infrastructure for combat-core.
//!
//! Nothing in the combat core is fatal: every rejection degrades to "this
//! operation had no effect" and is reported through a return value. The
//! domain errors live beside the operations that produce them
//! (`VitalsError`, `PhaseError`, `AbilityError`); this module provides the
//! classification they share.

/// Severity level of a rejected combat operation.
///
/// - **Recoverable**: the state machine or entity is in the wrong state right
///   now (dead target, phase guard); a later call may succeed
/// - **Validation**: the argument itself is invalid and will never succeed
/// - **Internal**: a collaborator was misconfigured (missing component,
///   unsupported ability dispatch)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if retrying later can succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this points at a wiring mistake rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and test assertions.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
