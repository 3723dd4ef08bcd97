//! Ability effect execution.
//!
//! Ability *configuration* is external; this module only executes
//! already-resolved [`AbilityDefinition`]s against a target set supplied by an
//! injected [`TargetResolver`].

mod definition;
mod error;
mod executor;
mod target;

pub use definition::{AbilityDefinition, AbilityEffect, AbilityTrigger, TargetKind};
pub use error::AbilityError;
pub use executor::{AbilityExecutor, AbilityReport, AppliedEffect};
pub use target::{Roster, TargetResolver};
