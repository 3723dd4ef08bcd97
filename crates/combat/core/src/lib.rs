//! Deterministic combat resolution for a turn-based squad battler.
//!
//! `combat-core` turns ordered peak hits into vitals changes, drives the
//! per-turn phase machine, and composes damage multipliers from stacked timed
//! status effects. It is synchronous and owns no timers; pacing against wall
//! clock time lives in the runtime crate.
//!
//! Components, leaves first:
//! - [`status`]: status effects and the per-entity [`ModifierEngine`]
//! - [`vitals`]: health/shield store with damage, healing and death
//! - [`registry`]: entity arena owning each entity's components
//! - [`hit`]: ordered hit settlement, immediate or step-driven
//! - [`ability`]: ability effect dispatch onto resolved targets
//! - [`turn`]: the GameStart/TurnStart/TurnPlaying/TurnEnd machine
//! - [`battle`]: the loop tying phases, abilities, aging and hits together
//!
//! Every rejected operation is a no-op reported through its return value and
//! a `tracing` warning; nothing in this crate panics on bad input.
pub mod ability;
pub mod battle;
pub mod config;
pub mod entity;
pub mod error;
pub mod hit;
pub mod observer;
pub mod registry;
pub mod status;
pub mod turn;
pub mod vitals;

pub use ability::{
    AbilityDefinition, AbilityEffect, AbilityError, AbilityExecutor, AbilityReport,
    AbilityTrigger, AppliedEffect, Roster, TargetKind, TargetResolver,
};
pub use battle::{Battle, MemberAbility, PhaseReport, TriggeredAbility};
pub use config::CombatConfig;
pub use entity::EntityId;
pub use error::{CombatError, ErrorSeverity};
pub use hit::{
    HitEvent, HitPipeline, HitPlayback, HitResolution, HitSummary, PeakHit, SkipReason,
    StepOutcome,
};
pub use observer::{Observers, SubscriptionId};
pub use registry::EntityRegistry;
pub use status::{EffectDuration, ModifierEngine, StatusEffect, StatusEffectKind, StatusEvent};
pub use turn::{PhaseError, PhaseEvent, PhaseTransition, TurnPhase, TurnPhaseMachine};
pub use vitals::{DamageReport, Vitals, VitalsError, VitalsEvent};
