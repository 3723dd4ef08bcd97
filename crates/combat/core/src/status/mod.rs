//! Timed multiplicative status effects.
//!
//! A [`StatusEffect`] is one stacked modifier instance; a [`ModifierEngine`]
//! owns every effect active on one entity, folds them into damage
//! multipliers, and ages them once per completed turn.

mod effect;
mod engine;

pub use effect::{EffectDuration, ModifierAxis, StatusEffect, StatusEffectKind};
pub use engine::{ModifierEngine, StatusEvent};
