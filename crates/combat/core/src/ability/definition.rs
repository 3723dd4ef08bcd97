//! Resolved ability parameters.

use crate::status::StatusEffect;
use crate::turn::TurnPhase;

/// Phase-entry moment at which an ability fires on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AbilityTrigger {
    CombatStart,
    TurnStart,
    TurnEnd,
    /// Never fired by the battle loop; only through explicit execution.
    Manual,
}

impl AbilityTrigger {
    /// Trigger matching a phase entry, if that phase fires abilities.
    pub const fn for_phase(phase: TurnPhase) -> Option<Self> {
        match phase {
            TurnPhase::GameStart => Some(Self::CombatStart),
            TurnPhase::TurnStart => Some(Self::TurnStart),
            TurnPhase::TurnEnd => Some(Self::TurnEnd),
            TurnPhase::TurnPlaying => None,
        }
    }
}

/// Which entities an ability lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    Player,
    /// The current (first living) enemy.
    Enemy,
    AllEnemies,
    /// The ability's own source.
    Caster,
    /// Squad members known to the resolver.
    AllAllies,
}

/// What an ability does to each resolved target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityEffect {
    DirectDamage { amount: f64 },
    /// Rounded to the nearest integer before healing.
    Heal { amount: f64 },
    AddStatusEffect(StatusEffect),
    /// Named hook with no dispatch mechanism yet; always rejected.
    Custom { key: String },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub name: String,
    pub trigger: AbilityTrigger,
    pub target: TargetKind,
    pub effect: AbilityEffect,
}

impl AbilityDefinition {
    pub fn new(
        name: impl Into<String>,
        trigger: AbilityTrigger,
        target: TargetKind,
        effect: AbilityEffect,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            target,
            effect,
        }
    }
}
