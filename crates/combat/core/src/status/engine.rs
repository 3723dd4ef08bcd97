//! Per-entity modifier engine.

use tracing::debug;

use super::effect::{EffectDuration, ModifierAxis, StatusEffect, StatusEffectKind};
use crate::entity::EntityId;
use crate::observer::{Observers, SubscriptionId};

/// Notifications emitted by a [`ModifierEngine`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEvent {
    /// A new effect instance was stored.
    Added {
        entity: EntityId,
        effect: StatusEffect,
    },
    /// One or more effects with this name were removed (explicitly or by aging).
    Removed { entity: EntityId, name: String },
    /// The active set changed; carries a snapshot of every remaining effect.
    Updated {
        entity: EntityId,
        effects: Vec<StatusEffect>,
    },
}

impl StatusEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Added { entity, .. }
            | Self::Removed { entity, .. }
            | Self::Updated { entity, .. } => *entity,
        }
    }
}

/// Active status effects on one entity and the multiplier math over them.
///
/// Effects are kept in insertion order. Composition multiplies every matching
/// value into an accumulator starting at 1.0, so the result does not depend on
/// that order.
///
/// # Aging policy
///
/// [`advance_turn`](Self::advance_turn) is driven by the battle loop once per
/// completed turn, after turn-end abilities resolved and before the next
/// turn-start abilities fire. An effect added with `Turns(n)` during a turn
/// therefore applies for the rest of that turn plus `n - 1` further turns.
#[derive(Debug)]
pub struct ModifierEngine {
    owner: EntityId,
    effects: Vec<StatusEffect>,
    observers: Observers<StatusEvent>,
}

impl ModifierEngine {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            effects: Vec::new(),
            observers: Observers::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StatusEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Stores a new effect. Never deduplicates: same-name effects stack.
    pub fn add_effect(
        &mut self,
        name: impl Into<String>,
        kind: StatusEffectKind,
        value: f64,
        duration: EffectDuration,
    ) {
        self.push(StatusEffect::new(name, kind, value, duration));
    }

    /// Stores an independent copy of `effect`; the caller's definition is
    /// never aliased.
    pub fn insert(&mut self, effect: &StatusEffect) {
        self.push(effect.clone());
    }

    fn push(&mut self, effect: StatusEffect) {
        debug!(
            entity = %self.owner,
            name = %effect.name,
            kind = %effect.kind,
            value = effect.value,
            duration = effect.duration.as_raw(),
            "status effect added"
        );
        self.effects.push(effect.clone());
        self.observers.notify(&StatusEvent::Added {
            entity: self.owner,
            effect,
        });
        self.notify_updated();
    }

    /// Removes every effect whose name matches exactly. Returns the count.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.effects.len();
        self.effects.retain(|effect| effect.name != name);
        let removed = before - self.effects.len();

        if removed > 0 {
            self.observers.notify(&StatusEvent::Removed {
                entity: self.owner,
                name: name.to_string(),
            });
            self.notify_updated();
        }

        removed
    }

    /// Removes everything. Returns the number of effects dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.effects.len();
        if removed > 0 {
            self.effects.clear();
            self.notify_updated();
        }
        removed
    }

    /// Ages every timed effect by one turn, then purges the expired ones.
    ///
    /// Effects already at `Turns(0)` are purged by this call as well.
    /// Returns the number of purged effects.
    pub fn advance_turn(&mut self) -> usize {
        for effect in self.effects.iter_mut() {
            effect.duration = effect.duration.aged();
        }

        let mut purged_names: Vec<String> = Vec::new();
        let before = self.effects.len();
        self.effects.retain(|effect| {
            if effect.is_expired() {
                if !purged_names.contains(&effect.name) {
                    purged_names.push(effect.name.clone());
                }
                false
            } else {
                true
            }
        });
        let purged = before - self.effects.len();

        if purged > 0 {
            debug!(entity = %self.owner, purged, "status effects expired");
            for name in purged_names {
                self.observers.notify(&StatusEvent::Removed {
                    entity: self.owner,
                    name,
                });
            }
            self.notify_updated();
        }

        purged
    }

    fn notify_updated(&mut self) {
        let event = StatusEvent::Updated {
            entity: self.owner,
            effects: self.effects.clone(),
        };
        self.observers.notify(&event);
    }

    // ========================================================================
    // Multipliers
    // ========================================================================

    fn compose(&self, axis: ModifierAxis) -> f64 {
        self.effects
            .iter()
            .filter(|effect| effect.kind.axis() == axis)
            .fold(1.0, |acc, effect| acc * effect.value)
    }

    /// Product of every damage-taken effect value (1.0 when none).
    pub fn damage_taken_multiplier(&self) -> f64 {
        self.compose(ModifierAxis::Taken)
    }

    /// Product of every damage-dealt effect value (1.0 when none).
    pub fn damage_dealt_multiplier(&self) -> f64 {
        self.compose(ModifierAxis::Dealt)
    }

    pub fn apply_damage_taken(&self, raw_damage: f64) -> f64 {
        raw_damage * self.damage_taken_multiplier()
    }

    pub fn apply_damage_dealt(&self, raw_damage: f64) -> f64 {
        raw_damage * self.damage_dealt_multiplier()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|effect| effect.name == name)
    }

    pub fn count_by_name(&self, name: &str) -> usize {
        self.effects.iter().filter(|effect| effect.name == name).count()
    }
}
