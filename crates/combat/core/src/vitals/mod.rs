//! Health and shield store for one entity.
//!
//! Health is kept as `f64` so fractional hits accumulate, while every read
//! and every notification exposes the value rounded to the nearest integer.
//! Shield is an integer pool that absorbs damage before health.

mod error;

pub use error::VitalsError;

use tracing::{debug, info, warn};

use crate::entity::EntityId;
use crate::observer::{Observers, SubscriptionId};

/// Notifications emitted by [`Vitals`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VitalsEvent {
    HealthChanged {
        entity: EntityId,
        health: u32,
        max: u32,
    },
    ShieldChanged {
        entity: EntityId,
        shield: u32,
    },
    /// Fired for every accepted damage intake. `amount` is the requested
    /// damage, rounded.
    DamageTaken {
        entity: EntityId,
        amount: u32,
        health: u32,
        shield: u32,
    },
    Healed {
        entity: EntityId,
        amount: u32,
        health: u32,
    },
    /// Health reached zero through damage. Fires once per life.
    Died { entity: EntityId },
}

impl VitalsEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::HealthChanged { entity, .. }
            | Self::ShieldChanged { entity, .. }
            | Self::DamageTaken { entity, .. }
            | Self::Healed { entity, .. }
            | Self::Died { entity } => *entity,
        }
    }
}

/// Breakdown of one accepted damage intake.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub requested: f64,
    pub shield_absorbed: u32,
    /// Health actually removed (clamped at the health that was left).
    pub health_lost: f64,
    pub died: bool,
}

/// Mutable health/shield state of one entity.
///
/// Invariants: `0 <= health <= max_health`, and the entity is dead exactly
/// when health is zero. A dead entity rejects damage, healing and shield
/// grants until [`reset`](Self::reset) or
/// [`set_current_health`](Self::set_current_health) revives it.
#[derive(Debug)]
pub struct Vitals {
    entity: EntityId,
    max_health: u32,
    health: f64,
    shield: u32,
    death_reported: bool,
    observers: Observers<VitalsEvent>,
}

impl Vitals {
    /// Creates vitals at full health with no shield. A zero maximum is
    /// raised to 1.
    pub fn new(entity: EntityId, max_health: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            entity,
            max_health,
            health: max_health as f64,
            shield: 0,
            death_reported: false,
            observers: Observers::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&VitalsEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current health rounded to the nearest integer.
    pub fn health(&self) -> u32 {
        round_health(self.health)
    }

    /// Current health with sub-unit precision.
    pub fn health_precise(&self) -> f64 {
        self.health
    }

    pub fn shield(&self) -> u32 {
        self.shield
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    // ========================================================================
    // Damage
    // ========================================================================

    /// Applies already-modified damage. Returns the health actually lost, or
    /// 0 when the intake was rejected.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        self.try_take_damage(amount)
            .map(|report| report.health_lost)
            .unwrap_or(0.0)
    }

    /// Applies already-modified damage: shield absorbs first, the remainder
    /// comes off health.
    ///
    /// Shield absorbs in whole points: a fractional remainder costs a full
    /// shield point, so `5.4` damage against `10` shield leaves `4` shield
    /// and health untouched.
    pub fn try_take_damage(&mut self, amount: f64) -> Result<DamageReport, VitalsError> {
        self.ensure_alive("take_damage")?;
        ensure_positive(self.entity, "take_damage", amount)?;

        let mut remaining = amount;
        let mut shield_absorbed = 0;

        if self.shield > 0 {
            let wanted = remaining.ceil().min(u32::MAX as f64) as u32;
            shield_absorbed = self.shield.min(wanted);
            self.shield -= shield_absorbed;
            remaining = (remaining - shield_absorbed as f64).max(0.0);
            self.notify(VitalsEvent::ShieldChanged {
                entity: self.entity,
                shield: self.shield,
            });
        }

        let mut health_lost = 0.0;
        if remaining > 0.0 {
            let before = self.health;
            self.health = (self.health - remaining).max(0.0);
            health_lost = before - self.health;
            if health_lost > 0.0 {
                self.notify_health();
            }
        }

        self.notify(VitalsEvent::DamageTaken {
            entity: self.entity,
            amount: round_health(amount),
            health: self.health(),
            shield: self.shield,
        });

        debug!(
            entity = %self.entity,
            amount,
            shield_absorbed,
            health_lost,
            health = self.health(),
            "damage taken"
        );

        let died = self.is_dead() && !self.death_reported;
        if died {
            self.death_reported = true;
            info!(entity = %self.entity, "entity died");
            self.notify(VitalsEvent::Died {
                entity: self.entity,
            });
        }

        Ok(DamageReport {
            requested: amount,
            shield_absorbed,
            health_lost,
            died,
        })
    }

    // ========================================================================
    // Restoration
    // ========================================================================

    /// Heals up to `max_health`. Returns the healed amount, or 0 when rejected.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.try_heal(amount).unwrap_or(0)
    }

    /// Heals up to `max_health`.
    ///
    /// The reported amount is the difference between the rounded health
    /// before and after, so it matches what a health display shows even when
    /// the precise value moved by a fraction more or less.
    pub fn try_heal(&mut self, amount: u32) -> Result<u32, VitalsError> {
        self.ensure_alive("heal")?;
        ensure_positive(self.entity, "heal", amount as f64)?;

        let before = self.health();
        self.health = (self.health + amount as f64).min(self.max_health as f64);
        let after = self.health();
        let healed = after.saturating_sub(before);

        if after != before {
            self.notify_health();
            self.notify(VitalsEvent::Healed {
                entity: self.entity,
                amount: healed,
                health: after,
            });
        }

        Ok(healed)
    }

    /// Grants shield. Returns the granted amount, or 0 when rejected.
    pub fn add_shield(&mut self, amount: u32) -> u32 {
        self.try_add_shield(amount).unwrap_or(0)
    }

    pub fn try_add_shield(&mut self, amount: u32) -> Result<u32, VitalsError> {
        self.ensure_alive("add_shield")?;
        ensure_positive(self.entity, "add_shield", amount as f64)?;

        self.shield = self.shield.saturating_add(amount);
        self.notify(VitalsEvent::ShieldChanged {
            entity: self.entity,
            shield: self.shield,
        });

        Ok(amount)
    }

    // ========================================================================
    // Direct assignment
    // ========================================================================

    /// Resizes the health pool, clamping current health down if needed.
    /// Returns false (and changes nothing) for a zero maximum.
    pub fn set_max_health(&mut self, max_health: u32) -> bool {
        if max_health == 0 {
            warn!(entity = %self.entity, "set_max_health rejected: maximum must be positive");
            return false;
        }

        self.max_health = max_health;
        self.health = self.health.min(max_health as f64);
        self.notify_health();
        true
    }

    /// Restores full health, removes shield and revives the entity.
    pub fn reset(&mut self) {
        self.health = self.max_health as f64;
        self.shield = 0;
        self.death_reported = false;
        self.notify_health();
        self.notify(VitalsEvent::ShieldChanged {
            entity: self.entity,
            shield: self.shield,
        });
    }

    /// Overwrites health for external re-synchronisation, clamped into
    /// `[0, max_health]`.
    ///
    /// Bypasses damage/heal semantics: assigning zero makes the entity dead
    /// without firing [`VitalsEvent::Died`].
    pub fn set_current_health(&mut self, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value };
        self.health = value.clamp(0.0, self.max_health as f64);
        if self.health > 0.0 {
            self.death_reported = false;
        }
        self.notify_health();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_alive(&self, operation: &'static str) -> Result<(), VitalsError> {
        if self.is_dead() {
            warn!(entity = %self.entity, operation, "rejected: entity is dead");
            return Err(VitalsError::Dead {
                entity: self.entity,
            });
        }
        Ok(())
    }

    fn notify_health(&mut self) {
        self.notify(VitalsEvent::HealthChanged {
            entity: self.entity,
            health: self.health(),
            max: self.max_health,
        });
    }

    fn notify(&mut self, event: VitalsEvent) {
        self.observers.notify(&event);
    }
}

fn ensure_positive(
    entity: EntityId,
    operation: &'static str,
    amount: f64,
) -> Result<(), VitalsError> {
    if amount > 0.0 {
        Ok(())
    } else {
        warn!(%entity, operation, amount, "rejected: amount must be positive");
        Err(VitalsError::NonPositiveAmount { amount })
    }
}

fn round_health(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
