//! Hit descriptors and per-hit results.

use crate::entity::EntityId;

/// One pre-computed attack event ready for settlement.
///
/// `order` defines processing order; the position of the hit inside the
/// surrounding collection does not.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakHit {
    pub target: Option<EntityId>,
    pub attacker: Option<EntityId>,
    /// Raw damage before the target's damage-taken multiplier.
    pub damage: f64,
    pub order: i32,
}

impl PeakHit {
    pub fn new(target: EntityId, damage: f64, order: i32) -> Self {
        Self {
            target: Some(target),
            attacker: None,
            damage,
            order,
        }
    }

    /// Sets the attacking entity (builder pattern).
    #[must_use]
    pub fn with_attacker(mut self, attacker: EntityId) -> Self {
        self.attacker = Some(attacker);
        self
    }
}

/// Why a hit (or an ability target) was passed over without touching any
/// component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The descriptor names no target, or the target is not registered.
    NoTarget,
    /// The target exists but has no vitals.
    NoVitals,
    /// The target died earlier (possibly earlier in the same sequence).
    TargetDead,
    /// The target has no modifier engine to receive a status effect.
    NoModifiers,
    /// The effect has no dispatch.
    Unsupported,
}

/// Outcome of one settled hit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitResolution {
    pub hit: PeakHit,
    /// Damage after the target's damage-taken multiplier.
    pub damage: f64,
    pub health: u32,
    pub shield: u32,
    pub died: bool,
}

/// Totals for one hit sequence. Skipped hits count toward neither `hits` nor
/// `deaths`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitSummary {
    pub hits: u32,
    pub deaths: u32,
    pub skipped: u32,
    /// The sequence was stopped before its last hit.
    pub cancelled: bool,
}
