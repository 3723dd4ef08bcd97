//! Status effect value type.

/// What a status effect multiplies.
///
/// Reduction and increase variants of the same axis share identical
/// arithmetic; the split only labels intent (reductions are expected to carry
/// values below 1, increases values above 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusEffectKind {
    DamageTakenReduction,
    DamageTakenIncrease,
    DamageDealtReduction,
    DamageDealtIncrease,
}

/// Damage direction a [`StatusEffectKind`] contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierAxis {
    Taken,
    Dealt,
}

impl StatusEffectKind {
    pub const fn axis(self) -> ModifierAxis {
        match self {
            Self::DamageTakenReduction | Self::DamageTakenIncrease => ModifierAxis::Taken,
            Self::DamageDealtReduction | Self::DamageDealtIncrease => ModifierAxis::Dealt,
        }
    }
}

/// Remaining lifetime of an effect, counted in completed turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Never aged, never purged by turn advancement.
    Permanent,
    /// Turns left; `Turns(0)` is expired and due for removal.
    Turns(u32),
}

impl EffectDuration {
    /// Sentinel used by ability data for permanent effects.
    pub const PERMANENT_SENTINEL: i32 = -1;

    /// Converts the integer form used by ability data (`-1` = permanent).
    ///
    /// Any other negative value is not a valid duration and returns `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            Self::PERMANENT_SENTINEL => Some(Self::Permanent),
            turns if turns >= 0 => Some(Self::Turns(turns as u32)),
            _ => None,
        }
    }

    /// Integer form, `-1` for permanent effects.
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Permanent => Self::PERMANENT_SENTINEL,
            Self::Turns(turns) => turns.min(i32::MAX as u32) as i32,
        }
    }

    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }

    pub const fn is_expired(self) -> bool {
        matches!(self, Self::Turns(0))
    }

    /// One turn of aging, floored at zero. Permanent durations are unchanged.
    pub const fn aged(self) -> Self {
        match self {
            Self::Permanent => Self::Permanent,
            Self::Turns(turns) => Self::Turns(turns.saturating_sub(1)),
        }
    }
}

/// One timed multiplicative modifier instance.
///
/// Names are labels, not keys: several effects with the same name may be
/// active at once and all of them stack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub name: String,
    pub kind: StatusEffectKind,
    /// Multiplier; below 1 reduces, above 1 increases.
    pub value: f64,
    pub duration: EffectDuration,
}

impl StatusEffect {
    pub fn new(
        name: impl Into<String>,
        kind: StatusEffectKind,
        value: f64,
        duration: EffectDuration,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            duration,
        }
    }

    /// Effect that never expires on its own.
    pub fn permanent(name: impl Into<String>, kind: StatusEffectKind, value: f64) -> Self {
        Self::new(name, kind, value, EffectDuration::Permanent)
    }

    pub fn is_expired(&self) -> bool {
        self.duration.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_duration_sentinel() {
        assert_eq!(EffectDuration::from_raw(-1), Some(EffectDuration::Permanent));
        assert_eq!(EffectDuration::from_raw(0), Some(EffectDuration::Turns(0)));
        assert_eq!(EffectDuration::from_raw(3), Some(EffectDuration::Turns(3)));
        assert_eq!(EffectDuration::from_raw(-2), None);
        assert_eq!(EffectDuration::Permanent.as_raw(), -1);
    }

    #[test]
    fn aging_floors_at_zero() {
        assert_eq!(EffectDuration::Turns(1).aged(), EffectDuration::Turns(0));
        assert_eq!(EffectDuration::Turns(0).aged(), EffectDuration::Turns(0));
        assert_eq!(EffectDuration::Permanent.aged(), EffectDuration::Permanent);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        let kind: StatusEffectKind = "Damage_Taken_Reduction".parse().unwrap();
        assert_eq!(kind, StatusEffectKind::DamageTakenReduction);
        assert_eq!(kind.to_string(), "damage_taken_reduction");
        assert_eq!(StatusEffectKind::DamageDealtIncrease.axis(), ModifierAxis::Dealt);
    }
}
