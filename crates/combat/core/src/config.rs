use std::time::Duration;

/// Combat tuning parameters shared by the pipeline and the battle loop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Pause inserted between two hits during delayed playback.
    /// `Duration::ZERO` resolves the whole sequence without pacing.
    pub hit_interval: Duration,

    /// When set, `DirectDamage` abilities run through the target's
    /// damage-taken multiplier like pipeline hits do. Off by default so that
    /// ability damage lands unmodified.
    pub ability_damage_uses_modifiers: bool,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Longest chain of phases a single trigger can enter
    /// (GameStart → TurnStart → TurnPlaying).
    pub const MAX_PHASE_CASCADE: usize = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HIT_INTERVAL: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self {
            hit_interval: Self::DEFAULT_HIT_INTERVAL,
            ability_damage_uses_modifiers: false,
        }
    }

    pub fn with_hit_interval(mut self, hit_interval: Duration) -> Self {
        self.hit_interval = hit_interval;
        self
    }

    pub fn with_ability_modifiers(mut self, enabled: bool) -> Self {
        self.ability_damage_uses_modifiers = enabled;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
