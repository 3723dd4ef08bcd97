//! Runtime configuration and its environment loader.
use std::env;
use std::time::Duration;

use combat_core::CombatConfig;

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Capacity of each event bus topic channel.
    pub event_buffer_size: usize,
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            log_filter: "info".to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_HIT_INTERVAL_MS` - Pause between settled hits (default: 250)
    /// - `COMBAT_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `COMBAT_ABILITY_MODIFIERS` - Ability damage honors damage-taken
    ///   modifiers (default: false)
    /// - `COMBAT_LOG` - Default log filter (default: info)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("COMBAT_HIT_INTERVAL_MS") {
            config.combat.hit_interval = Duration::from_millis(millis);
        }

        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(enable) = read_env::<bool>("COMBAT_ABILITY_MODIFIERS") {
            config.combat.ability_damage_uses_modifiers = enable;
        }

        if let Ok(filter) = env::var("COMBAT_LOG") {
            config.log_filter = filter;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
