//! Engine configuration.
//!
//! Passed explicitly to each [`Engagement`](crate::engagement::Engagement);
//! nothing in the engine reads global state.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Range in yards at which engagements start unless told otherwise.
pub const DEFAULT_RANGE: u32 = 15;

/// Share of automated turns spent firing under the weighted policy.
pub const DEFAULT_FIRE_PERCENT: u32 = 70;

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// How the automated opponent picks its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Fire `fire_percent`% of the time, otherwise aim.
    Weighted { fire_percent: u32 },
    /// Always fire; useful when debugging.
    AlwaysFire,
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::Weighted {
            fire_percent: DEFAULT_FIRE_PERCENT,
        }
    }
}

/// Configuration for an engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Force the player's fire roll to 1.
    pub debug_mode: bool,

    /// Starting distance between the combatants, in yards.
    pub default_range: u32,

    /// Pause before the opponent acts.
    pub opponent_delay: Duration,

    /// Opponent behaviour.
    pub opponent_policy: PolicyKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            default_range: DEFAULT_RANGE,
            opponent_delay: Duration::ZERO,
            opponent_policy: PolicyKind::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the forced player roll.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Set the starting range.
    pub fn with_default_range(mut self, range: u32) -> Self {
        self.default_range = range;
        self
    }

    /// Set the pause before the opponent acts.
    pub fn with_opponent_delay(mut self, delay: Duration) -> Self {
        self.opponent_delay = delay;
        self
    }

    /// Set the opponent behaviour.
    pub fn with_opponent_policy(mut self, policy: PolicyKind) -> Self {
        self.opponent_policy = policy;
        self
    }

    /// Read configuration from `FRONTIER_*` environment variables.
    ///
    /// - `FRONTIER_DEBUG_MODE`: `1`/`true` forces the player's roll
    /// - `FRONTIER_DEFAULT_RANGE`: starting range in yards
    /// - `FRONTIER_OPPONENT_DELAY_MS`: pause before the opponent acts
    /// - `FRONTIER_FIRE_PERCENT`: weighted policy fire share, or `always`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("FRONTIER_DEBUG_MODE") {
            config.debug_mode = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FRONTIER_DEBUG_MODE",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("FRONTIER_DEFAULT_RANGE") {
            config.default_range = parse_number("FRONTIER_DEFAULT_RANGE", value)?;
        }

        if let Some(value) = lookup("FRONTIER_OPPONENT_DELAY_MS") {
            let millis: u64 = parse_number("FRONTIER_OPPONENT_DELAY_MS", value)?;
            config.opponent_delay = Duration::from_millis(millis);
        }

        if let Some(value) = lookup("FRONTIER_FIRE_PERCENT") {
            config.opponent_policy = if value.trim().eq_ignore_ascii_case("always") {
                PolicyKind::AlwaysFire
            } else {
                let fire_percent: u32 = parse_number("FRONTIER_FIRE_PERCENT", value.clone())?;
                if fire_percent > 100 {
                    return Err(ConfigError::InvalidValue {
                        key: "FRONTIER_FIRE_PERCENT",
                        value,
                    });
                }
                PolicyKind::Weighted { fire_percent }
            };
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
