//! Runtime configuration.
//!
//! Values come from the environment and can be overridden by CLI flags.
//! None of them change simulation outcomes except `seed`, which feeds the
//! random moves.

use serde::{Serialize, Deserialize};

/// Default pause on the game-over and victory screens.
pub const DEFAULT_END_SCREEN_MS: u64 = 2000;

/// Game session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Session seed; each level's RNG is derived from it and the level name.
    pub seed: u64,
    /// Pause after the game-over or victory screen.
    pub end_screen_ms: u64,
    /// Skip every display pause.
    pub no_delay: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            end_screen_ms: DEFAULT_END_SCREEN_MS,
            no_delay: false,
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables.
    ///
    /// `PACTERM_SEED`, `PACTERM_END_SCREEN_MS`, `PACTERM_NO_DELAY`.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            seed: lookup("PACTERM_SEED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.seed),
            end_screen_ms: lookup("PACTERM_END_SCREEN_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.end_screen_ms),
            no_delay: lookup("PACTERM_NO_DELAY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.no_delay),
        }
    }

    /// Pause to request for `ms`, honoring `no_delay`.
    pub fn pacing(&self, ms: u64) -> u64 {
        if self.no_delay {
            0
        } else {
            ms
        }
    }
}
