//! Runtime configuration.
use std::env;
use std::path::PathBuf;

use terraform_core::GameConfig;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max actions per turn must be positive, got {0}")]
    InvalidMaxActions(i32),

    #[error("{name} must be at least 1")]
    EmptyBuffer { name: &'static str },
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub game: GameConfig,
    /// Capacity of the state update channel.
    pub broadcast_buffer: usize,
    /// Capacity of the event bus tap.
    pub event_tap_buffer: usize,
    /// Fixed deck shuffle seed; random when unset.
    pub shuffle_seed: Option<u64>,
    /// JSON card catalog to load instead of the built-in one.
    pub card_catalog_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            broadcast_buffer: 64,
            event_tap_buffer: 256,
            shuffle_seed: None,
            card_catalog_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TERRAFORM_BROADCAST_BUFFER` - State update channel size (default: 64)
    /// - `TERRAFORM_EVENT_TAP_BUFFER` - Event tap size (default: 256)
    /// - `TERRAFORM_SHUFFLE_SEED` - Deterministic deck shuffle seed
    /// - `TERRAFORM_MAX_ACTIONS` - Actions per turn (default: 2)
    /// - `TERRAFORM_CARD_CATALOG` - Path to a JSON card catalog
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("TERRAFORM_BROADCAST_BUFFER") {
            config.broadcast_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("TERRAFORM_EVENT_TAP_BUFFER") {
            config.event_tap_buffer = capacity.max(1);
        }
        if let Some(seed) = read_env::<u64>("TERRAFORM_SHUFFLE_SEED") {
            config.shuffle_seed = Some(seed);
        }
        if let Some(actions) = read_env::<i32>("TERRAFORM_MAX_ACTIONS") {
            config.game = config.game.with_max_actions_per_turn(actions);
        }
        if let Some(path) = read_env::<PathBuf>("TERRAFORM_CARD_CATALOG") {
            config.card_catalog_path = Some(path);
        }

        config
    }

    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.max_actions_per_turn <= 0 {
            return Err(ConfigError::InvalidMaxActions(
                self.game.max_actions_per_turn,
            ));
        }
        if self.broadcast_buffer == 0 {
            return Err(ConfigError::EmptyBuffer {
                name: "broadcast_buffer",
            });
        }
        if self.event_tap_buffer == 0 {
            return Err(ConfigError::EmptyBuffer {
                name: "event_tap_buffer",
            });
        }
        Ok(())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.game.max_actions_per_turn, 2);
        assert!(config.shuffle_seed.is_none());
    }

    #[test]
    fn zero_actions_per_turn_is_rejected() {
        let mut game = GameConfig::default();
        game.max_actions_per_turn = 0;
        let config = RuntimeConfig::default().with_game(game);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxActions(0)));
    }
}
