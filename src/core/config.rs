//! Engine configuration.
//!
//! Matches configure the engine at startup through `EngineConfig`. Nothing
//! here is read from disk; callers build a config in code or deserialize one
//! from whatever format their front end uses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one match.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use holo_ccg::core::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_seed(7)
///     .with_choice_timeout(Duration::from_millis(500));
///
/// assert_eq!(config.player_count, 2);
/// assert_eq!(config.choice_timeout, Some(Duration::from_millis(500)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of players in the match.
    pub player_count: usize,

    /// Seed for the default random source.
    pub seed: u64,

    /// Cap on how long an effect may wait for a player decision.
    ///
    /// `None` waits forever, which is what a human opponent needs. CPU and
    /// automated matches should set a cap so a stuck choice source cannot
    /// hang the match.
    pub choice_timeout: Option<Duration>,

    /// Restore the pre-execution snapshot when an effect fails or is
    /// cancelled.
    pub rollback_on_failure: bool,

    /// Life cards dealt to each player at game start when the oshi does not
    /// specify its own life value.
    pub default_life: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            seed: 0,
            choice_timeout: None,
            rollback_on_failure: true,
            default_life: 5,
        }
    }
}

impl EngineConfig {
    /// Create the default two-player configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the player count.
    #[must_use]
    pub fn with_players(mut self, player_count: usize) -> Self {
        self.player_count = player_count;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap interactive suspension.
    #[must_use]
    pub fn with_choice_timeout(mut self, timeout: Duration) -> Self {
        self.choice_timeout = Some(timeout);
        self
    }

    /// Keep partial mutations of failed effects instead of rolling back.
    #[must_use]
    pub fn without_rollback(mut self) -> Self {
        self.rollback_on_failure = false;
        self
    }

    /// Set the default life count.
    #[must_use]
    pub fn with_default_life(mut self, life: usize) -> Self {
        self.default_life = life;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.player_count, 2);
        assert!(config.choice_timeout.is_none());
        assert!(config.rollback_on_failure);
        assert_eq!(config.default_life, 5);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_players(3)
            .with_seed(99)
            .with_default_life(6)
            .without_rollback();

        assert_eq!(config.player_count, 3);
        assert_eq!(config.seed, 99);
        assert_eq!(config.default_life, 6);
        assert!(!config.rollback_on_failure);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"seed": 11}"#).unwrap();
        assert_eq!(config.seed, 11);
        assert_eq!(config.player_count, 2);
        assert!(config.rollback_on_failure);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = EngineConfig::new().with_choice_timeout(Duration::from_secs(3));
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
