use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_QUORUM: usize = 4;
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_VOTE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Connected players needed before a game starts
    pub quorum: usize,
    /// How long to wait for late joins between reaching quorum and assigning roles
    pub grace_period: Duration,
    /// Length of each night and day voting window
    pub vote_window: Duration,
    /// End a voting window once every prompted player has voted
    pub early_resolve: bool,
    /// Only count werewolf ballots at night
    pub werewolf_only_night: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            quorum: DEFAULT_QUORUM,
            grace_period: DEFAULT_GRACE_PERIOD,
            vote_window: DEFAULT_VOTE_WINDOW,
            early_resolve: false,
            werewolf_only_night: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quorum == 0 {
            return Err(ConfigError::InvalidQuorum);
        }
        if self.vote_window.is_zero() {
            return Err(ConfigError::ZeroVoteWindow);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.quorum, 4);
        assert_eq!(config.grace_period, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_quorum_and_window() {
        let config = GameConfig {
            quorum: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidQuorum));

        let config = GameConfig {
            vote_window: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroVoteWindow));
    }
}
