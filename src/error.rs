use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Username already taken: {0}")]
    UsernameTaken(String),
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Quorum must be at least 1 player")]
    InvalidQuorum,
    #[error("Vote window must be longer than zero")]
    ZeroVoteWindow,
}
