use thiserror::Error;

use crate::Ix;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid grid dimension {0}")]
    InvalidDimension(Ix),
    #[error("A run needs at least one stage")]
    NoStages,
    #[error("A run has at most {} stages", crate::MAX_STAGES)]
    TooManyStages,
    #[error("Stage timeout must be between 1 and {} seconds", crate::MAX_STAGE_TIMEOUT_SECS)]
    InvalidTimeout,
    #[error("Unknown difficulty")]
    UnknownDifficulty,
    #[error("Run already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Failures of a score storage backend. Never surfaced past the score store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not parse run config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] GameError),
}
