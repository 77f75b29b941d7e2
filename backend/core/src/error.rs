use thiserror::Error;

/// Top-level error type for the readerstats subsystem.
///
/// Every boundary call (local storage, remote counts, presence transport)
/// returns one of these; callers decide which neutral fallback to use.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("presence error ({channel}): {message}")]
    Presence { channel: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Parse(err.to_string())
    }
}

/// Convenience alias used across the workspace.
pub type StatsResult<T> = Result<T, StatsError>;
