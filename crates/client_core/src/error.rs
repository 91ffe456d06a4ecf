use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend round-trip.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend responded with status {status}")]
    Status { status: StatusCode },
    #[error("malformed backend response: {0}")]
    Malformed(String),
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundRejected {
    #[error("no active session")]
    NoSession,
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("game is not in progress")]
    NotInProgress,
    #[error("game already started")]
    AlreadyStarted,
    #[error("controller has been shut down")]
    Closed,
}
