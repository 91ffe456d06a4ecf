use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnswerError {
    #[error("unknown answer '{0}', expected yes, no or unsure")]
    Unknown(String),
}
