use crate::models::stage::{Operation, SessionEvent, Stage};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed question {id}: {reason}")]
    MalformedQuestion { id: String, reason: String },

    #[error("Event {event} is not valid in stage {stage}")]
    InvalidTransition { stage: Stage, event: SessionEvent },

    #[error("{0} is already in progress")]
    OperationInFlight(Operation),

    #[error("Discarded {0} result: session changed while the request was in flight")]
    StaleResponse(Operation),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Whether the same request can be sent again without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
