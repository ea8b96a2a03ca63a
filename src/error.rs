use thiserror::Error;

/// Coarse classification of a failed suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Encode,
    Transport,
    Parse,
}

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Failed to encode completion request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Completion request failed: {0}")]
    Transport(String),

    #[error("Failed to decode completion envelope (status {status}): {source}")]
    Envelope {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Completion envelope contained no choices")]
    NoChoices,

    #[error("Failed to decode suggestions from model output: {0}")]
    Content(#[source] serde_json::Error),
}

impl SuggestionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SuggestionError::Encode(_) => FailureKind::Encode,
            SuggestionError::Transport(_) => FailureKind::Transport,
            SuggestionError::Envelope { .. }
            | SuggestionError::NoChoices
            | SuggestionError::Content(_) => FailureKind::Parse,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Calendar access denied")]
    AccessDenied,

    #[error("Calendar store is not initialized")]
    Uninitialized,

    #[error("No default calendar for new events")]
    NoDefaultCalendar,

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Access request failed: {0}")]
    Authorization(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
