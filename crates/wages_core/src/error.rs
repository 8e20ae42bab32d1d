use thiserror::Error;

/// Error taxonomy shared by the core, the engine and the app.
///
/// Every variant carries a human readable reason so it can be shown to the
/// user as-is and travel inside [`crate::Msg`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WageError {
    /// The backing document (or a requested record) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed JSON/CSV/spreadsheet payload or missing structural fields.
    #[error("format error: {0}")]
    Format(String),
    /// A region or rate is missing required attributes.
    #[error("validation error: {0}")]
    Validation(String),
    /// A read/write round trip to the record store failed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl WageError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
