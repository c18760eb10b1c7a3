// src/domain/error.rs
use thiserror::Error;

pub const DEFAULT_SERVER_MESSAGE: &str = "An error occurred";
pub const DEFAULT_UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The server answered with an error status
    #[error("{message}")]
    Api { status: u16, message: String },
    /// The request went out but no response came back
    #[error("Network error. Please check your connection.")]
    Network,
    #[error("{0}")]
    Unexpected(String),
    #[error("Note not found: {0}")]
    NoteNotFound(i64),
    #[error("Please add a title or content to save the note.")]
    EmptyNote,
    #[error("Not logged in. Run `notesync login` first.")]
    NotAuthenticated,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Build an `Unexpected` error, falling back to the generic message
    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            DomainError::Unexpected(DEFAULT_UNEXPECTED_MESSAGE.to_string())
        } else {
            DomainError::Unexpected(message)
        }
    }
}
