//! Errors surfaced by the session store

use thiserror::Error;

use super::SessionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session with id {0}")]
    UnknownSession(SessionId),

    #[error("utterance is empty")]
    EmptyUtterance,
}

impl SessionError {
    /// Stable machine-readable code for IPC error responses
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::UnknownSession(_) => "unknown_session",
            SessionError::EmptyUtterance => "empty_utterance",
        }
    }
}
