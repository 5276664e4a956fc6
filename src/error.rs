//! Error handling for the habit tracking core

use std::fmt;
use thiserror::Error;

use growth_space_ai::AiError;
use growth_space_sync::SyncError;

/// Unified error type for the habit tracking core
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or malformed; the mutation was refused
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation targeted an id that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A collaborator was unreachable or rejected the call
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A collaborator answered with content that does not parse
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A collaborator answered with no content at all
    #[error("Empty response")]
    EmptyResponse,

    /// Local persistence I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new collaborator-unavailable error
    pub fn collaborator<T: fmt::Display>(msg: T) -> Self {
        Error::CollaboratorUnavailable(msg.to_string())
    }

    /// Create a new malformed-response error
    pub fn malformed<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedResponse(msg.to_string())
    }
}

impl From<AiError> for Error {
    fn from(err: AiError) -> Self {
        match err {
            AiError::EmptyResponse => Error::EmptyResponse,
            AiError::Json(err) => Error::MalformedResponse(err.to_string()),
            other => Error::CollaboratorUnavailable(other.to_string()),
        }
    }
}

impl From<SyncError> for Error {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Json(err) => Error::MalformedResponse(err.to_string()),
            other => Error::CollaboratorUnavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
