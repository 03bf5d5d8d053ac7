//! Error types for Haven Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Business category of this error, or `None` for infrastructure failures
    pub fn rejection(&self) -> Option<RejectionKind> {
        match self {
            Error::NotFound(_) => Some(RejectionKind::NotFound),
            Error::Conflict(_) => Some(RejectionKind::Conflict),
            Error::Validation(_) => Some(RejectionKind::Validation),
            _ => None,
        }
    }

    /// Split a business failure into its kind and user-facing message.
    /// Anything else is handed back unchanged.
    pub fn into_rejection(self) -> std::result::Result<(RejectionKind, String), Error> {
        match self {
            Error::NotFound(message) => Ok((RejectionKind::NotFound, message)),
            Error::Conflict(message) => Ok((RejectionKind::Conflict, message)),
            Error::Validation(message) => Ok((RejectionKind::Validation, message)),
            other => Err(other),
        }
    }

    /// True for failures the caller cannot fix by changing its request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Io(_) | Error::Serialization(_) | Error::Toml(_)
        )
    }
}

/// Why an expected business rule blocked an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionKind {
    /// Referenced booking, room or payment does not exist
    NotFound,
    /// State does not allow the transition
    Conflict,
    /// Malformed input
    Validation,
}

pub type Result<T> = std::result::Result<T, Error>;
