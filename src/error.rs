use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("not a SQLite database: {0}")]
    InvalidFormat(String),

    #[error("database corruption detected: {0}")]
    Corruption(String),

    #[error("schema mismatch: missing {0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    HashMismatch(&'static str),

    #[error("no verification source available")]
    NoVerificationSource,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: &'static str },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Failure category as it appears in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidFormat,
    Corruption,
    SchemaMismatch,
    HashMismatch,
    NoVerificationSource,
    Io,
    Config,
}

impl VerifyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            VerifyError::InvalidFormat(_) => FailureKind::InvalidFormat,
            VerifyError::Corruption(_) => FailureKind::Corruption,
            VerifyError::SchemaMismatch(_) => FailureKind::SchemaMismatch,
            VerifyError::HashMismatch(_) => FailureKind::HashMismatch,
            VerifyError::NoVerificationSource => FailureKind::NoVerificationSource,
            // an unreadable store is an io problem from the report's point of view
            VerifyError::Io(_) | VerifyError::Malformed { .. } | VerifyError::Sqlite(_) => {
                FailureKind::Io
            }
            VerifyError::Config(_) => FailureKind::Config,
        }
    }
}
