// Central Error Type for the Application

use thiserror::Error;

use crate::domain::DomainError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Transient store contention (lock held, snapshot stale). Safe to retry;
    /// surfaced to callers as `Conflict` once the retry budget is spent.
    #[error("Store busy: {0}")]
    Busy(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// From implementations for infra crates (to avoid circular dependency)
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Database(err)
    }
}

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by mapping driver codes onto AppError / DomainError variants

/// Coarse error classification for boundary layers
///
/// An HTTP or RPC adapter maps these onto status codes; the core only decides
/// which bucket an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidTransition,
    Validation,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(err) => match err {
                DomainError::JobNotFound(_) | DomainError::ApplicationNotFound(_) => {
                    ErrorKind::NotFound
                }
                DomainError::JobClosed(_)
                | DomainError::JobAlreadyClosed(_)
                | DomainError::DuplicateApplication { .. }
                | DomainError::SlotOverflow(_) => ErrorKind::Conflict,
                DomainError::InvalidStateTransition { .. } => ErrorKind::InvalidTransition,
            },
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Busy(_) | AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}
