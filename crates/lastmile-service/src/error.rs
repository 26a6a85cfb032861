//! # Service Error Types
//!
//! The error surface callers of the service layer see. Validation and
//! database errors pass through transparently; they already carry the
//! message the caller needs.

use thiserror::Error;

use lastmile_core::ValidationError;
use lastmile_db::DbError;

/// Service layer errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence failure (includes not-found).
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(DbError::from(err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Db(DbError::Serialization(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
