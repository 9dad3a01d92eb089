//! Normalized error handling.
//!
//! Callers see one of two kinds: a record was not found, or the storage
//! engine failed. Driver errors are wrapped as an opaque cause so callers
//! branch on [`ErrorKind`] rather than on driver types or message text.

use thiserror::Error;

use crate::context::Interrupted;

/// Boxed underlying cause of a persistence failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error kinds callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PersistenceFailure,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found")]
    NotFound,

    /// Any storage-engine failure: connectivity, constraint violation,
    /// write conflict, cancellation or deadline expiry.
    #[error("Persistence failure")]
    Persistence(#[source] BoxError),
}

impl AppError {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns the interruption if this failure came from cancellation or a deadline
    pub fn interruption(&self) -> Option<Interrupted> {
        match self {
            AppError::Persistence(cause) => cause.downcast_ref::<Interrupted>().copied(),
            _ => None,
        }
    }
}

/// Convenience constructors
impl AppError {
    pub fn persistence(cause: impl Into<BoxError>) -> Self {
        AppError::Persistence(cause.into())
    }
}

impl From<Interrupted> for AppError {
    fn from(reason: Interrupted) -> Self {
        AppError::Persistence(Box::new(reason))
    }
}

// =============================================================================
// Database Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(_) | sea_orm::DbErr::RecordNotUpdated => {
                AppError::NotFound
            }
            other => {
                tracing::error!("Database error: {:?}", other);
                AppError::Persistence(Box::new(other))
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}
