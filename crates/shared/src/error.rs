//! Application-wide error types.
//!
//! Every service error in Folio maps onto one [`ErrorKind`]. Callers use the
//! kind to decide whether to retry, surface a remediation message, or report
//! a missing record.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy shared by every consistency service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected before any write (unbalanced entry, non-positive amount).
    Validation,
    /// Contention on a series, ledger row or invoice. Safe to retry.
    ConcurrencyConflict,
    /// Missing administrative setup (no number series, no GL mapping).
    Configuration,
    /// A referenced record does not exist.
    NotFound,
    /// Storage failure or broken invariant.
    Internal,
}

impl ErrorKind {
    /// Returns true if the whole operation can be retried as-is.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }
}

/// Implemented by every service error so generic code can classify it.
pub trait Classify {
    /// The taxonomy bucket of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns true if this error is retryable.
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflicting concurrent write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid administrative configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an `AppError` from any classified service error, keeping its message.
    pub fn from_classified<E>(err: &E) -> Self
    where
        E: Classify + std::fmt::Display,
    {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::ConcurrencyConflict => Self::Conflict(message),
            ErrorKind::Configuration => Self::Configuration(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }

    /// Returns the error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl Classify for AppError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::ConcurrencyConflict,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("series locked")]
    struct Locked;

    impl Classify for Locked {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Validation
        }
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(ErrorKind::ConcurrencyConflict.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::Configuration.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_from_classified_keeps_kind_and_message() {
        let err = AppError::from_classified(&Locked);
        assert!(matches!(err, AppError::Validation(ref m) if m == "series locked"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
