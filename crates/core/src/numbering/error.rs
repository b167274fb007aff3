//! Numbering error types.

use thiserror::Error;
use uuid::Uuid;

use folio_shared::{ErrorKind, error::Classify};

use super::types::{AllocationStatus, EntityType};

/// Errors that can occur while allocating document numbers.
#[derive(Debug, Error)]
pub enum NumberingError {
    /// The active series for the entity type is locked.
    #[error("Number series for {0} is locked")]
    SeriesLocked(EntityType),

    /// No active series exists and auto-provisioning is disabled.
    #[error("No active number series for {0}")]
    NoActiveSeries(EntityType),

    /// Allocation log row not found.
    #[error("Number allocation not found: {0}")]
    AllocationNotFound(Uuid),

    /// Only reserved numbers can be confirmed or voided.
    #[error("Number allocation {id} is {status}, expected RESERVED")]
    AllocationNotReserved {
        /// The allocation log ID.
        id: Uuid,
        /// The status found.
        status: AllocationStatus,
    },

    /// Counter values start at 1.
    #[error("Counter value must be positive, got {0}")]
    InvalidCounter(i64),

    /// Stored entity type is not recognized.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl NumberingError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SeriesLocked(_) => "SERIES_LOCKED",
            Self::NoActiveSeries(_) => "NO_ACTIVE_SERIES",
            Self::AllocationNotFound(_) => "ALLOCATION_NOT_FOUND",
            Self::AllocationNotReserved { .. } => "ALLOCATION_NOT_RESERVED",
            Self::InvalidCounter(_) => "INVALID_COUNTER",
            Self::UnknownEntityType(_) => "UNKNOWN_ENTITY_TYPE",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl Classify for NumberingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::SeriesLocked(_) | Self::AllocationNotReserved { .. } => ErrorKind::Validation,
            Self::NoActiveSeries(_) => ErrorKind::Configuration,
            Self::AllocationNotFound(_) => ErrorKind::NotFound,
            Self::ConcurrentModification => ErrorKind::ConcurrencyConflict,
            Self::InvalidCounter(_) | Self::UnknownEntityType(_) | Self::Database(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            NumberingError::SeriesLocked(EntityType::SalesInvoice).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            NumberingError::NoActiveSeries(EntityType::Payment).kind(),
            ErrorKind::Configuration
        );
        assert!(NumberingError::ConcurrentModification.is_retryable());
        assert!(!NumberingError::Database("boom".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NumberingError::SeriesLocked(EntityType::SalesInvoice).to_string(),
            "Number series for sales_invoice is locked"
        );
        let err = NumberingError::AllocationNotReserved {
            id: Uuid::nil(),
            status: AllocationStatus::Void,
        };
        assert_eq!(
            err.to_string(),
            "Number allocation 00000000-0000-0000-0000-000000000000 is VOID, expected RESERVED"
        );
        assert_eq!(err.error_code(), "ALLOCATION_NOT_RESERVED");
    }
}
