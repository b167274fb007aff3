//! Workflow error type.

use thiserror::Error;

use folio_core::costing::CostingError;
use folio_core::ledger::LedgerError;
use folio_core::numbering::NumberingError;
use folio_core::receivables::ReceivablesError;
use folio_core::tax::TaxError;
use folio_shared::{AppError, ErrorKind, error::Classify};

use crate::error::FromDbErr;

/// Errors raised while posting a business document.
///
/// Service errors pass through unchanged so their kind and code survive.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The document has no lines.
    #[error("Document must have at least one line")]
    EmptyDocument,

    /// A stock adjustment with zero quantity.
    #[error("Adjustment quantity cannot be zero")]
    ZeroAdjustment,

    /// Tax split failed.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Number allocation failed.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// Stock movement failed.
    #[error(transparent)]
    Costing(#[from] CostingError),

    /// Journal posting or account resolution failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Party lookup, payment or allocation failed.
    #[error(transparent)]
    Receivables(#[from] ReceivablesError),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",
            Self::Tax(err) => err.error_code(),
            Self::Numbering(err) => err.error_code(),
            Self::Costing(err) => err.error_code(),
            Self::Ledger(err) => err.error_code(),
            Self::Receivables(err) => err.error_code(),
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl Classify for WorkflowError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDocument | Self::ZeroAdjustment | Self::Tax(_) => ErrorKind::Validation,
            Self::Numbering(err) => err.kind(),
            Self::Costing(err) => err.kind(),
            Self::Ledger(err) => err.kind(),
            Self::Receivables(err) => err.kind(),
            Self::ConcurrentModification => ErrorKind::ConcurrencyConflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl FromDbErr for WorkflowError {
    fn concurrent() -> Self {
        Self::ConcurrentModification
    }

    fn database(message: String) -> Self {
        Self::Database(message)
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        Self::from_classified(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_wrapped_errors_keep_kind_and_code() {
        let locked = WorkflowError::from(NumberingError::SeriesLocked(
            folio_core::numbering::EntityType::SalesInvoice,
        ));
        assert_eq!(locked.kind(), ErrorKind::Validation);
        assert_eq!(locked.error_code(), "SERIES_LOCKED");

        let missing = WorkflowError::from(LedgerError::MissingAccountMapping(
            folio_core::ledger::MappingKey::DefaultCogs,
        ));
        assert_eq!(missing.kind(), ErrorKind::Configuration);

        let party = WorkflowError::from(ReceivablesError::PartyNotFound(Uuid::nil()));
        assert_eq!(party.kind(), ErrorKind::NotFound);

        let tax = WorkflowError::from(TaxError::NegativeRate(dec!(-1)));
        assert_eq!(tax.error_code(), "NEGATIVE_TAX_RATE");
    }

    #[test]
    fn test_nested_conflicts_are_retryable() {
        assert!(WorkflowError::from(CostingError::ConcurrentModification).is_retryable());
        assert!(WorkflowError::from(ReceivablesError::ConcurrentModification).is_retryable());
        assert!(!WorkflowError::EmptyDocument.is_retryable());
    }

    #[test]
    fn test_converts_to_app_error() {
        let app: AppError = WorkflowError::ZeroAdjustment.into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");
    }
}
