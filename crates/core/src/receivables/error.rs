//! Receivables error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use folio_shared::{ErrorKind, error::Classify};

/// Errors that can occur while allocating payments or checking credit.
#[derive(Debug, Error)]
pub enum ReceivablesError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    /// Payment belongs to another party.
    #[error("Payment {payment_id} does not belong to party {party_id}")]
    PartyMismatch {
        /// Payment ID.
        payment_id: Uuid,
        /// Party the caller asked to settle.
        party_id: Uuid,
    },

    /// Requested allocation exceeds the payment's unallocated amount.
    #[error("Allocation of {requested} exceeds unallocated amount {unallocated}")]
    AllocationExceedsPayment {
        /// Amount requested.
        requested: Decimal,
        /// Amount still unallocated on the payment.
        unallocated: Decimal,
    },

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReceivablesError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::PartyMismatch { .. } => "PARTY_MISMATCH",
            Self::AllocationExceedsPayment { .. } => "ALLOCATION_EXCEEDS_PAYMENT",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl Classify for ReceivablesError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::PartyMismatch { .. }
            | Self::AllocationExceedsPayment { .. }
            | Self::NonPositiveAmount(_) => ErrorKind::Validation,
            Self::PaymentNotFound(_) | Self::InvoiceNotFound(_) | Self::PartyNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::ConcurrentModification => ErrorKind::ConcurrencyConflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}
