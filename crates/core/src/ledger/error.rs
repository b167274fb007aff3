//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during posting and
//! reversal, including validation errors, account errors and journal state
//! errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use folio_shared::{ErrorKind, error::Classify};

use super::accounts::MappingKey;
use super::types::JournalStatus;
use crate::numbering::NumberingError;

/// Why a set of journal lines cannot be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imbalance {
    /// Fewer than two lines.
    TooFewLines(usize),
    /// Line carries both a debit and a credit.
    BothSides {
        /// 1-based line number.
        line: usize,
    },
    /// Line carries neither a debit nor a credit.
    NoAmount {
        /// 1-based line number.
        line: usize,
    },
    /// Line carries a negative amount.
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },
    /// Debit and credit totals differ by more than the tolerance.
    Totals {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },
}

impl std::fmt::Display for Imbalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewLines(count) => write!(f, "entry needs at least 2 lines, got {count}"),
            Self::BothSides { line } => write!(f, "line {line} has both debit and credit"),
            Self::NoAmount { line } => write!(f, "line {line} has neither debit nor credit"),
            Self::NegativeAmount { line } => write!(f, "line {line} has a negative amount"),
            Self::Totals { debit, credit } => write!(f, "debit {debit} != credit {credit}"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Lines fail the double-entry rules. Nothing is persisted.
    #[error("Unbalanced entry: {0}")]
    UnbalancedEntry(Imbalance),

    // ========== Account Errors ==========
    /// Account not found for the company.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// No GL account mapped for a default key.
    #[error("Missing GL account mapping: {0}")]
    MissingAccountMapping(MappingKey),

    // ========== Journal State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Only posted entries can be reversed.
    #[error("Journal entry {id} is {status}, only posted entries can be reversed")]
    NotPosted {
        /// Entry ID.
        id: Uuid,
        /// Current status.
        status: JournalStatus,
    },

    /// Entry was already reversed.
    #[error("Journal entry {0} is already reversed")]
    AlreadyReversed(Uuid),

    /// Entry number could not be allocated.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnbalancedEntry(_) => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::MissingAccountMapping(_) => "MISSING_ACCOUNT_MAPPING",
            Self::EntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
            Self::NotPosted { .. } => "JOURNAL_ENTRY_NOT_POSTED",
            Self::AlreadyReversed(_) => "JOURNAL_ENTRY_ALREADY_REVERSED",
            Self::Numbering(err) => err.error_code(),
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnbalancedEntry(_)
            | Self::AccountInactive(_)
            | Self::NotPosted { .. }
            | Self::AlreadyReversed(_) => ErrorKind::Validation,
            Self::MissingAccountMapping(_) => ErrorKind::Configuration,
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::Numbering(err) => err.kind(),
            Self::ConcurrentModification => ErrorKind::ConcurrencyConflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::UnbalancedEntry(Imbalance::TooFewLines(1)).error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::MissingAccountMapping(MappingKey::DefaultCogs).error_code(),
            "MISSING_ACCOUNT_MAPPING"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            LedgerError::UnbalancedEntry(Imbalance::NoAmount { line: 1 }).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::MissingAccountMapping(MappingKey::DefaultSales).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            LedgerError::EntryNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::AlreadyReversed(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_numbering_errors_keep_their_kind() {
        use crate::numbering::EntityType;

        let err = LedgerError::from(NumberingError::NoActiveSeries(EntityType::JournalEntry));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.error_code(), "NO_ACTIVE_SERIES");
        assert!(LedgerError::from(NumberingError::ConcurrentModification).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry(Imbalance::Totals {
            debit: dec!(100.00),
            credit: dec!(50.00),
        });
        assert_eq!(err.to_string(), "Unbalanced entry: debit 100.00 != credit 50.00");

        let err = LedgerError::MissingAccountMapping(MappingKey::DefaultReceivable);
        assert_eq!(
            err.to_string(),
            "Missing GL account mapping: DEFAULT_RECEIVABLE"
        );
    }
}
