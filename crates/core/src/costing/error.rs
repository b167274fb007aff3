//! Costing error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use folio_shared::{ErrorKind, error::Classify};

/// Errors that can occur while recording stock movements.
#[derive(Debug, Error)]
pub enum CostingError {
    /// Movement quantity must be positive; direction comes from the type.
    #[error("Movement quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Incoming movement without a cost and without a master cost price.
    #[error("No unit cost available for item {0}")]
    MissingUnitCost(Uuid),

    /// Item not found in master data.
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    /// No ledger row exists for the item in the warehouse.
    #[error("No stock ledger for item {item_id} in warehouse {warehouse_id}")]
    LedgerNotFound {
        /// Warehouse ID.
        warehouse_id: Uuid,
        /// Item ID.
        item_id: Uuid,
    },

    /// Outgoing movement exceeds on-hand quantity while negative stock is disallowed.
    #[error("Insufficient stock: requested {requested}, on hand {on_hand}")]
    InsufficientStock {
        /// Quantity requested.
        requested: Decimal,
        /// Quantity on hand.
        on_hand: Decimal,
    },

    /// Reservation exceeds available quantity.
    #[error("Insufficient available quantity: requested {requested}, available {available}")]
    InsufficientAvailable {
        /// Quantity requested.
        requested: Decimal,
        /// Quantity available.
        available: Decimal,
    },

    /// Transfer source and destination are the same warehouse.
    #[error("Cannot transfer stock to the same warehouse")]
    SameWarehouseTransfer,

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CostingError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::MissingUnitCost(_) => "MISSING_UNIT_COST",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::LedgerNotFound { .. } => "STOCK_LEDGER_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InsufficientAvailable { .. } => "INSUFFICIENT_AVAILABLE",
            Self::SameWarehouseTransfer => "SAME_WAREHOUSE_TRANSFER",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl Classify for CostingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveQuantity(_)
            | Self::NegativeUnitCost(_)
            | Self::InsufficientStock { .. }
            | Self::InsufficientAvailable { .. }
            | Self::SameWarehouseTransfer => ErrorKind::Validation,
            Self::MissingUnitCost(_) => ErrorKind::Configuration,
            Self::ItemNotFound(_) | Self::LedgerNotFound { .. } => ErrorKind::NotFound,
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
    fn test_kinds() {
        assert_eq!(
            CostingError::NonPositiveQuantity(dec!(0)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CostingError::ItemNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert!(CostingError::ConcurrentModification.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = CostingError::InsufficientStock {
            requested: dec!(5),
            on_hand: dec!(2),
        };
        assert_eq!(err.to_string(), "Insufficient stock: requested 5, on hand 2");
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");
    }
}
