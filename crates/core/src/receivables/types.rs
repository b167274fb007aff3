//! Invoice, payment and order types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice lifecycle.
///
/// `draft -> issued | partial -> completed`, or `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Not yet issued.
    Draft,
    /// Issued, nothing paid.
    Issued,
    /// Partly paid.
    Partial,
    /// Fully paid.
    Completed,
    /// Cancelled.
    Cancelled,
}

impl InvoiceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Issued,
        Self::Partial,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Status after a payment leaves `balance` outstanding.
    #[must_use]
    pub fn after_payment(balance: Decimal) -> Self {
        if balance <= Decimal::ZERO {
            Self::Completed
        } else {
            Self::Partial
        }
    }

    /// Returns true if the invoice can receive payments.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Issued | Self::Partial)
    }

    /// Statuses that can receive payments.
    pub fn open() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(Self::is_open)
    }
}

/// Sales or purchase invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// Customer invoice (receivable).
    Sales,
    /// Supplier invoice (payable).
    Purchase,
}

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// Money received from a customer.
    Receipt,
    /// Money paid to a supplier.
    Disbursement,
}

impl PaymentKind {
    /// Kind of invoice this payment settles.
    #[must_use]
    pub const fn settles(self) -> InvoiceKind {
        match self {
            Self::Receipt => InvoiceKind::Sales,
            Self::Disbursement => InvoiceKind::Purchase,
        }
    }
}

/// Sales order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Being entered.
    Draft,
    /// Confirmed with the customer.
    Confirmed,
    /// Billed; its amount now lives on an invoice.
    Invoiced,
    /// Delivered and closed.
    Completed,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Confirmed,
        Self::Invoiced,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns true if the order is a commitment not yet invoiced.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Draft | Self::Confirmed)
    }

    /// Statuses that count towards credit exposure.
    pub fn committed() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(Self::is_committed)
    }
}

/// An invoice with an outstanding balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenInvoice {
    /// Invoice ID.
    pub id: Uuid,
    /// Document number, used to break date ties.
    pub number: String,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
}

impl OpenInvoice {
    /// Outstanding balance, `total - paid`.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_after_payment() {
        assert_eq!(InvoiceStatus::after_payment(dec!(0)), InvoiceStatus::Completed);
        assert_eq!(InvoiceStatus::after_payment(dec!(-0.01)), InvoiceStatus::Completed);
        assert_eq!(InvoiceStatus::after_payment(dec!(30)), InvoiceStatus::Partial);
    }

    #[test]
    fn test_open_statuses() {
        assert!(InvoiceStatus::Issued.is_open());
        assert!(InvoiceStatus::Partial.is_open());
        assert!(!InvoiceStatus::Draft.is_open());
        assert!(!InvoiceStatus::Completed.is_open());
        assert!(!InvoiceStatus::Cancelled.is_open());
        assert_eq!(
            InvoiceStatus::open().collect::<Vec<_>>(),
            [InvoiceStatus::Issued, InvoiceStatus::Partial]
        );
    }

    #[test]
    fn test_payment_settles() {
        assert_eq!(PaymentKind::Receipt.settles(), InvoiceKind::Sales);
        assert_eq!(PaymentKind::Disbursement.settles(), InvoiceKind::Purchase);
    }

    #[test]
    fn test_committed_orders() {
        assert!(OrderStatus::Confirmed.is_committed());
        assert!(!OrderStatus::Invoiced.is_committed());
        assert!(!OrderStatus::Cancelled.is_committed());
        assert!(!OrderStatus::Completed.is_committed());
        assert_eq!(
            OrderStatus::committed().collect::<Vec<_>>(),
            [OrderStatus::Draft, OrderStatus::Confirmed]
        );
    }
}
