//! Receivables and payables settlement.
//!
//! This module implements:
//! - Invoice, payment and order status rules
//! - FIFO allocation planning of a payment across open invoices
//! - Credit exposure evaluation against a party's credit limit

pub mod allocation;
pub mod credit;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use allocation::{AllocationPlan, PlannedAllocation, plan_fifo};
pub use credit::{CreditCheck, evaluate_credit};
pub use error::ReceivablesError;
pub use types::{InvoiceKind, InvoiceStatus, OpenInvoice, OrderStatus, PaymentKind};
