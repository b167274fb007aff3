//! Credit exposure evaluation.

use rust_decimal::Decimal;
use serde::Serialize;

use folio_shared::types::round_money;

/// Advisory result of a credit check. Callers decide whether to block or warn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCheck {
    /// Whether `exposure + proposed` fits under the limit.
    pub allowed: bool,
    /// `max(0, limit - exposure)`; zero when the limit is unlimited.
    pub available_credit: Decimal,
    /// Unpaid invoice balances plus committed uninvoiced orders.
    pub exposure: Decimal,
    /// Human-readable summary.
    pub message: String,
}

/// Evaluates a proposed amount against a credit limit.
///
/// A limit of zero means unlimited.
#[must_use]
pub fn evaluate_credit(
    credit_limit: Decimal,
    outstanding_invoices: Decimal,
    committed_orders: Decimal,
    proposed_amount: Decimal,
) -> CreditCheck {
    let exposure = round_money(outstanding_invoices + committed_orders);

    if credit_limit.is_zero() {
        return CreditCheck {
            allowed: true,
            available_credit: Decimal::ZERO,
            exposure,
            message: "No credit limit".to_string(),
        };
    }

    let available_credit = (credit_limit - exposure).max(Decimal::ZERO);
    let projected = exposure + proposed_amount;
    let allowed = projected <= credit_limit;

    let message = if allowed {
        "Within credit limit".to_string()
    } else {
        format!("Credit limit exceeded by {}", round_money(projected - credit_limit))
    };

    CreditCheck {
        allowed,
        available_credit,
        exposure,
        message,
    }
}
