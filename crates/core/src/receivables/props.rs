//! Property-based tests for FIFO allocation and credit evaluation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::allocation::plan_fifo;
use super::credit::evaluate_credit;
use super::types::{InvoiceStatus, OpenInvoice};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn open_invoice() -> impl Strategy<Value = OpenInvoice> {
    (0u32..365, positive_amount(), 0i64..=100i64, any::<u32>()).prop_map(
        |(day, total, paid_percent, number)| OpenInvoice {
            id: Uuid::new_v4(),
            number: format!("INV-{number:010}"),
            invoice_date: NaiveDate::from_yo_opt(2024, day + 1).unwrap(),
            total_amount: total,
            paid_amount: (total * Decimal::from(paid_percent) / Decimal::ONE_HUNDRED).round_dp(2),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* payment and invoices, the allocated total SHALL equal
    /// `min(payment, sum of balances)` and allocated + unallocated SHALL equal
    /// the payment.
    #[test]
    fn prop_allocation_conserves_amount(
        amount in positive_amount(),
        invoices in prop::collection::vec(open_invoice(), 0..12),
    ) {
        let plan = plan_fifo(amount, &invoices).unwrap();
        let open: Decimal = invoices.iter().map(OpenInvoice::balance).sum();
        let sum: Decimal = plan.allocations.iter().map(|a| a.amount).sum();

        prop_assert_eq!(sum, plan.allocated);
        prop_assert_eq!(plan.allocated, amount.min(open));
        prop_assert_eq!(plan.allocated + plan.unallocated, amount);
    }

    /// *For any* plan, each allocation SHALL be positive, never exceed the
    /// invoice balance, and keep `balance == total - paid`.
    #[test]
    fn prop_allocation_respects_invoice_balances(
        amount in positive_amount(),
        invoices in prop::collection::vec(open_invoice(), 1..12),
    ) {
        let plan = plan_fifo(amount, &invoices).unwrap();
        for allocation in &plan.allocations {
            let invoice = invoices.iter().find(|i| i.id == allocation.invoice_id).unwrap();
            prop_assert!(allocation.amount > Decimal::ZERO);
            prop_assert!(allocation.amount <= invoice.balance());
            prop_assert_eq!(allocation.new_balance, invoice.total_amount - allocation.new_paid);
        }
    }

    /// *For any* plan, only the last allocation MAY leave a partial invoice.
    #[test]
    fn prop_only_last_allocation_partial(
        amount in positive_amount(),
        invoices in prop::collection::vec(open_invoice(), 1..12),
    ) {
        let plan = plan_fifo(amount, &invoices).unwrap();
        if let Some((_, earlier)) = plan.allocations.split_last() {
            for allocation in earlier {
                prop_assert_eq!(allocation.new_status, InvoiceStatus::Completed);
            }
        }
    }

    /// *For any* positive limit, available credit SHALL be non-negative and
    /// `allowed` SHALL match `exposure + proposed <= limit`.
    #[test]
    fn prop_credit_check_consistent(
        limit in positive_amount(),
        outstanding in positive_amount(),
        committed in positive_amount(),
        proposed in positive_amount(),
    ) {
        let check = evaluate_credit(limit, outstanding, committed, proposed);
        prop_assert!(check.available_credit >= Decimal::ZERO);
        prop_assert_eq!(check.allowed, outstanding + committed + proposed <= limit);
    }
}
