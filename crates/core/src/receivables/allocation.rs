//! FIFO payment allocation.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReceivablesError;
use super::types::{InvoiceStatus, OpenInvoice};

/// One planned invoice settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAllocation {
    /// Invoice being settled.
    pub invoice_id: Uuid,
    /// Amount applied to the invoice.
    pub amount: Decimal,
    /// Paid amount after the allocation.
    pub new_paid: Decimal,
    /// Balance after the allocation, `total - new_paid`.
    pub new_balance: Decimal,
    /// Status after the allocation.
    pub new_status: InvoiceStatus,
}

/// Outcome of planning one payment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocationPlan {
    /// Settlements in application order.
    pub allocations: Vec<PlannedAllocation>,
    /// Sum of `allocations`.
    pub allocated: Decimal,
    /// Part of the payment left over.
    pub unallocated: Decimal,
}

/// Plans how `amount` settles `invoices`, oldest first.
///
/// Invoices are ordered by date, then number. Each receives
/// `min(remaining, balance)`; invoices with nothing to allocate are skipped,
/// and planning stops once the payment is exhausted.
///
/// # Errors
///
/// Returns `ReceivablesError::NonPositiveAmount` if `amount <= 0`.
pub fn plan_fifo(
    amount: Decimal,
    invoices: &[OpenInvoice],
) -> Result<AllocationPlan, ReceivablesError> {
    if amount <= Decimal::ZERO {
        return Err(ReceivablesError::NonPositiveAmount(amount));
    }

    let mut ordered: Vec<&OpenInvoice> = invoices.iter().collect();
    ordered.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.number.cmp(&b.number))
    });

    let mut remaining = amount;
    let mut allocations = Vec::new();

    for invoice in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }

        let applied = remaining.min(invoice.balance());
        if applied <= Decimal::ZERO {
            continue;
        }

        let new_paid = invoice.paid_amount + applied;
        let new_balance = invoice.total_amount - new_paid;
        allocations.push(PlannedAllocation {
            invoice_id: invoice.id,
            amount: applied,
            new_paid,
            new_balance,
            new_status: InvoiceStatus::after_payment(new_balance),
        });
        remaining -= applied;
    }

    Ok(AllocationPlan {
        allocations,
        allocated: amount - remaining,
        unallocated: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(n: u128, number: &str, date: (i32, u32, u32), total: Decimal) -> OpenInvoice {
        OpenInvoice {
            id: Uuid::from_u128(n),
            number: number.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            total_amount: total,
            paid_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_oldest_invoice_settled_first() {
        // Passed newest first to prove the plan sorts.
        let invoices = vec![
            invoice(2, "INV-2024-00002", (2024, 2, 1), dec!(50)),
            invoice(1, "INV-2024-00001", (2024, 1, 1), dec!(100)),
        ];

        let plan = plan_fifo(dec!(120), &invoices).unwrap();

        assert_eq!(plan.allocations.len(), 2);
        let january = &plan.allocations[0];
        assert_eq!(january.invoice_id, Uuid::from_u128(1));
        assert_eq!(january.amount, dec!(100));
        assert_eq!(january.new_balance, dec!(0));
        assert_eq!(january.new_status, InvoiceStatus::Completed);

        let february = &plan.allocations[1];
        assert_eq!(february.invoice_id, Uuid::from_u128(2));
        assert_eq!(february.amount, dec!(20));
        assert_eq!(february.new_balance, dec!(30));
        assert_eq!(february.new_status, InvoiceStatus::Partial);

        assert_eq!(plan.allocated, dec!(120));
        assert_eq!(plan.unallocated, dec!(0));
    }

    #[test]
    fn test_same_date_ordered_by_number() {
        let invoices = vec![
            invoice(2, "INV-00002", (2024, 1, 1), dec!(10)),
            invoice(1, "INV-00001", (2024, 1, 1), dec!(10)),
        ];
        let plan = plan_fifo(dec!(5), &invoices).unwrap();
        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].invoice_id, Uuid::from_u128(1));
    }

    #[test]
    fn test_overpayment_leaves_unallocated() {
        let invoices = vec![invoice(1, "INV-00001", (2024, 1, 1), dec!(40))];
        let plan = plan_fifo(dec!(100), &invoices).unwrap();
        assert_eq!(plan.allocated, dec!(40));
        assert_eq!(plan.unallocated, dec!(60));
    }

    #[test]
    fn test_settled_invoices_skipped() {
        let mut paid = invoice(1, "INV-00001", (2024, 1, 1), dec!(40));
        paid.paid_amount = dec!(40);
        let open = invoice(2, "INV-00002", (2024, 1, 2), dec!(40));

        let plan = plan_fifo(dec!(10), &[paid, open]).unwrap();
        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].invoice_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_partially_paid_invoice() {
        let mut partial = invoice(1, "INV-00001", (2024, 1, 1), dec!(100));
        partial.paid_amount = dec!(70);
        let plan = plan_fifo(dec!(50), &[partial]).unwrap();
        assert_eq!(plan.allocations[0].amount, dec!(30));
        assert_eq!(plan.allocations[0].new_paid, dec!(100));
        assert_eq!(plan.allocations[0].new_status, InvoiceStatus::Completed);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(matches!(
            plan_fifo(dec!(0), &[]),
            Err(ReceivablesError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_no_invoices() {
        let plan = plan_fifo(dec!(25), &[]).unwrap();
        assert!(plan.allocations.is_empty());
        assert_eq!(plan.unallocated, dec!(25));
    }
}
