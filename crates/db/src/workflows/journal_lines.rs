//! Journal lines generated by business documents.
//!
//! Zero amounts are left out: a journal line always carries exactly one
//! positive side.

use rust_decimal::Decimal;
use uuid::Uuid;

use folio_core::ledger::{GlAccounts, JournalLineInput};
use folio_core::receivables::PaymentKind;
use folio_core::tax::DocumentTotals;
use folio_shared::types::round_money;

fn push_debit(lines: &mut Vec<JournalLineInput>, account_id: Uuid, amount: Decimal) {
    if amount > Decimal::ZERO {
        lines.push(JournalLineInput::debit(account_id, amount));
    }
}

fn push_credit(lines: &mut Vec<JournalLineInput>, account_id: Uuid, amount: Decimal) {
    if amount > Decimal::ZERO {
        lines.push(JournalLineInput::credit(account_id, amount));
    }
}

/// Dr receivable, Cr sales, Cr tax payable, then Dr COGS, Cr inventory.
pub(super) fn sales_invoice(
    accounts: &GlAccounts,
    party_id: Uuid,
    totals: &DocumentTotals,
    cost_of_goods: Decimal,
) -> Vec<JournalLineInput> {
    let mut lines = Vec::with_capacity(5);
    if totals.total_amount > Decimal::ZERO {
        lines.push(
            JournalLineInput::debit(accounts.receivable, totals.total_amount).with_party(party_id),
        );
    }
    push_credit(&mut lines, accounts.sales, totals.taxable_amount);
    push_credit(&mut lines, accounts.tax_payable, totals.tax_amount);

    let cost = round_money(cost_of_goods);
    push_debit(&mut lines, accounts.cogs, cost);
    push_credit(&mut lines, accounts.inventory, cost);
    lines
}

/// Dr inventory, Dr tax receivable, Cr payable.
pub(super) fn purchase_invoice(
    accounts: &GlAccounts,
    party_id: Uuid,
    totals: &DocumentTotals,
) -> Vec<JournalLineInput> {
    let mut lines = Vec::with_capacity(3);
    push_debit(&mut lines, accounts.inventory, totals.taxable_amount);
    push_debit(&mut lines, accounts.tax_receivable, totals.tax_amount);
    if totals.total_amount > Decimal::ZERO {
        lines.push(
            JournalLineInput::credit(accounts.payable, totals.total_amount).with_party(party_id),
        );
    }
    lines
}

/// Receipts: Dr cash, Cr receivable. Disbursements: Dr payable, Cr cash.
pub(super) fn payment(
    accounts: &GlAccounts,
    kind: PaymentKind,
    party_id: Uuid,
    amount: Decimal,
) -> Vec<JournalLineInput> {
    match kind {
        PaymentKind::Receipt => vec![
            JournalLineInput::debit(accounts.cash, amount),
            JournalLineInput::credit(accounts.receivable, amount).with_party(party_id),
        ],
        PaymentKind::Disbursement => vec![
            JournalLineInput::debit(accounts.payable, amount).with_party(party_id),
            JournalLineInput::credit(accounts.cash, amount),
        ],
    }
}

/// Gains debit inventory; losses credit it. The other side is the
/// inventory adjustment account.
pub(super) fn stock_adjustment(
    accounts: &GlAccounts,
    incoming: bool,
    value: Decimal,
) -> Vec<JournalLineInput> {
    let value = round_money(value);
    if incoming {
        vec![
            JournalLineInput::debit(accounts.inventory, value),
            JournalLineInput::credit(accounts.inventory_adjustment, value),
        ]
    } else {
        vec![
            JournalLineInput::debit(accounts.inventory_adjustment, value),
            JournalLineInput::credit(accounts.inventory, value),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ledger::{MappingKey, PostingService};
    use rust_decimal_macros::dec;

    fn accounts() -> GlAccounts {
        GlAccounts::from_mappings(
            MappingKey::ALL
                .into_iter()
                .enumerate()
                .map(|(i, key)| (key, Uuid::from_u128(i as u128 + 1))),
        )
        .unwrap()
    }

    fn totals(taxable: Decimal, tax: Decimal) -> DocumentTotals {
        DocumentTotals {
            taxable_amount: taxable,
            tax_amount: tax,
            total_amount: taxable + tax,
        }
    }

    #[test]
    fn test_sales_invoice_balances_with_cogs() {
        let accounts = accounts();
        let party = Uuid::from_u128(99);
        let lines = sales_invoice(&accounts, party, &totals(dec!(100), dec!(5)), dec!(60.004));

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].account_id, accounts.receivable);
        assert_eq!(lines[0].debit, dec!(105));
        assert_eq!(lines[0].party_id, Some(party));
        assert_eq!(lines[3].debit, dec!(60.00));

        let checked = PostingService::validate(&lines).unwrap();
        assert_eq!(checked.debit, dec!(165.00));
    }

    #[test]
    fn test_sales_invoice_without_tax_or_cost() {
        let lines = sales_invoice(&accounts(), Uuid::nil(), &totals(dec!(50), dec!(0)), dec!(0));
        assert_eq!(lines.len(), 2);
        assert!(PostingService::validate(&lines).is_ok());
    }

    #[test]
    fn test_purchase_invoice_balances() {
        let accounts = accounts();
        let lines = purchase_invoice(&accounts, Uuid::nil(), &totals(dec!(200), dec!(10)));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].account_id, accounts.payable);
        assert_eq!(lines[2].credit, dec!(210));
        assert!(PostingService::validate(&lines).is_ok());
    }

    #[test]
    fn test_disbursement_mirrors_receipt() {
        let accounts = accounts();
        let receipt = payment(&accounts, PaymentKind::Receipt, Uuid::nil(), dec!(75));
        let disbursement = payment(&accounts, PaymentKind::Disbursement, Uuid::nil(), dec!(75));

        assert_eq!(receipt[0].account_id, accounts.cash);
        assert_eq!(receipt[1].account_id, accounts.receivable);
        assert_eq!(disbursement[0].account_id, accounts.payable);
        assert_eq!(disbursement[1].account_id, accounts.cash);
    }

    #[test]
    fn test_stock_loss_credits_inventory() {
        let accounts = accounts();
        let lines = stock_adjustment(&accounts, false, dec!(12.345));
        assert_eq!(lines[0].account_id, accounts.inventory_adjustment);
        assert_eq!(lines[1].account_id, accounts.inventory);
        assert_eq!(lines[1].credit, dec!(12.34));
    }
}
