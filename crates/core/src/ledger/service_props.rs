//! Property-based tests for PostingService and ReversalService.
//!
//! - Balanced entries are accepted, unbalanced ones rejected
//! - Reversal of a valid entry is valid and mirrors its totals

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::{Imbalance, LedgerError};
use super::reversal::ReversalService;
use super::service::PostingService;
use super::types::JournalLineInput;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Helper to build a balanced entry: several debits against one credit.
fn balanced_lines(debits: &[Decimal]) -> Vec<JournalLineInput> {
    let total: Decimal = debits.iter().sum();
    let mut lines: Vec<JournalLineInput> = debits
        .iter()
        .map(|amount| JournalLineInput::debit(Uuid::new_v4(), *amount))
        .collect();
    lines.push(JournalLineInput::credit(Uuid::new_v4(), total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of debits and a matching credit, validation SHALL succeed
    /// and the totals SHALL be equal.
    #[test]
    fn prop_balanced_entry_accepted(
        debits in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let lines = balanced_lines(&debits);
        let totals = PostingService::validate(&lines).unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// *For any* debit and credit more than one cent apart, validation SHALL
    /// fail with an imbalance of totals.
    #[test]
    fn prop_unbalanced_entry_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!((debit - credit).abs() > Decimal::new(1, 2));

        let lines = vec![
            JournalLineInput::debit(Uuid::new_v4(), debit),
            JournalLineInput::credit(Uuid::new_v4(), credit),
        ];

        let result = PostingService::validate(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry(Imbalance::Totals { .. }))),
            "Unbalanced entry should be rejected"
        );
    }

    /// *For any* valid entry, its reversal SHALL be valid, have the same line
    /// count and accounts, and swap the totals.
    #[test]
    fn prop_reversal_mirrors_entry(
        debits in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let original = balanced_lines(&debits);
        let reversed = ReversalService::reverse_lines(&original);

        prop_assert_eq!(reversed.len(), original.len());
        for (o, r) in original.iter().zip(&reversed) {
            prop_assert_eq!(o.account_id, r.account_id);
            prop_assert_eq!(o.debit, r.credit);
            prop_assert_eq!(o.credit, r.debit);
        }

        let totals = PostingService::validate(&original).unwrap();
        let reversed_totals = PostingService::validate(&reversed).unwrap();
        prop_assert_eq!(totals.debit, reversed_totals.credit);
        prop_assert_eq!(totals.credit, reversed_totals.debit);
    }

    /// *For any* valid entry, reversing twice SHALL give back the original lines.
    #[test]
    fn prop_double_reversal_is_identity(
        debits in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let original = balanced_lines(&debits);
        let twice = ReversalService::reverse_lines(&ReversalService::reverse_lines(&original));
        prop_assert_eq!(twice, original);
    }
}
