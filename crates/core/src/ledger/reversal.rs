//! Reversal service for cancelling posted journal entries.
//!
//! A posted entry is never mutated. It is cancelled by a new entry whose
//! lines swap debit and credit, referencing the original.

use chrono::NaiveDate;
use uuid::Uuid;

use super::types::{JournalLineInput, JournalMetadata};

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Create reversing lines by swapping debits and credits.
    ///
    /// Account, description, cost center and party are preserved, and line
    /// order is kept so line `n` of the reversal mirrors line `n` of the
    /// original.
    #[must_use]
    pub fn reverse_lines(original: &[JournalLineInput]) -> Vec<JournalLineInput> {
        original
            .iter()
            .map(|line| JournalLineInput {
                debit: line.credit,
                credit: line.debit,
                ..line.clone()
            })
            .collect()
    }

    /// Header metadata for the reversing entry.
    #[must_use]
    pub fn metadata(
        original_id: Uuid,
        original_number: &str,
        reversal_date: NaiveDate,
        reason: &str,
    ) -> JournalMetadata {
        JournalMetadata::from_source(
            reversal_date,
            format!("Reversal of {original_number}. Reason: {reason}"),
            "journal_reversal",
            original_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::service::PostingService;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reversal_swaps_sides() {
        let cash = Uuid::from_u128(1);
        let revenue = Uuid::from_u128(2);
        let original = vec![
            JournalLineInput::debit(cash, dec!(100)).with_description("Cash"),
            JournalLineInput::credit(revenue, dec!(100)).with_description("Revenue"),
        ];

        let reversed = ReversalService::reverse_lines(&original);

        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].account_id, cash);
        assert_eq!(reversed[0].debit, Decimal::ZERO);
        assert_eq!(reversed[0].credit, dec!(100));
        assert_eq!(reversed[0].description.as_deref(), Some("Cash"));
        assert_eq!(reversed[1].account_id, revenue);
        assert_eq!(reversed[1].debit, dec!(100));
        assert_eq!(reversed[1].credit, Decimal::ZERO);

        // Original untouched.
        assert_eq!(original[0].debit, dec!(100));
    }

    #[test]
    fn test_reversal_of_valid_entry_is_valid() {
        let original = vec![
            JournalLineInput::debit(Uuid::from_u128(1), dec!(60)),
            JournalLineInput::debit(Uuid::from_u128(2), dec!(40)),
            JournalLineInput::credit(Uuid::from_u128(3), dec!(100)),
        ];
        let totals = PostingService::validate(&original).unwrap();
        let reversed_totals =
            PostingService::validate(&ReversalService::reverse_lines(&original)).unwrap();
        assert_eq!(reversed_totals.debit, totals.credit);
        assert_eq!(reversed_totals.credit, totals.debit);
    }

    #[test]
    fn test_metadata_references_original() {
        let original_id = Uuid::from_u128(7);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let meta = ReversalService::metadata(original_id, "JE-2024-00001", date, "duplicate");
        assert_eq!(meta.entry_date, date);
        assert_eq!(meta.source_id, Some(original_id));
        assert_eq!(
            meta.description,
            "Reversal of JE-2024-00001. Reason: duplicate"
        );
    }
}
