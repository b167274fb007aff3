//! Posting service for journal validation.
//!
//! This module provides the business logic that runs before any journal
//! row is written. A failure here means nothing is persisted.

use rust_decimal::Decimal;
use uuid::Uuid;

use folio_shared::types::{round_money, within_tolerance};

use super::error::{Imbalance, LedgerError};
use super::types::{EntryTotals, JournalLineInput, JournalStatus};

/// Information about an account needed for validation.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Posting service for journal validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct PostingService;

impl PostingService {
    /// Rounds line amounts to money precision and validates them.
    ///
    /// Validation steps:
    /// 1. At least 2 lines
    /// 2. Every line has exactly one positive side
    /// 3. `sum(debit) == sum(credit)` within 0.01
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnbalancedEntry` describing the first violation.
    pub fn prepare(
        lines: &[JournalLineInput],
    ) -> Result<(Vec<JournalLineInput>, EntryTotals), LedgerError> {
        let rounded: Vec<JournalLineInput> = lines
            .iter()
            .map(|line| JournalLineInput {
                debit: round_money(line.debit),
                credit: round_money(line.credit),
                ..line.clone()
            })
            .collect();

        let totals = Self::validate(&rounded)?;
        Ok((rounded, totals))
    }

    /// Validates a set of journal lines.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnbalancedEntry` describing the first violation.
    pub fn validate(lines: &[JournalLineInput]) -> Result<EntryTotals, LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::UnbalancedEntry(Imbalance::TooFewLines(
                lines.len(),
            )));
        }

        for (index, line) in lines.iter().enumerate() {
            Self::validate_line(index + 1, line)?;
        }

        let totals = Self::totals(lines);
        if !within_tolerance(totals.debit, totals.credit) {
            return Err(LedgerError::UnbalancedEntry(Imbalance::Totals {
                debit: totals.debit,
                credit: totals.credit,
            }));
        }

        Ok(totals)
    }

    fn validate_line(line_number: usize, line: &JournalLineInput) -> Result<(), LedgerError> {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::UnbalancedEntry(Imbalance::NegativeAmount {
                line: line_number,
            }));
        }
        match (line.debit > Decimal::ZERO, line.credit > Decimal::ZERO) {
            (true, true) => Err(LedgerError::UnbalancedEntry(Imbalance::BothSides {
                line: line_number,
            })),
            (false, false) => Err(LedgerError::UnbalancedEntry(Imbalance::NoAmount {
                line: line_number,
            })),
            _ => Ok(()),
        }
    }

    /// Sums debits and credits.
    #[must_use]
    pub fn totals(lines: &[JournalLineInput]) -> EntryTotals {
        EntryTotals {
            debit: lines.iter().map(|l| l.debit).sum(),
            credit: lines.iter().map(|l| l.credit).sum(),
        }
    }

    /// Checks every referenced account exists and is active.
    ///
    /// # Errors
    ///
    /// Returns the lookup's error or `LedgerError::AccountInactive`.
    pub fn check_accounts<A>(lines: &[JournalLineInput], account_lookup: A) -> Result<(), LedgerError>
    where
        A: Fn(Uuid) -> Result<AccountInfo, LedgerError>,
    {
        for line in lines {
            let info = account_lookup(line.account_id)?;
            if !info.is_active {
                return Err(LedgerError::AccountInactive(info.id));
            }
        }
        Ok(())
    }

    /// Checks an entry in `status` may be reversed.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyReversed` for reversed entries and `NotPosted` for drafts.
    pub fn validate_reversible(id: Uuid, status: JournalStatus) -> Result<(), LedgerError> {
        match status {
            JournalStatus::Posted => Ok(()),
            JournalStatus::Reversed => Err(LedgerError::AlreadyReversed(id)),
            JournalStatus::Draft => Err(LedgerError::NotPosted { id, status }),
        }
    }
}
