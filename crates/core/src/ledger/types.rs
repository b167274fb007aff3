//! Ledger domain types for journal posting.
//!
//! This module defines the core types used for creating and validating
//! journal entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Journal entry status.
///
/// Entries are written as `Posted`; a reversal flips the original to
/// `Reversed`. `Draft` exists for entries staged outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Being drafted, not yet affecting balances.
    Draft,
    /// Posted to the ledger (immutable).
    Posted,
    /// Posted, then cancelled by a reversal entry (immutable).
    Reversed,
}

impl std::fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        })
    }
}

/// One leg of a journal entry.
///
/// Exactly one of `debit` and `credit` must be positive; the other is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Optional cost center.
    pub cost_center_id: Option<Uuid>,
    /// Optional customer or supplier.
    pub party_id: Option<Uuid>,
}

impl JournalLineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            cost_center_id: None,
            party_id: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            cost_center_id: None,
            party_id: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the party reference.
    #[must_use]
    pub fn with_party(mut self, party_id: Uuid) -> Self {
        self.party_id = Some(party_id);
        self
    }
}

/// Header data for a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalMetadata {
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Kind of originating document, e.g. `sales_invoice`.
    pub source_type: Option<String>,
    /// ID of the originating document.
    pub source_id: Option<Uuid>,
}

impl JournalMetadata {
    /// Metadata for a manual entry with no originating document.
    #[must_use]
    pub fn manual(entry_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            entry_date,
            description: description.into(),
            source_type: None,
            source_id: None,
        }
    }

    /// Metadata for an entry generated by a business document.
    #[must_use]
    pub fn from_source(
        entry_date: NaiveDate,
        description: impl Into<String>,
        source_type: impl Into<String>,
        source_id: Uuid,
    ) -> Self {
        Self {
            entry_date,
            description: description.into(),
            source_type: Some(source_type.into()),
            source_id: Some(source_id),
        }
    }
}

/// Validated entry totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}
