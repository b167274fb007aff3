//! Posting engine: double-entry journal posting and reversal.
//!
//! Entries are written as `posted` together with their lines in one unit of
//! work. A posted entry is corrected only by a reversing entry; the database
//! triggers reject any other change.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::ledger::{
    AccountInfo, EntryTotals, JournalLineInput, JournalMetadata, JournalStatus, LedgerError,
    PostingService, ReversalService,
};
use folio_core::numbering::EntityType;

use crate::entities::{accounts, journal_entries, journal_lines, sea_orm_active_enums};
use crate::error::FromDbErr;
use crate::repositories::sequence::SequenceAllocator;

/// A journal entry written by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedEntry {
    /// Entry ID.
    pub id: Uuid,
    /// Allocated entry number.
    pub entry_number: String,
    /// Debit and credit totals.
    pub totals: EntryTotals,
}

/// Journal entry header with its lines in line order.
#[derive(Debug, Clone)]
pub struct JournalEntryWithLines {
    /// Header.
    pub entry: journal_entries::Model,
    /// Lines ordered by line number.
    pub lines: Vec<journal_lines::Model>,
}

/// Reversal of the original.
struct Reverses<'a> {
    original_id: Uuid,
    reason: &'a str,
}

/// Posts and reverses journal entries.
#[derive(Debug, Clone)]
pub struct PostingEngine {
    db: DatabaseConnection,
    sequences: SequenceAllocator,
}

impl PostingEngine {
    /// Creates a new posting engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection, sequences: SequenceAllocator) -> Self {
        Self { db, sequences }
    }

    /// Posts an entry in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::post_in`].
    pub async fn post(
        &self,
        company_id: Uuid,
        lines: &[JournalLineInput],
        metadata: &JournalMetadata,
    ) -> Result<PostedEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(LedgerError::from_db)?;
        let posted = self.post_in(&txn, company_id, lines, metadata).await?;
        txn.commit().await.map_err(LedgerError::from_db)?;
        Ok(posted)
    }

    /// Posts an entry inside the caller's transaction.
    ///
    /// Nothing is written unless the lines balance and every account exists
    /// and is active. The entry number is drawn on a separate connection and
    /// stays `RESERVED` if the caller rolls back.
    ///
    /// # Errors
    ///
    /// - `UnbalancedEntry` if the lines violate double-entry rules
    /// - `AccountNotFound` / `AccountInactive` for bad account references
    /// - `Numbering` if no entry number can be allocated
    #[instrument(skip_all, fields(company_id = %company_id, source_type = ?metadata.source_type))]
    pub async fn post_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        lines: &[JournalLineInput],
        metadata: &JournalMetadata,
    ) -> Result<PostedEntry, LedgerError> {
        let (lines, totals) = PostingService::prepare(lines)?;

        let known = Self::load_accounts(conn, company_id, &lines).await?;
        PostingService::check_accounts(&lines, |id| {
            known.get(&id).copied().ok_or(LedgerError::AccountNotFound(id))
        })?;

        let posted = self
            .write_entry(conn, company_id, &lines, totals, metadata, None)
            .await?;

        info!(entry_id = %posted.id, entry_number = %posted.entry_number, "Journal entry posted");
        Ok(posted)
    }

    /// Returns an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist for the company.
    pub async fn get(
        &self,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        Self::get_in(&self.db, company_id, entry_id).await
    }

    /// Returns an entry with its lines using the caller's connection.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist for the company.
    pub async fn get_in<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::CompanyId.eq(company_id))
            .one(conn)
            .await
            .map_err(LedgerError::from_db)?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        let lines = Self::load_lines(conn, entry_id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Reverses a posted entry in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::reverse_in`].
    pub async fn reverse(
        &self,
        company_id: Uuid,
        entry_id: Uuid,
        reversal_date: NaiveDate,
        reason: &str,
    ) -> Result<PostedEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(LedgerError::from_db)?;
        let reversal = self
            .reverse_in(&txn, company_id, entry_id, reversal_date, reason)
            .await?;
        txn.commit().await.map_err(LedgerError::from_db)?;
        Ok(reversal)
    }

    /// Writes a reversing entry and marks the original `reversed`.
    ///
    /// The original's lines are left untouched.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist for the company
    /// - `NotPosted` / `AlreadyReversed` if the entry is not `posted`
    #[instrument(skip(self, conn, reason))]
    pub async fn reverse_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        entry_id: Uuid,
        reversal_date: NaiveDate,
        reason: &str,
    ) -> Result<PostedEntry, LedgerError> {
        let original = journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::CompanyId.eq(company_id))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(LedgerError::from_db)?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        PostingService::validate_reversible(entry_id, original.status.into())?;

        let original_lines: Vec<JournalLineInput> = Self::load_lines(conn, entry_id)
            .await?
            .into_iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
                description: line.description,
                cost_center_id: line.cost_center_id,
                party_id: line.party_id,
            })
            .collect();

        // Accounts deactivated since posting may still be reversed.
        let lines = ReversalService::reverse_lines(&original_lines);
        let totals = PostingService::validate(&lines)?;
        let metadata =
            ReversalService::metadata(entry_id, &original.entry_number, reversal_date, reason);

        let reversal = self
            .write_entry(
                conn,
                company_id,
                &lines,
                totals,
                &metadata,
                Some(Reverses {
                    original_id: entry_id,
                    reason,
                }),
            )
            .await?;

        let flipped = journal_entries::Entity::update_many()
            .set(journal_entries::ActiveModel {
                status: Set(sea_orm_active_enums::JournalStatus::Reversed),
                reversed_by: Set(Some(reversal.id)),
                reversal_reason: Set(Some(reason.to_string())),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(journal_entries::Column::Id.eq(entry_id))
            .filter(journal_entries::Column::Status.eq(sea_orm_active_enums::JournalStatus::Posted))
            .exec(conn)
            .await
            .map_err(LedgerError::from_db)?;

        if flipped.rows_affected == 0 {
            return Err(LedgerError::AlreadyReversed(entry_id));
        }

        info!(
            original_id = %entry_id,
            reversal_id = %reversal.id,
            entry_number = %reversal.entry_number,
            "Journal entry reversed"
        );
        Ok(reversal)
    }

    async fn write_entry<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        lines: &[JournalLineInput],
        totals: EntryTotals,
        metadata: &JournalMetadata,
        reverses: Option<Reverses<'_>>,
    ) -> Result<PostedEntry, LedgerError> {
        // Own transaction, so the company's entry series is not held locked
        // for the rest of the caller's unit of work.
        let number = self
            .sequences
            .allocate(company_id, EntityType::JournalEntry, metadata.entry_date)
            .await?;

        let entry_id = Uuid::now_v7();
        let now = Utc::now().into();

        journal_entries::ActiveModel {
            id: Set(entry_id),
            company_id: Set(company_id),
            entry_number: Set(number.number.clone()),
            entry_date: Set(metadata.entry_date),
            description: Set(metadata.description.clone()),
            source_type: Set(metadata.source_type.clone()),
            source_id: Set(metadata.source_id),
            total_debit: Set(totals.debit),
            total_credit: Set(totals.credit),
            status: Set(sea_orm_active_enums::JournalStatus::Posted),
            is_posted: Set(true),
            reversal_of: Set(reverses.as_ref().map(|r| r.original_id)),
            reversed_by: Set(None),
            reversal_reason: Set(reverses.as_ref().map(|r| r.reason.to_string())),
            posted_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(LedgerError::from_db)?;

        for (index, line) in lines.iter().enumerate() {
            journal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_entry_id: Set(entry_id),
                line_number: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                account_id: Set(line.account_id),
                debit: Set(line.debit),
                credit: Set(line.credit),
                description: Set(line.description.clone()),
                cost_center_id: Set(line.cost_center_id),
                party_id: Set(line.party_id),
                created_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(LedgerError::from_db)?;
        }

        SequenceAllocator::confirm_in(conn, number.allocation_id, entry_id).await?;

        Ok(PostedEntry {
            id: entry_id,
            entry_number: number.number,
            totals,
        })
    }

    async fn load_accounts<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        lines: &[JournalLineInput],
    ) -> Result<HashMap<Uuid, AccountInfo>, LedgerError> {
        let ids: HashSet<Uuid> = lines.iter().map(|line| line.account_id).collect();

        let found = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .filter(accounts::Column::Id.is_in(ids))
            .all(conn)
            .await
            .map_err(LedgerError::from_db)?;

        Ok(found
            .into_iter()
            .map(|account| {
                (
                    account.id,
                    AccountInfo {
                        id: account.id,
                        is_active: account.is_active,
                    },
                )
            })
            .collect())
    }

    async fn load_lines<C: ConnectionTrait>(
        conn: &C,
        entry_id: Uuid,
    ) -> Result<Vec<journal_lines::Model>, LedgerError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(conn)
            .await
            .map_err(LedgerError::from_db)
    }
}
