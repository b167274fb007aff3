//! Payment receipt and disbursement.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::ledger::JournalMetadata;
use folio_core::numbering::EntityType;
use folio_core::receivables::{PaymentKind, ReceivablesError};
use folio_shared::types::round_money;

use super::{DocumentWorkflows, WorkflowError, find_party, journal_lines};
use crate::entities::payments;
use crate::error::FromDbErr;
use crate::repositories::{AccountResolver, AllocationOutcome, PaymentAllocator, SequenceAllocator};
use crate::retry::with_retry;

/// A payment to record and allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentInput {
    /// Company.
    pub company_id: Uuid,
    /// Customer paying or supplier being paid.
    pub party_id: Uuid,
    /// Receipt or disbursement.
    pub kind: PaymentKind,
    /// Payment date, also used as the allocation date.
    pub payment_date: NaiveDate,
    /// Amount, positive.
    pub amount: Decimal,
}

/// A recorded payment with its allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedPayment {
    /// Payment ID.
    pub payment_id: Uuid,
    /// Allocated document number.
    pub payment_number: String,
    /// Journal entry recording the cash movement.
    pub journal_entry_id: Uuid,
    /// Invoices settled by the payment.
    pub allocation: AllocationOutcome,
}

impl DocumentWorkflows {
    /// Records a payment, posts it and settles open invoices oldest first.
    ///
    /// Any amount left after all open invoices are settled stays
    /// unallocated on the payment.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; nothing is persisted.
    #[instrument(skip_all, fields(company_id = %input.company_id, party_id = %input.party_id))]
    pub async fn receive_payment(
        &self,
        input: &PaymentInput,
    ) -> Result<ReceivedPayment, WorkflowError> {
        with_retry(self.retry.max_attempts, "receive_payment", move || async move {
            let txn = self.db.begin().await.map_err(WorkflowError::from_db)?;
            let received = self.receive_payment_in(&txn, input).await?;
            txn.commit().await.map_err(WorkflowError::from_db)?;
            Ok(received)
        })
        .await
    }

    async fn receive_payment_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: &PaymentInput,
    ) -> Result<ReceivedPayment, WorkflowError> {
        let amount = round_money(input.amount);
        if amount <= Decimal::ZERO {
            return Err(ReceivablesError::NonPositiveAmount(input.amount).into());
        }

        find_party(conn, input.company_id, input.party_id).await?;
        let accounts = AccountResolver::resolve_in(conn, input.company_id).await?;
        let number = self
            .sequences
            .allocate(input.company_id, EntityType::Payment, input.payment_date)
            .await?;

        let payment_id = Uuid::now_v7();
        let lines = journal_lines::payment(&accounts, input.kind, input.party_id, amount);
        let metadata = JournalMetadata::from_source(
            input.payment_date,
            format!("Payment {}", number.number),
            "payment",
            payment_id,
        );
        let entry = self
            .posting
            .post_in(conn, input.company_id, &lines, &metadata)
            .await?;

        let now = Utc::now();
        payments::ActiveModel {
            id: Set(payment_id),
            company_id: Set(input.company_id),
            payment_number: Set(number.number.clone()),
            kind: Set(input.kind.into()),
            party_id: Set(input.party_id),
            payment_date: Set(input.payment_date),
            amount: Set(amount),
            allocated_amount: Set(Decimal::ZERO),
            unallocated_amount: Set(amount),
            journal_entry_id: Set(Some(entry.id)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await
        .map_err(WorkflowError::from_db)?;

        let allocation = PaymentAllocator::allocate_in(
            conn,
            input.company_id,
            payment_id,
            input.party_id,
            amount,
            input.payment_date,
        )
        .await?;

        SequenceAllocator::confirm_in(conn, number.allocation_id, payment_id).await?;

        info!(
            payment_id = %payment_id,
            payment_number = %number.number,
            invoices = allocation.allocations.len(),
            "Payment recorded"
        );

        Ok(ReceivedPayment {
            payment_id,
            payment_number: number.number,
            journal_entry_id: entry.id,
            allocation,
        })
    }
}
