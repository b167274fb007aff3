//! Payment allocator: FIFO settlement of open invoices.
//!
//! The payment row and the party's open invoices are locked in FIFO order,
//! then the plan from `folio_core::receivables::plan_fifo` is applied with
//! guarded updates. The whole run is one unit of work.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::receivables::{
    InvoiceStatus, OpenInvoice, PaymentKind, ReceivablesError, plan_fifo,
};
use folio_shared::types::round_money;

use crate::entities::{invoices, payment_allocations, payments, sea_orm_active_enums};
use crate::error::FromDbErr;

/// One settlement written by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedAllocation {
    /// Payment allocation row.
    pub allocation_id: Uuid,
    /// Settled invoice.
    pub invoice_id: Uuid,
    /// Amount applied.
    pub amount: Decimal,
    /// Invoice balance after the allocation.
    pub new_balance: Decimal,
    /// Invoice status after the allocation.
    pub new_status: InvoiceStatus,
}

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationOutcome {
    /// Payment.
    pub payment_id: Uuid,
    /// Settlements, oldest invoice first.
    pub allocations: Vec<AppliedAllocation>,
    /// Amount applied by this run.
    pub allocated: Decimal,
    /// Payment amount still unallocated after this run.
    pub payment_unallocated: Decimal,
}

/// Settles invoices from payments, oldest invoice first.
#[derive(Debug, Clone)]
pub struct PaymentAllocator {
    db: DatabaseConnection,
}

impl PaymentAllocator {
    /// Creates a new payment allocator.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates `amount` of a payment in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate_in`].
    pub async fn allocate(
        &self,
        company_id: Uuid,
        payment_id: Uuid,
        party_id: Uuid,
        amount: Decimal,
        allocation_date: NaiveDate,
    ) -> Result<AllocationOutcome, ReceivablesError> {
        let txn = self.db.begin().await.map_err(ReceivablesError::from_db)?;
        let outcome = Self::allocate_in(
            &txn,
            company_id,
            payment_id,
            party_id,
            amount,
            allocation_date,
        )
        .await?;
        txn.commit().await.map_err(ReceivablesError::from_db)?;
        Ok(outcome)
    }

    /// Allocates `amount` of a payment inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment does not exist for the company
    /// - `PartyMismatch` if the payment belongs to another party
    /// - `NonPositiveAmount` / `AllocationExceedsPayment` for a bad amount
    /// - `ConcurrentModification` if a guarded update loses a race
    #[instrument(skip_all, fields(company_id = %company_id, payment_id = %payment_id))]
    pub async fn allocate_in<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        payment_id: Uuid,
        party_id: Uuid,
        amount: Decimal,
        allocation_date: NaiveDate,
    ) -> Result<AllocationOutcome, ReceivablesError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::CompanyId.eq(company_id))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(ReceivablesError::from_db)?
            .ok_or(ReceivablesError::PaymentNotFound(payment_id))?;

        if payment.party_id != party_id {
            return Err(ReceivablesError::PartyMismatch {
                payment_id,
                party_id,
            });
        }

        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(ReceivablesError::NonPositiveAmount(amount));
        }
        if amount > payment.unallocated_amount {
            return Err(ReceivablesError::AllocationExceedsPayment {
                requested: amount,
                unallocated: payment.unallocated_amount,
            });
        }

        let invoice_kind: sea_orm_active_enums::InvoiceKind =
            PaymentKind::from(payment.kind).settles().into();

        let open = invoices::Entity::find()
            .filter(invoices::Column::CompanyId.eq(company_id))
            .filter(invoices::Column::PartyId.eq(party_id))
            .filter(invoices::Column::Kind.eq(invoice_kind))
            .filter(
                invoices::Column::Status
                    .is_in(InvoiceStatus::open().map(sea_orm_active_enums::InvoiceStatus::from)),
            )
            .filter(invoices::Column::BalanceAmount.gt(Decimal::ZERO))
            .order_by_asc(invoices::Column::InvoiceDate)
            .order_by_asc(invoices::Column::InvoiceNumber)
            .lock_exclusive()
            .all(conn)
            .await
            .map_err(ReceivablesError::from_db)?;

        let snapshot: Vec<OpenInvoice> = open
            .into_iter()
            .map(|invoice| OpenInvoice {
                id: invoice.id,
                number: invoice.invoice_number,
                invoice_date: invoice.invoice_date,
                total_amount: invoice.total_amount,
                paid_amount: invoice.paid_amount,
            })
            .collect();

        let plan = plan_fifo(amount, &snapshot)?;
        let now = Utc::now();
        let mut applied = Vec::with_capacity(plan.allocations.len());

        for planned in &plan.allocations {
            let snapshot_paid = snapshot
                .iter()
                .find(|invoice| invoice.id == planned.invoice_id)
                .map(|invoice| invoice.paid_amount)
                .ok_or(ReceivablesError::InvoiceNotFound(planned.invoice_id))?;

            let allocation = payment_allocations::ActiveModel {
                id: Set(Uuid::now_v7()),
                payment_id: Set(payment_id),
                invoice_id: Set(planned.invoice_id),
                amount: Set(planned.amount),
                allocation_date: Set(allocation_date),
                created_at: Set(now.into()),
            }
            .insert(conn)
            .await
            .map_err(ReceivablesError::from_db)?;

            let updated = invoices::Entity::update_many()
                .set(invoices::ActiveModel {
                    paid_amount: Set(planned.new_paid),
                    balance_amount: Set(planned.new_balance),
                    status: Set(planned.new_status.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                })
                .filter(invoices::Column::Id.eq(planned.invoice_id))
                .filter(invoices::Column::PaidAmount.eq(snapshot_paid))
                .exec(conn)
                .await
                .map_err(ReceivablesError::from_db)?;

            if updated.rows_affected == 0 {
                return Err(ReceivablesError::ConcurrentModification);
            }

            applied.push(AppliedAllocation {
                allocation_id: allocation.id,
                invoice_id: planned.invoice_id,
                amount: planned.amount,
                new_balance: planned.new_balance,
                new_status: planned.new_status,
            });
        }

        let payment_unallocated = payment.unallocated_amount - plan.allocated;
        let updated = payments::Entity::update_many()
            .set(payments::ActiveModel {
                allocated_amount: Set(payment.allocated_amount + plan.allocated),
                unallocated_amount: Set(payment_unallocated),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .filter(payments::Column::Id.eq(payment_id))
            .filter(payments::Column::UnallocatedAmount.eq(payment.unallocated_amount))
            .exec(conn)
            .await
            .map_err(ReceivablesError::from_db)?;

        if updated.rows_affected == 0 {
            return Err(ReceivablesError::ConcurrentModification);
        }

        info!(
            invoices = applied.len(),
            allocated = %plan.allocated,
            unallocated = %payment_unallocated,
            "Payment allocated"
        );

        Ok(AllocationOutcome {
            payment_id,
            allocations: applied,
            allocated: plan.allocated,
            payment_unallocated,
        })
    }

    /// Returns the allocations of a payment in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn allocations(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<payment_allocations::Model>, ReceivablesError> {
        payment_allocations::Entity::find()
            .filter(payment_allocations::Column::PaymentId.eq(payment_id))
            .order_by_asc(payment_allocations::Column::Id)
            .all(&self.db)
            .await
            .map_err(ReceivablesError::from_db)
    }
}
