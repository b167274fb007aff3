//! Inventory adjustments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::costing::MovementType;
use folio_core::ledger::JournalMetadata;
use folio_core::numbering::EntityType;
use folio_shared::types::round_money;

use super::{DocumentWorkflows, WorkflowError, journal_lines};
use crate::error::FromDbErr;
use crate::repositories::{AccountResolver, MovementResult, SequenceAllocator, StockMovement};
use crate::retry::with_retry;

/// A stock count correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustmentInput {
    /// Company.
    pub company_id: Uuid,
    /// Warehouse counted.
    pub warehouse_id: Uuid,
    /// Item counted.
    pub item_id: Uuid,
    /// Signed change: positive adds stock, negative removes it.
    pub quantity: Decimal,
    /// Cost of added stock. Defaults to the item's cost price.
    pub unit_cost: Option<Decimal>,
    /// Accounting date.
    pub adjustment_date: NaiveDate,
    /// Free-text reason, used as the journal description.
    pub reason: String,
}

/// A recorded adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    /// Adjustment ID, the reference on the movement and the journal.
    pub adjustment_id: Uuid,
    /// Allocated document number.
    pub adjustment_number: String,
    /// Ledger state after the movement.
    pub movement: MovementResult,
    /// Journal entry, absent when the movement carried no value.
    pub journal_entry_id: Option<Uuid>,
}

impl DocumentWorkflows {
    /// Records an adjustment movement and posts its value against the
    /// inventory adjustment account.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAdjustment` for a zero quantity, otherwise the first
    /// failing step's error; nothing is persisted.
    #[instrument(
        skip_all,
        fields(
            company_id = %input.company_id,
            warehouse_id = %input.warehouse_id,
            item_id = %input.item_id,
        )
    )]
    pub async fn adjust_stock(
        &self,
        input: &StockAdjustmentInput,
    ) -> Result<StockAdjustment, WorkflowError> {
        with_retry(self.retry.max_attempts, "adjust_stock", move || async move {
            let txn = self.db.begin().await.map_err(WorkflowError::from_db)?;
            let adjustment = self.adjust_stock_in(&txn, input).await?;
            txn.commit().await.map_err(WorkflowError::from_db)?;
            Ok(adjustment)
        })
        .await
    }

    async fn adjust_stock_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: &StockAdjustmentInput,
    ) -> Result<StockAdjustment, WorkflowError> {
        if input.quantity.is_zero() {
            return Err(WorkflowError::ZeroAdjustment);
        }

        let incoming = input.quantity > Decimal::ZERO;
        let movement_type = if incoming {
            MovementType::AdjustmentIn
        } else {
            MovementType::AdjustmentOut
        };

        let accounts = AccountResolver::resolve_in(conn, input.company_id).await?;
        let number = self
            .sequences
            .allocate(
                input.company_id,
                EntityType::StockAdjustment,
                input.adjustment_date,
            )
            .await?;

        let adjustment_id = Uuid::now_v7();
        let mut movement = StockMovement::new(
            input.company_id,
            input.warehouse_id,
            input.item_id,
            movement_type,
            input.quantity.abs(),
            input.adjustment_date,
        )
        .with_reference("stock_adjustment", adjustment_id);
        if let Some(unit_cost) = input.unit_cost {
            movement = movement.with_unit_cost(unit_cost);
        }

        let result = self.costing.record_movement_in(conn, &movement).await?;

        let journal_entry_id = if round_money(result.total_cost) > Decimal::ZERO {
            let lines = journal_lines::stock_adjustment(&accounts, incoming, result.total_cost);
            let metadata = JournalMetadata::from_source(
                input.adjustment_date,
                format!("Stock adjustment {}: {}", number.number, input.reason),
                "stock_adjustment",
                adjustment_id,
            );
            let entry = self
                .posting
                .post_in(conn, input.company_id, &lines, &metadata)
                .await?;
            Some(entry.id)
        } else {
            None
        };

        SequenceAllocator::confirm_in(conn, number.allocation_id, adjustment_id).await?;

        info!(
            adjustment_number = %number.number,
            movement_type = ?movement_type,
            total_cost = %result.total_cost,
            "Stock adjusted"
        );

        Ok(StockAdjustment {
            adjustment_id,
            adjustment_number: number.number,
            movement: result,
            journal_entry_id,
        })
    }
}
