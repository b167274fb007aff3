//! Costing ledger: weighted-average stock valuation.
//!
//! Each movement is one locking `UPDATE ... RETURNING` on the
//! (company, warehouse, item) ledger row followed by one append-only
//! `stock_transactions` insert. The ledger row is a cache; replaying the
//! transactions in `seq` order rebuilds it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::costing::{
    CostState, CostingError, Direction, MovementType, RecordedMovement, replay, resolve_unit_cost,
};
use folio_shared::config::CostingConfig;
use folio_shared::types::{round_cost, round_quantity};

use crate::entities::{items, stock_ledgers, stock_transactions};
use crate::error::FromDbErr;

/// A stock movement to record.
#[derive(Debug, Clone)]
pub struct StockMovement {
    /// Company.
    pub company_id: Uuid,
    /// Warehouse.
    pub warehouse_id: Uuid,
    /// Item.
    pub item_id: Uuid,
    /// Movement type; sets the direction.
    pub movement_type: MovementType,
    /// Positive quantity.
    pub quantity: Decimal,
    /// Unit of measure; the item's unit when absent.
    pub uom: Option<String>,
    /// Caller-supplied unit cost.
    pub unit_cost: Option<Decimal>,
    /// Exact value of incoming stock; overrides `quantity * unit_cost`.
    pub value: Option<Decimal>,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Source document type.
    pub reference_type: Option<String>,
    /// Source document id.
    pub reference_id: Option<Uuid>,
}

impl StockMovement {
    /// Creates a movement without cost hint or reference.
    #[must_use]
    pub fn new(
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
        movement_type: MovementType,
        quantity: Decimal,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            company_id,
            warehouse_id,
            item_id,
            movement_type,
            quantity,
            uom: None,
            unit_cost: None,
            value: None,
            posting_date,
            reference_type: None,
            reference_id: None,
        }
    }

    /// Sets the unit cost.
    #[must_use]
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    /// Values incoming stock at exactly `value`. The recorded unit cost is
    /// `value / quantity` unless one was set.
    #[must_use]
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the unit of measure.
    #[must_use]
    pub fn with_uom(mut self, uom: impl Into<String>) -> Self {
        self.uom = Some(uom.into());
        self
    }

    /// Links the movement to its source document.
    #[must_use]
    pub fn with_reference(mut self, reference_type: impl Into<String>, reference_id: Uuid) -> Self {
        self.reference_type = Some(reference_type.into());
        self.reference_id = Some(reference_id);
        self
    }
}

/// Outcome of one recorded movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementResult {
    /// Appended stock transaction.
    pub transaction_id: Uuid,
    /// Ledger row.
    pub ledger_id: Uuid,
    /// Movement type.
    pub movement_type: MovementType,
    /// Positive quantity moved.
    pub quantity: Decimal,
    /// Resolved unit cost.
    pub unit_cost: Decimal,
    /// Value added or removed.
    pub total_cost: Decimal,
    /// On-hand quantity after the movement.
    pub new_quantity: Decimal,
    /// Inventory value after the movement.
    pub new_total_value: Decimal,
    /// Average unit cost after the movement.
    pub new_average_cost: Decimal,
}

/// Both legs of a warehouse transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    /// Transfer-out at the source.
    pub outgoing: MovementResult,
    /// Transfer-in at the destination.
    pub incoming: MovementResult,
}

/// Reserved and available quantities of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct Availability {
    /// On hand.
    pub quantity: Decimal,
    /// Held for orders.
    pub quantity_reserved: Decimal,
    /// `quantity - quantity_reserved`.
    pub quantity_available: Decimal,
}

/// Stored ledger state compared with the replayed history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Ledger row.
    pub ledger_id: Uuid,
    /// State cached on the row.
    pub stored: CostState,
    /// State folded from the transactions.
    pub replayed: CostState,
    /// Number of transactions folded.
    pub movements: usize,
}

impl ReplayReport {
    /// Returns true if the cache matches the history.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.stored == self.replayed
    }
}

#[derive(Debug, FromQueryResult)]
struct UpdatedLedger {
    ledger_id: Uuid,
    quantity: Decimal,
    total_value: Decimal,
    average_cost: Decimal,
    unit_cost: Decimal,
    total_cost: Decimal,
}

const ENSURE_LEDGER_SQL: &str = r"
INSERT INTO stock_ledgers (id, company_id, warehouse_id, item_id)
VALUES ($1, $2, $3, $4)
ON CONFLICT (company_id, warehouse_id, item_id) DO NOTHING
";

/// Applies the weighted-average rule against the locked pre-update row.
///
/// `$4` signed quantity, `$5` quantity, `$6` incoming value, `$7` unit
/// cost hint, `$8` incoming, `$9` negative stock allowed, `$10`/`$11`
/// stamp purchase/sale.
const APPLY_MOVEMENT_SQL: &str = r"
WITH prev AS (
    SELECT id, quantity, total_value, average_cost
    FROM stock_ledgers
    WHERE company_id = $1 AND warehouse_id = $2 AND item_id = $3
    FOR UPDATE
),
calc AS (
    SELECT
        prev.id,
        prev.average_cost AS prev_average_cost,
        prev.quantity + $4::numeric AS new_quantity,
        CASE WHEN $8::boolean
            THEN $6::numeric
            ELSE ROUND($5::numeric * prev.average_cost, 6)
        END AS movement_value,
        CASE WHEN $8::boolean
            THEN prev.total_value + $6::numeric
            ELSE prev.total_value - ROUND($5::numeric * prev.average_cost, 6)
        END AS raw_value,
        COALESCE($7::numeric, prev.average_cost) AS unit_cost
    FROM prev
)
UPDATE stock_ledgers AS l
SET quantity = calc.new_quantity,
    quantity_available = calc.new_quantity - l.quantity_reserved,
    total_value = CASE WHEN calc.new_quantity <= 0 THEN 0 ELSE calc.raw_value END,
    average_cost = CASE
        WHEN calc.new_quantity <= 0 THEN calc.prev_average_cost
        ELSE ROUND(calc.raw_value / calc.new_quantity, 6)
    END,
    last_unit_cost = calc.unit_cost,
    last_purchase_at = CASE WHEN $10::boolean THEN now() ELSE l.last_purchase_at END,
    last_sale_at = CASE WHEN $11::boolean THEN now() ELSE l.last_sale_at END,
    updated_at = now()
FROM calc
WHERE l.id = calc.id
  AND ($8::boolean OR $9::boolean OR calc.new_quantity >= 0)
RETURNING l.id AS ledger_id, l.quantity, l.total_value, l.average_cost,
          calc.unit_cost, calc.movement_value AS total_cost
";

const LOCK_PAIR_SQL: &str = r"
SELECT id FROM stock_ledgers
WHERE company_id = $1 AND item_id = $2 AND warehouse_id IN ($3, $4)
ORDER BY warehouse_id
FOR UPDATE
";

const RESERVE_SQL: &str = r"
UPDATE stock_ledgers
SET quantity_reserved = quantity_reserved + $4,
    quantity_available = quantity_available - $4,
    updated_at = now()
WHERE company_id = $1 AND warehouse_id = $2 AND item_id = $3
  AND quantity_available >= $4
RETURNING quantity, quantity_reserved, quantity_available
";

/// Releases at most what is reserved.
const RELEASE_SQL: &str = r"
UPDATE stock_ledgers
SET quantity_available = quantity_available + LEAST($4, quantity_reserved),
    quantity_reserved = quantity_reserved - LEAST($4, quantity_reserved),
    updated_at = now()
WHERE company_id = $1 AND warehouse_id = $2 AND item_id = $3
RETURNING quantity, quantity_reserved, quantity_available
";

/// Weighted-average stock ledger.
#[derive(Debug, Clone)]
pub struct CostingLedger {
    db: DatabaseConnection,
    config: CostingConfig,
}

impl CostingLedger {
    /// Creates a new costing ledger.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: CostingConfig) -> Self {
        Self { db, config }
    }

    /// Records a movement in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::record_movement_in`].
    pub async fn record_movement(
        &self,
        movement: &StockMovement,
    ) -> Result<MovementResult, CostingError> {
        let txn = self.db.begin().await.map_err(CostingError::from_db)?;
        let result = self.record_movement_in(&txn, movement).await?;
        txn.commit().await.map_err(CostingError::from_db)?;
        Ok(result)
    }

    /// Records a movement inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// - `NonPositiveQuantity`, `NegativeUnitCost` for invalid input
    /// - `ItemNotFound` if the item is not in the company's master data
    /// - `MissingUnitCost` for incoming stock with no cost and no master cost
    /// - `InsufficientStock` when negative stock is disallowed
    #[instrument(
        skip_all,
        fields(
            company_id = %movement.company_id,
            warehouse_id = %movement.warehouse_id,
            item_id = %movement.item_id,
            movement_type = ?movement.movement_type,
        )
    )]
    pub async fn record_movement_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        movement: &StockMovement,
    ) -> Result<MovementResult, CostingError> {
        let quantity = round_quantity(movement.quantity);
        if quantity <= Decimal::ZERO {
            return Err(CostingError::NonPositiveQuantity(movement.quantity));
        }

        let item = items::Entity::find_by_id(movement.item_id)
            .filter(items::Column::CompanyId.eq(movement.company_id))
            .one(conn)
            .await
            .map_err(CostingError::from_db)?
            .ok_or(CostingError::ItemNotFound(movement.item_id))?;

        let direction = movement.movement_type.direction();
        let value = match (direction, movement.value) {
            (Direction::In, Some(value)) if value < Decimal::ZERO => {
                return Err(CostingError::NegativeUnitCost(value));
            }
            (Direction::In, Some(value)) => Some(round_cost(value)),
            _ => None,
        };
        // Outgoing stock without a hint resolves to the average under the row lock.
        let unit_cost = match (direction, movement.unit_cost, value) {
            (Direction::Out, None, _) => None,
            (Direction::In, None, Some(value)) => Some(round_cost(value / quantity)),
            (_, hint, _) => Some(resolve_unit_cost(
                direction,
                hint,
                Decimal::ZERO,
                item.cost_price,
                item.id,
            )?),
        };
        let incoming_value = match direction {
            Direction::In => value.or_else(|| unit_cost.map(|cost| round_cost(quantity * cost))),
            Direction::Out => None,
        };

        Self::ensure_ledger(conn, movement.company_id, movement.warehouse_id, movement.item_id)
            .await?;

        let updated = UpdatedLedger::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            APPLY_MOVEMENT_SQL,
            [
                movement.company_id.into(),
                movement.warehouse_id.into(),
                movement.item_id.into(),
                movement.movement_type.signed(quantity).into(),
                quantity.into(),
                incoming_value.into(),
                unit_cost.into(),
                (direction == Direction::In).into(),
                self.config.allow_negative_stock.into(),
                (movement.movement_type == MovementType::Receipt).into(),
                (movement.movement_type == MovementType::Issue).into(),
            ],
        ))
        .one(conn)
        .await
        .map_err(CostingError::from_db)?;

        let Some(updated) = updated else {
            let on_hand = Self::find_ledger(
                conn,
                movement.company_id,
                movement.warehouse_id,
                movement.item_id,
            )
            .await?
            .map_or(Decimal::ZERO, |ledger| ledger.quantity);
            return Err(CostingError::InsufficientStock {
                requested: quantity,
                on_hand,
            });
        };

        let transaction = stock_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(movement.company_id),
            ledger_id: Set(updated.ledger_id),
            warehouse_id: Set(movement.warehouse_id),
            item_id: Set(movement.item_id),
            movement_type: Set(movement.movement_type.into()),
            quantity: Set(quantity),
            uom: Set(movement.uom.clone().unwrap_or(item.uom)),
            unit_cost: Set(updated.unit_cost),
            total_cost: Set(updated.total_cost),
            balance_quantity: Set(updated.quantity),
            balance_value: Set(updated.total_value),
            balance_average_cost: Set(updated.average_cost),
            reference_type: Set(movement.reference_type.clone()),
            reference_id: Set(movement.reference_id),
            posting_date: Set(movement.posting_date),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(CostingError::from_db)?;

        info!(
            quantity = %quantity,
            new_quantity = %updated.quantity,
            new_average_cost = %updated.average_cost,
            "Stock movement recorded"
        );

        Ok(MovementResult {
            transaction_id: transaction.id,
            ledger_id: updated.ledger_id,
            movement_type: movement.movement_type,
            quantity,
            unit_cost: updated.unit_cost,
            total_cost: updated.total_cost,
            new_quantity: updated.quantity,
            new_total_value: updated.total_value,
            new_average_cost: updated.average_cost,
        })
    }

    /// Moves stock between two warehouses in one transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer_in`].
    pub async fn transfer(
        &self,
        company_id: Uuid,
        from_warehouse_id: Uuid,
        to_warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
        posting_date: NaiveDate,
    ) -> Result<TransferResult, CostingError> {
        let txn = self.db.begin().await.map_err(CostingError::from_db)?;
        let result = self
            .transfer_in(
                &txn,
                company_id,
                from_warehouse_id,
                to_warehouse_id,
                item_id,
                quantity,
                posting_date,
                None,
            )
            .await?;
        txn.commit().await.map_err(CostingError::from_db)?;
        Ok(result)
    }

    /// Records a transfer-out at the source and a transfer-in at the
    /// destination, valued at the source's pre-movement average.
    ///
    /// Both ledger rows are locked in warehouse id order first.
    ///
    /// # Errors
    ///
    /// Returns `SameWarehouseTransfer` if source and destination match, and
    /// any error of [`Self::record_movement_in`].
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, conn, quantity, reference))]
    pub async fn transfer_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        from_warehouse_id: Uuid,
        to_warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
        posting_date: NaiveDate,
        reference: Option<(String, Uuid)>,
    ) -> Result<TransferResult, CostingError> {
        if from_warehouse_id == to_warehouse_id {
            return Err(CostingError::SameWarehouseTransfer);
        }

        Self::ensure_ledger(conn, company_id, from_warehouse_id, item_id).await?;
        Self::ensure_ledger(conn, company_id, to_warehouse_id, item_id).await?;
        conn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            LOCK_PAIR_SQL,
            [
                company_id.into(),
                item_id.into(),
                from_warehouse_id.into(),
                to_warehouse_id.into(),
            ],
        ))
        .await
        .map_err(CostingError::from_db)?;

        let with_reference = |movement: StockMovement| match &reference {
            Some((reference_type, reference_id)) => {
                movement.with_reference(reference_type.clone(), *reference_id)
            }
            None => movement,
        };

        let outgoing = self
            .record_movement_in(
                conn,
                &with_reference(StockMovement::new(
                    company_id,
                    from_warehouse_id,
                    item_id,
                    MovementType::TransferOut,
                    quantity,
                    posting_date,
                )),
            )
            .await?;

        let incoming = self
            .record_movement_in(
                conn,
                &with_reference(
                    StockMovement::new(
                        company_id,
                        to_warehouse_id,
                        item_id,
                        MovementType::TransferIn,
                        quantity,
                        posting_date,
                    )
                    .with_unit_cost(outgoing.unit_cost),
                ),
            )
            .await?;

        Ok(TransferResult { outgoing, incoming })
    }

    /// Holds `quantity` for an order.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientAvailable` if less is available and
    /// `LedgerNotFound` if the item was never stocked in the warehouse.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    ) -> Result<Availability, CostingError> {
        let quantity = round_quantity(quantity);
        if quantity <= Decimal::ZERO {
            return Err(CostingError::NonPositiveQuantity(quantity));
        }

        let updated = Self::adjust_reservation(
            &self.db,
            RESERVE_SQL,
            company_id,
            warehouse_id,
            item_id,
            quantity,
        )
        .await?;

        match updated {
            Some(availability) => Ok(availability),
            None => {
                let ledger = Self::find_ledger(&self.db, company_id, warehouse_id, item_id)
                    .await?
                    .ok_or(CostingError::LedgerNotFound {
                        warehouse_id,
                        item_id,
                    })?;
                Err(CostingError::InsufficientAvailable {
                    requested: quantity,
                    available: ledger.quantity_available,
                })
            }
        }
    }

    /// Returns reserved quantity to available stock.
    ///
    /// # Errors
    ///
    /// Returns `LedgerNotFound` if the item was never stocked in the warehouse.
    #[instrument(skip(self))]
    pub async fn release(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    ) -> Result<Availability, CostingError> {
        let quantity = round_quantity(quantity);
        if quantity <= Decimal::ZERO {
            return Err(CostingError::NonPositiveQuantity(quantity));
        }

        Self::adjust_reservation(
            &self.db,
            RELEASE_SQL,
            company_id,
            warehouse_id,
            item_id,
            quantity,
        )
        .await?
        .ok_or(CostingError::LedgerNotFound {
            warehouse_id,
            item_id,
        })
    }

    /// Returns the ledger row, if the item was ever stocked there.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_ledger(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<stock_ledgers::Model>, CostingError> {
        Self::find_ledger(&self.db, company_id, warehouse_id, item_id).await
    }

    /// Returns the movement history of a ledger, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn history(
        &self,
        ledger_id: Uuid,
    ) -> Result<Vec<stock_transactions::Model>, CostingError> {
        stock_transactions::Entity::find()
            .filter(stock_transactions::Column::LedgerId.eq(ledger_id))
            .order_by_asc(stock_transactions::Column::Seq)
            .all(&self.db)
            .await
            .map_err(CostingError::from_db)
    }

    /// Folds the movement history and compares it with the cached row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerNotFound` if no ledger row exists.
    #[instrument(skip(self))]
    pub async fn replay(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
    ) -> Result<ReplayReport, CostingError> {
        let ledger = self
            .get_ledger(company_id, warehouse_id, item_id)
            .await?
            .ok_or(CostingError::LedgerNotFound {
                warehouse_id,
                item_id,
            })?;

        let history = self.history(ledger.id).await?;
        let movements = history.len();
        let replayed = replay(history.into_iter().map(|row| RecordedMovement {
            movement_type: row.movement_type.into(),
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            value: Some(row.total_cost),
        }))?;

        let report = ReplayReport {
            ledger_id: ledger.id,
            stored: CostState {
                quantity: ledger.quantity,
                total_value: ledger.total_value,
                average_cost: ledger.average_cost,
            },
            replayed,
            movements,
        };

        if !report.matches() {
            tracing::warn!(ledger_id = %ledger.id, "Stock ledger differs from its history");
        }
        Ok(report)
    }

    async fn ensure_ledger<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), CostingError> {
        conn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ENSURE_LEDGER_SQL,
            [
                Uuid::now_v7().into(),
                company_id.into(),
                warehouse_id.into(),
                item_id.into(),
            ],
        ))
        .await
        .map_err(CostingError::from_db)?;
        Ok(())
    }

    async fn find_ledger<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<stock_ledgers::Model>, CostingError> {
        stock_ledgers::Entity::find()
            .filter(stock_ledgers::Column::CompanyId.eq(company_id))
            .filter(stock_ledgers::Column::WarehouseId.eq(warehouse_id))
            .filter(stock_ledgers::Column::ItemId.eq(item_id))
            .one(conn)
            .await
            .map_err(CostingError::from_db)
    }

    async fn adjust_reservation<C: ConnectionTrait>(
        conn: &C,
        sql: &str,
        company_id: Uuid,
        warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    ) -> Result<Option<Availability>, CostingError> {
        Availability::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                company_id.into(),
                warehouse_id.into(),
                item_id.into(),
                quantity.into(),
            ],
        ))
        .one(conn)
        .await
        .map_err(CostingError::from_db)
    }
}
