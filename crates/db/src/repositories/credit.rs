//! Credit exposure of a party: unpaid sales invoices plus committed orders.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, Statement,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use folio_core::receivables::{
    CreditCheck, InvoiceKind, InvoiceStatus, OrderStatus, ReceivablesError, evaluate_credit,
};

use crate::entities::{parties, sea_orm_active_enums};
use crate::error::FromDbErr;

/// Open balances of sales invoices in a `$4` status, and the totals of
/// sales orders in a `$5` status. `$3` is the sales invoice kind.
const EXPOSURE_SQL: &str = r"
SELECT
    COALESCE((
        SELECT SUM(balance_amount)
        FROM invoices
        WHERE company_id = $1
          AND party_id = $2
          AND kind::text = $3
          AND status::text = ANY(string_to_array($4, ','))
    ), 0) AS outstanding_invoices,
    COALESCE((
        SELECT SUM(total_amount)
        FROM sales_orders
        WHERE company_id = $1
          AND party_id = $2
          AND status::text = ANY(string_to_array($5, ','))
    ), 0) AS committed_orders
";

/// Storage names of the invoice statuses that carry an open balance.
fn open_invoice_statuses() -> String {
    InvoiceStatus::open()
        .map(|status| sea_orm_active_enums::InvoiceStatus::from(status).to_value())
        .collect::<Vec<_>>()
        .join(",")
}

/// Storage names of the order statuses that commit credit.
fn committed_order_statuses() -> String {
    OrderStatus::committed()
        .map(|status| sea_orm_active_enums::OrderStatus::from(status).to_value())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, FromQueryResult)]
struct ExposureRow {
    outstanding_invoices: Decimal,
    committed_orders: Decimal,
}

/// Evaluates proposed sales against a customer's credit limit.
#[derive(Debug, Clone)]
pub struct CreditExposureCalculator {
    db: DatabaseConnection,
}

impl CreditExposureCalculator {
    /// Creates a new credit exposure calculator.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Checks whether `proposed_amount` fits under the party's credit limit.
    ///
    /// The result is advisory; callers decide whether to block or warn.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if the party does not belong to the company.
    pub async fn check_exposure(
        &self,
        company_id: Uuid,
        party_id: Uuid,
        proposed_amount: Decimal,
    ) -> Result<CreditCheck, ReceivablesError> {
        Self::check_exposure_in(&self.db, company_id, party_id, proposed_amount).await
    }

    /// Same as [`Self::check_exposure`], reading through `conn`.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if the party does not belong to the company.
    #[instrument(skip_all, fields(company_id = %company_id, party_id = %party_id))]
    pub async fn check_exposure_in<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        party_id: Uuid,
        proposed_amount: Decimal,
    ) -> Result<CreditCheck, ReceivablesError> {
        let party = parties::Entity::find_by_id(party_id)
            .filter(parties::Column::CompanyId.eq(company_id))
            .one(conn)
            .await
            .map_err(ReceivablesError::from_db)?
            .ok_or(ReceivablesError::PartyNotFound(party_id))?;

        let row = ExposureRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            EXPOSURE_SQL,
            [
                company_id.into(),
                party_id.into(),
                sea_orm_active_enums::InvoiceKind::from(InvoiceKind::Sales)
                    .to_value()
                    .into(),
                open_invoice_statuses().into(),
                committed_order_statuses().into(),
            ],
        ))
        .one(conn)
        .await
        .map_err(ReceivablesError::from_db)?
        .unwrap_or(ExposureRow {
            outstanding_invoices: Decimal::ZERO,
            committed_orders: Decimal::ZERO,
        });

        let check = evaluate_credit(
            party.credit_limit,
            row.outstanding_invoices,
            row.committed_orders,
            proposed_amount,
        );

        debug!(
            exposure = %check.exposure,
            allowed = check.allowed,
            "Credit exposure evaluated"
        );

        Ok(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_status_lists() {
        assert_eq!(open_invoice_statuses(), "issued,partial");
        assert_eq!(committed_order_statuses(), "draft,confirmed");
    }
}
