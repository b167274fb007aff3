//! Sequence allocator.
//!
//! Document numbers come from one atomic `UPDATE ... RETURNING` on the
//! series row. The row stays locked until the allocating transaction ends,
//! so document workflows allocate in a short transaction of their own and
//! confirm inside the document's. A document that then fails leaves its
//! number `RESERVED`: a gap, never a duplicate.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend,
    EntityTrait, FromQueryResult, QueryFilter, Set, Statement, TransactionTrait,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use folio_core::numbering::{
    AllocationStatus, EntityType, NumberingError, ResetRule, SeriesFormat, SeriesTemplate,
    YearFormat, format_number, number_year,
};
use folio_shared::config::NumberingConfig;

use crate::entities::{number_allocation_logs, number_series, sea_orm_active_enums};
use crate::error::FromDbErr;

/// A number issued by the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedNumber {
    /// Allocation log row; pass it to [`SequenceAllocator::confirm`].
    pub allocation_id: Uuid,
    /// Series the number came from.
    pub series_id: Uuid,
    /// Formatted document number.
    pub number: String,
    /// Raw counter value.
    pub counter_value: i64,
}

#[derive(Debug, FromQueryResult)]
struct IncrementedSeries {
    id: Uuid,
    prefix: String,
    separator: String,
    year_format: sea_orm_active_enums::YearFormat,
    reset_rule: sea_orm_active_enums::ResetRule,
    current_value: i64,
    last_reset_year: Option<i32>,
}

/// Yearly series restart at 1 on the first allocation of a later year,
/// provided their year format is listed in `$4`. `last_reset_year` only
/// moves forward.
const INCREMENT_SQL: &str = r"
UPDATE number_series
SET current_value = CASE
        WHEN reset_rule = 'yearly'
             AND year_format::text = ANY(string_to_array($4, ','))
             AND last_reset_year IS NOT NULL
             AND $3 > last_reset_year
        THEN 1
        ELSE current_value + 1
    END,
    last_reset_year = GREATEST(COALESCE(last_reset_year, $3), $3),
    updated_at = now()
WHERE company_id = $1
  AND entity_type = $2
  AND is_active = true
  AND is_locked = false
RETURNING id, prefix, separator, year_format::text AS year_format,
          reset_rule::text AS reset_rule, current_value, last_reset_year
";

const PROVISION_SQL: &str = r"
INSERT INTO number_series
    (id, company_id, entity_type, prefix, separator, year_format, current_value, reset_rule)
VALUES ($1, $2, $3, $4, $5, $6::year_format, $7, $8::reset_rule)
ON CONFLICT (company_id, entity_type) WHERE is_active = true DO NOTHING
";

/// Issues document numbers per (company, entity type).
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    db: DatabaseConnection,
    config: NumberingConfig,
}

impl SequenceAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: NumberingConfig) -> Self {
        Self { db, config }
    }

    /// Allocates a number in its own transaction.
    ///
    /// The series lock is released on return. A caller that later fails to
    /// persist its document leaves the number `RESERVED`.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate_in`].
    pub async fn allocate(
        &self,
        company_id: Uuid,
        entity_type: EntityType,
        document_date: NaiveDate,
    ) -> Result<AllocatedNumber, NumberingError> {
        let txn = self.db.begin().await.map_err(NumberingError::from_db)?;
        let allocated = self
            .allocate_in(&txn, company_id, entity_type, document_date)
            .await?;
        txn.commit().await.map_err(NumberingError::from_db)?;
        Ok(allocated)
    }

    /// Allocates a number inside the caller's transaction.
    ///
    /// A rollback returns the number to the series, but the series row stays
    /// locked until the caller's transaction ends and every other allocation
    /// for the same series waits on it.
    ///
    /// # Errors
    ///
    /// - `SeriesLocked` if the active series is locked
    /// - `NoActiveSeries` if none exists and auto-provisioning is disabled
    /// - `ConcurrentModification` on a serialization failure or deadlock
    #[instrument(skip_all, fields(company_id = %company_id, entity_type = %entity_type))]
    pub async fn allocate_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        entity_type: EntityType,
        document_date: NaiveDate,
    ) -> Result<AllocatedNumber, NumberingError> {
        let year = document_date.year();

        let series = match Self::increment(conn, company_id, entity_type, year).await? {
            Some(series) => series,
            None => {
                self.ensure_series(conn, company_id, entity_type).await?;
                Self::increment(conn, company_id, entity_type, year)
                    .await?
                    .ok_or(NumberingError::NoActiveSeries(entity_type))?
            }
        };

        let format = SeriesFormat {
            prefix: series.prefix,
            separator: series.separator,
            year_format: series.year_format.into(),
        };
        let reset_rule = ResetRule::from(series.reset_rule).effective(format.year_format);
        let printed_year = number_year(
            reset_rule,
            series.last_reset_year.unwrap_or(year),
            year,
        );
        let number = format_number(
            &format,
            printed_year,
            series.current_value,
            self.config.pad_width,
        )?;

        let log = number_allocation_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id),
            series_id: Set(series.id),
            entity_type: Set(entity_type.as_str().to_string()),
            generated_number: Set(number.clone()),
            counter_value: Set(series.current_value),
            status: Set(sea_orm_active_enums::AllocationStatus::Reserved),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(NumberingError::from_db)?;

        info!(number = %number, series_id = %series.id, "Number allocated");

        Ok(AllocatedNumber {
            allocation_id: log.id,
            series_id: series.id,
            number,
            counter_value: series.current_value,
        })
    }

    /// Marks a reserved number as used by `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound` or `AllocationNotReserved`.
    pub async fn confirm(&self, allocation_id: Uuid, entity_id: Uuid) -> Result<(), NumberingError> {
        Self::confirm_in(&self.db, allocation_id, entity_id).await
    }

    /// Confirms inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound` or `AllocationNotReserved`.
    #[instrument(skip(conn))]
    pub async fn confirm_in<C: ConnectionTrait>(
        conn: &C,
        allocation_id: Uuid,
        entity_id: Uuid,
    ) -> Result<(), NumberingError> {
        let result = number_allocation_logs::Entity::update_many()
            .set(number_allocation_logs::ActiveModel {
                status: Set(sea_orm_active_enums::AllocationStatus::Confirmed),
                entity_id: Set(Some(entity_id)),
                confirmed_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .filter(number_allocation_logs::Column::Id.eq(allocation_id))
            .filter(
                number_allocation_logs::Column::Status
                    .eq(sea_orm_active_enums::AllocationStatus::Reserved),
            )
            .exec(conn)
            .await
            .map_err(NumberingError::from_db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_reserved(conn, allocation_id).await);
        }

        debug!(%allocation_id, %entity_id, "Number confirmed");
        Ok(())
    }

    /// Marks a reserved number as abandoned. The number is not reissued.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound` or `AllocationNotReserved`.
    #[instrument(skip(self))]
    pub async fn void(&self, allocation_id: Uuid) -> Result<(), NumberingError> {
        let result = number_allocation_logs::Entity::update_many()
            .set(number_allocation_logs::ActiveModel {
                status: Set(sea_orm_active_enums::AllocationStatus::Void),
                voided_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .filter(number_allocation_logs::Column::Id.eq(allocation_id))
            .filter(
                number_allocation_logs::Column::Status
                    .eq(sea_orm_active_enums::AllocationStatus::Reserved),
            )
            .exec(&self.db)
            .await
            .map_err(NumberingError::from_db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_reserved(&self.db, allocation_id).await);
        }

        info!(%allocation_id, "Number voided");
        Ok(())
    }

    /// Returns the log row of an allocation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound` if no such row exists.
    pub async fn find_allocation(
        &self,
        allocation_id: Uuid,
    ) -> Result<number_allocation_logs::Model, NumberingError> {
        number_allocation_logs::Entity::find_by_id(allocation_id)
            .one(&self.db)
            .await
            .map_err(NumberingError::from_db)?
            .ok_or(NumberingError::AllocationNotFound(allocation_id))
    }

    async fn increment<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
        entity_type: EntityType,
        year: i32,
    ) -> Result<Option<IncrementedSeries>, NumberingError> {
        IncrementedSeries::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            INCREMENT_SQL,
            [
                company_id.into(),
                entity_type.as_str().into(),
                year.into(),
                yearly_reset_formats().into(),
            ],
        ))
        .one(conn)
        .await
        .map_err(NumberingError::from_db)
    }

    /// Makes sure an active series exists, provisioning the default one.
    async fn ensure_series<C: ConnectionTrait>(
        &self,
        conn: &C,
        company_id: Uuid,
        entity_type: EntityType,
    ) -> Result<(), NumberingError> {
        let existing = number_series::Entity::find()
            .filter(number_series::Column::CompanyId.eq(company_id))
            .filter(number_series::Column::EntityType.eq(entity_type.as_str()))
            .filter(number_series::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(NumberingError::from_db)?;

        match existing {
            Some(series) if series.is_locked => Err(NumberingError::SeriesLocked(entity_type)),
            Some(_) => Ok(()),
            None if !self.config.auto_provision => Err(NumberingError::NoActiveSeries(entity_type)),
            None => {
                let template = SeriesTemplate::default_for(entity_type);
                let year_format: sea_orm_active_enums::YearFormat = template.format.year_format.into();
                let reset_rule: sea_orm_active_enums::ResetRule = template.reset_rule.into();

                let result = conn
                    .execute(Statement::from_sql_and_values(
                        DbBackend::Postgres,
                        PROVISION_SQL,
                        [
                            Uuid::now_v7().into(),
                            company_id.into(),
                            entity_type.as_str().into(),
                            template.format.prefix.into(),
                            template.format.separator.into(),
                            year_format.to_value().into(),
                            template.start_value.into(),
                            reset_rule.to_value().into(),
                        ],
                    ))
                    .await
                    .map_err(NumberingError::from_db)?;

                if result.rows_affected() > 0 {
                    info!(%company_id, %entity_type, "Provisioned default number series");
                }
                Ok(())
            }
        }
    }

    async fn not_reserved<C: ConnectionTrait>(conn: &C, allocation_id: Uuid) -> NumberingError {
        match number_allocation_logs::Entity::find_by_id(allocation_id)
            .one(conn)
            .await
        {
            Ok(Some(log)) => NumberingError::AllocationNotReserved {
                id: allocation_id,
                status: AllocationStatus::from(log.status),
            },
            Ok(None) => NumberingError::AllocationNotFound(allocation_id),
            Err(err) => NumberingError::from_db(err),
        }
    }
}

/// Storage names of the year formats a yearly series may reset under.
fn yearly_reset_formats() -> String {
    YearFormat::ALL
        .into_iter()
        .filter(|format| ResetRule::Yearly.effective(*format) == ResetRule::Yearly)
        .map(|format| sea_orm_active_enums::YearFormat::from(format).to_value())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearless_format_never_resets() {
        assert_eq!(yearly_reset_formats(), "YY,YYYY");
    }
}
