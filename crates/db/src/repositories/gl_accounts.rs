//! Account resolution: default GL mappings and chart-of-accounts lookups.
//!
//! Workflows resolve all default accounts once per unit of work and pass
//! resolved ids to the posting engine.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use folio_core::ledger::{GlAccounts, LedgerError, MappingKey};

use crate::entities::{accounts, gl_account_mappings};
use crate::error::FromDbErr;

/// Resolves default GL accounts for a company.
#[derive(Debug, Clone)]
pub struct AccountResolver {
    db: DatabaseConnection,
}

impl AccountResolver {
    /// Creates a new account resolver.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves every default mapping of a company.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccountMapping` naming the first unmapped key.
    pub async fn resolve(&self, company_id: Uuid) -> Result<GlAccounts, LedgerError> {
        Self::resolve_in(&self.db, company_id).await
    }

    /// Resolves mappings using the caller's connection.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccountMapping` naming the first unmapped key.
    #[instrument(skip(conn))]
    pub async fn resolve_in<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
    ) -> Result<GlAccounts, LedgerError> {
        let rows = gl_account_mappings::Entity::find()
            .filter(gl_account_mappings::Column::CompanyId.eq(company_id))
            .all(conn)
            .await
            .map_err(LedgerError::from_db)?;

        let mappings = rows.into_iter().filter_map(|row| {
            match row.mapping_key.parse::<MappingKey>() {
                Ok(key) => Some((key, row.account_id)),
                Err(_) => {
                    warn!(mapping_key = %row.mapping_key, "Ignoring unknown GL mapping key");
                    None
                }
            }
        });

        GlAccounts::from_mappings(mappings)
    }

    /// Maps `key` to an account of the company, replacing any previous mapping.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not belong to the company.
    #[instrument(skip(self))]
    pub async fn set_mapping(
        &self,
        company_id: Uuid,
        key: MappingKey,
        account_id: Uuid,
    ) -> Result<(), LedgerError> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(LedgerError::from_db)?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let now = Utc::now();
        gl_account_mappings::Entity::insert(gl_account_mappings::ActiveModel {
            company_id: Set(company_id),
            mapping_key: Set(key.as_str().to_string()),
            account_id: Set(account_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .on_conflict(
            OnConflict::columns([
                gl_account_mappings::Column::CompanyId,
                gl_account_mappings::Column::MappingKey,
            ])
            .update_columns([
                gl_account_mappings::Column::AccountId,
                gl_account_mappings::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(&self.db)
        .await
        .map_err(LedgerError::from_db)?;

        Ok(())
    }
}
