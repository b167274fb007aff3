//! Database layer with `SeaORM` entities, persistence services and workflows.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The Postgres schema migration
//! - Persistence services applying the `folio-core` rules in transactions
//! - Business-document workflows composing those services

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod retry;
pub mod workflows;

pub use repositories::{
    AccountResolver, CostingLedger, CreditExposureCalculator, PaymentAllocator, PostingEngine,
    SequenceAllocator,
};
pub use workflows::{DocumentWorkflows, WorkflowError};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use folio_shared::config::DatabaseConfig;

/// Establishes a connection pool sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10));
    Database::connect(options).await
}
