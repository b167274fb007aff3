//! Database error classification.
//!
//! Postgres reports lock contention through SQLSTATE codes. Serialization
//! failures and deadlocks are turned into the retryable
//! `ConcurrentModification` variant of each service error; everything else
//! becomes `Database(message)`.

use sea_orm::{DbErr, RuntimeErr};

use folio_core::costing::CostingError;
use folio_core::ledger::LedgerError;
use folio_core::numbering::NumberingError;
use folio_core::receivables::ReceivablesError;

/// `serialization_failure`
pub const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`
pub const DEADLOCK_DETECTED: &str = "40P01";

/// Returns the Postgres SQLSTATE carried by a database error, if any.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        RuntimeErr::Internal(_) => None,
    }
}

/// Returns true if the error is a serialization failure or deadlock.
#[must_use]
pub fn is_concurrency_conflict(err: &DbErr) -> bool {
    matches!(
        sqlstate(err).as_deref(),
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
    )
}

/// Converts a `DbErr` into a service error.
pub trait FromDbErr: Sized {
    /// The retryable conflict variant.
    fn concurrent() -> Self;

    /// The opaque storage failure variant.
    fn database(message: String) -> Self;

    /// Classifies `err` by SQLSTATE.
    fn from_db(err: DbErr) -> Self {
        if is_concurrency_conflict(&err) {
            Self::concurrent()
        } else {
            Self::database(err.to_string())
        }
    }
}

macro_rules! impl_from_db_err {
    ($($error:ty),+ $(,)?) => {
        $(
            impl FromDbErr for $error {
                fn concurrent() -> Self {
                    Self::ConcurrentModification
                }

                fn database(message: String) -> Self {
                    Self::Database(message)
                }
            }
        )+
    };
}

impl_from_db_err!(NumberingError, CostingError, LedgerError, ReceivablesError);
