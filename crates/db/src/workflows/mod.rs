//! Business-document workflows.
//!
//! Each workflow composes the costing, posting and settlement services in
//! one database transaction, so a document, its stock movements and its
//! journal entry commit or roll back together. Document and entry numbers
//! are drawn in short transactions of their own and confirmed inside the
//! workflow's; a rolled back workflow leaves them `RESERVED`. A workflow
//! that loses a race is retried from the start.

mod error;
mod invoice;
mod journal_lines;
mod payment;
mod stock;

pub use error::WorkflowError;
pub use invoice::{InvoiceInput, InvoiceLine, PostedInvoice};
pub use payment::{PaymentInput, ReceivedPayment};
pub use stock::{StockAdjustment, StockAdjustmentInput};

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use folio_core::receivables::ReceivablesError;
use folio_shared::AppConfig;
use folio_shared::config::RetryConfig;

use crate::entities::parties;
use crate::error::FromDbErr;
use crate::repositories::{CostingLedger, PostingEngine, SequenceAllocator};

/// Runs business-document workflows against one database.
#[derive(Debug, Clone)]
pub struct DocumentWorkflows {
    db: DatabaseConnection,
    sequences: SequenceAllocator,
    costing: CostingLedger,
    posting: PostingEngine,
    retry: RetryConfig,
}

impl DocumentWorkflows {
    /// Wires the services from application configuration.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let sequences = SequenceAllocator::new(db.clone(), config.numbering);
        Self {
            costing: CostingLedger::new(db.clone(), config.costing),
            posting: PostingEngine::new(db.clone(), sequences.clone()),
            sequences,
            retry: config.retry,
            db,
        }
    }

    /// The sequence allocator used for document numbers.
    #[must_use]
    pub const fn sequences(&self) -> &SequenceAllocator {
        &self.sequences
    }

    /// The costing ledger used for stock movements.
    #[must_use]
    pub const fn costing(&self) -> &CostingLedger {
        &self.costing
    }

    /// The posting engine used for journal entries.
    #[must_use]
    pub const fn posting(&self) -> &PostingEngine {
        &self.posting
    }
}

/// Loads a party of the company.
async fn find_party<C: ConnectionTrait>(
    conn: &C,
    company_id: Uuid,
    party_id: Uuid,
) -> Result<parties::Model, WorkflowError> {
    parties::Entity::find_by_id(party_id)
        .filter(parties::Column::CompanyId.eq(company_id))
        .one(conn)
        .await
        .map_err(WorkflowError::from_db)?
        .ok_or_else(|| ReceivablesError::PartyNotFound(party_id).into())
}
