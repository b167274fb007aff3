//! Persistence services.
//!
//! Each service owns a connection for standalone use and exposes `*_in`
//! variants that run inside a caller's transaction, so workflows can
//! compose several services in one unit of work.

pub mod credit;
pub mod gl_accounts;
pub mod journal;
pub mod payment;
pub mod sequence;
pub mod stock;

pub use credit::CreditExposureCalculator;
pub use gl_accounts::AccountResolver;
pub use journal::{JournalEntryWithLines, PostedEntry, PostingEngine};
pub use payment::{AllocationOutcome, AppliedAllocation, PaymentAllocator};
pub use sequence::{AllocatedNumber, SequenceAllocator};
pub use stock::{
    Availability, CostingLedger, MovementResult, ReplayReport, StockMovement, TransferResult,
};
