//! Double-entry posting rules.
//!
//! This module implements the pure side of the Posting Engine:
//! - Journal line inputs and entry status
//! - Pre-write validation (line count, one-sided amounts, balance)
//! - Reversal line derivation
//! - Typed GL default mappings
//! - Error types for ledger operations

pub mod accounts;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use accounts::{GlAccounts, MappingKey};
pub use error::{Imbalance, LedgerError};
pub use reversal::ReversalService;
pub use service::{AccountInfo, PostingService};
pub use types::{EntryTotals, JournalLineInput, JournalMetadata, JournalStatus};
