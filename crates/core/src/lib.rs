//! Core consistency logic for Folio.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every rule that keeps the books consistent lives here; the `folio-db` crate
//! applies these rules inside database transactions.
//!
//! # Modules
//!
//! - `tax` - Tax/taxable splits for inclusive and exclusive pricing
//! - `numbering` - Document number series formatting and reset rules
//! - `costing` - Perpetual weighted-average inventory costing
//! - `ledger` - Double-entry posting validation, reversal and GL mapping keys
//! - `receivables` - FIFO payment allocation and credit exposure

pub mod costing;
pub mod ledger;
pub mod numbering;
pub mod receivables;
pub mod tax;
