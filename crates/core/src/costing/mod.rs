//! Perpetual weighted-average inventory costing.
//!
//! This module implements the valuation rule applied on every stock movement:
//! - Movement types and their direction
//! - Unit cost resolution (explicit cost, ledger average, item master cost)
//! - The weighted-average fold, including the stockout clamp
//! - Replay of a movement history into the ledger state it must produce

pub mod average;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use average::{replay, resolve_unit_cost};
pub use error::CostingError;
pub use types::{CostState, Direction, MovementOutcome, MovementType, RecordedMovement};
