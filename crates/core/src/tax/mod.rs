//! Tax calculation for document lines.
//!
//! A pure function of amount, rate and pricing mode. Rounding to 2 decimal
//! places happens once, on output, never mid-calculation.

pub mod calculator;

#[cfg(test)]
mod props;

pub use calculator::{DocumentTotals, LineInput, TaxCalculator, TaxError, TaxMode, TaxSplit};
