//! Tax/taxable splits for inclusive and exclusive pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_shared::types::round_money;

/// Errors raised by the tax calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// Tax percentage is below zero.
    #[error("Tax rate cannot be negative: {0}")]
    NegativeRate(Decimal),

    /// Discount percentage is outside 0..=100.
    #[error("Discount must be between 0 and 100 percent: {0}")]
    InvalidDiscount(Decimal),

    /// Line quantity is zero or negative.
    #[error("Quantity must be positive: {0}")]
    NonPositiveQuantity(Decimal),
}

impl TaxError {
    /// Returns the error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeRate(_) => "NEGATIVE_TAX_RATE",
            Self::InvalidDiscount(_) => "INVALID_DISCOUNT",
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
        }
    }
}

impl folio_shared::error::Classify for TaxError {
    fn kind(&self) -> folio_shared::ErrorKind {
        folio_shared::ErrorKind::Validation
    }
}

/// How a price relates to its tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// The amount excludes tax; tax is added on top.
    Exclusive,
    /// The amount already contains tax; tax is extracted from it.
    Inclusive,
}

/// Result of splitting an amount into taxable base and tax.
///
/// All three values are rounded to 2 decimal places and always satisfy
/// `taxable_amount + tax_amount == total_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSplit {
    /// Net amount the tax is charged on.
    pub taxable_amount: Decimal,
    /// Tax charged.
    pub tax_amount: Decimal,
    /// Gross amount.
    pub total_amount: Decimal,
}

/// Pricing inputs for one document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    /// Quantity sold or bought.
    pub quantity: Decimal,
    /// Price per unit (inclusive or exclusive according to `mode`).
    pub unit_price: Decimal,
    /// Discount percentage applied to `quantity * unit_price`.
    pub discount_percent: Decimal,
    /// Tax percentage (e.g. `5` for 5%).
    pub tax_percent: Decimal,
    /// Whether `unit_price` includes tax.
    pub mode: TaxMode,
}

/// Sum of several line splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line taxable amounts.
    pub taxable_amount: Decimal,
    /// Sum of line tax amounts.
    pub tax_amount: Decimal,
    /// Sum of line totals.
    pub total_amount: Decimal,
}

impl DocumentTotals {
    /// Adds one line split to the running totals.
    pub fn add(&mut self, split: &TaxSplit) {
        self.taxable_amount += split.taxable_amount;
        self.tax_amount += split.tax_amount;
        self.total_amount += split.total_amount;
    }
}

/// Stateless tax calculator.
pub struct TaxCalculator;

impl TaxCalculator {
    /// Splits `amount` into taxable base and tax at `tax_percent`.
    ///
    /// - Exclusive: `taxable = amount`, `tax = taxable * rate`, `total = taxable + tax`.
    /// - Inclusive: `total = amount`, `taxable = total / (1 + rate)`, `tax = total - taxable`.
    ///
    /// Arithmetic stays at full precision; the outputs are rounded once.
    ///
    /// # Errors
    ///
    /// Returns `TaxError::NegativeRate` if `tax_percent` is negative.
    pub fn calculate(
        amount: Decimal,
        tax_percent: Decimal,
        mode: TaxMode,
    ) -> Result<TaxSplit, TaxError> {
        if tax_percent < Decimal::ZERO {
            return Err(TaxError::NegativeRate(tax_percent));
        }

        let rate = tax_percent / Decimal::ONE_HUNDRED;

        let split = match mode {
            TaxMode::Exclusive => {
                let taxable_amount = round_money(amount);
                let tax_amount = round_money(amount * rate);
                TaxSplit {
                    taxable_amount,
                    tax_amount,
                    total_amount: taxable_amount + tax_amount,
                }
            }
            TaxMode::Inclusive => {
                let total_amount = round_money(amount);
                let taxable_amount = round_money(amount / (Decimal::ONE + rate));
                TaxSplit {
                    taxable_amount,
                    tax_amount: total_amount - taxable_amount,
                    total_amount,
                }
            }
        };

        Ok(split)
    }

    /// Computes the split of one priced line after discount.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive quantity, a discount outside
    /// 0..=100 percent, or a negative tax rate.
    pub fn line(input: &LineInput) -> Result<TaxSplit, TaxError> {
        if input.quantity <= Decimal::ZERO {
            return Err(TaxError::NonPositiveQuantity(input.quantity));
        }
        if input.discount_percent < Decimal::ZERO || input.discount_percent > Decimal::ONE_HUNDRED
        {
            return Err(TaxError::InvalidDiscount(input.discount_percent));
        }

        let gross = input.quantity * input.unit_price;
        let discounted = gross - gross * input.discount_percent / Decimal::ONE_HUNDRED;

        Self::calculate(discounted, input.tax_percent, input.mode)
    }

    /// Computes every line split and the document totals.
    ///
    /// # Errors
    ///
    /// Returns the first line error encountered.
    pub fn document(lines: &[LineInput]) -> Result<(Vec<TaxSplit>, DocumentTotals), TaxError> {
        let mut totals = DocumentTotals::default();
        let mut splits = Vec::with_capacity(lines.len());

        for line in lines {
            let split = Self::line(line)?;
            totals.add(&split);
            splits.push(split);
        }

        Ok((splits, totals))
    }
}
