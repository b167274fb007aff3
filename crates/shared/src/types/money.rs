//! Decimal precision rules for money, quantities and unit costs.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Intermediate results keep full `Decimal` precision; rounding happens only
//! where a value is output or persisted.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of monetary outputs (invoice totals, journal lines).
pub const MONEY_SCALE: u32 = 2;

/// Decimal places of inventory quantities.
pub const QUANTITY_SCALE: u32 = 4;

/// Decimal places of unit costs and inventory values.
pub const COST_SCALE: u32 = 6;

/// Absolute tolerance when comparing debit and credit totals.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds a monetary amount to 2 decimal places using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a unit cost or inventory value to 6 decimal places.
///
/// Rounds half away from zero so the result matches Postgres `ROUND(numeric, 6)`.
#[must_use]
pub fn round_cost(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an inventory quantity to 4 decimal places.
#[must_use]
pub fn round_quantity(quantity: Decimal) -> Decimal {
    quantity.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if two amounts differ by no more than [`MONEY_TOLERANCE`].
#[must_use]
pub fn within_tolerance(left: Decimal, right: Decimal) -> bool {
    (left - right).abs() <= MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(MONEY_TOLERANCE, dec!(0.01));
    }

    #[rstest]
    #[case(dec!(2.345), dec!(2.34))]
    #[case(dec!(2.355), dec!(2.36))]
    #[case(dec!(95.238095238), dec!(95.24))]
    fn test_round_money_bankers(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_cost_half_away_from_zero() {
        assert_eq!(round_cost(dec!(1.0000005)), dec!(1.000001));
        assert_eq!(round_cost(dec!(-1.0000005)), dec!(-1.000001));
        assert_eq!(round_cost(dec!(33.3333333333)), dec!(33.333333));
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(dec!(1.23455)), dec!(1.2346));
    }

    #[test]
    fn test_within_tolerance() {
        assert!(within_tolerance(dec!(100.00), dec!(100.01)));
        assert!(within_tolerance(dec!(100.01), dec!(100.00)));
        assert!(!within_tolerance(dec!(100.00), dec!(100.02)));
    }
}
