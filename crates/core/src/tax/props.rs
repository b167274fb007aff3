//! Property-based tests for the tax calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{TaxCalculator, TaxMode};

/// Strategy to generate amounts (0.01 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate tax percentages (0.00% to 30.00%).
fn tax_percent() -> impl Strategy<Value = Decimal> {
    (0i64..3_000i64).prop_map(|bp| Decimal::new(bp, 2))
}

fn mode() -> impl Strategy<Value = TaxMode> {
    prop_oneof![Just(TaxMode::Exclusive), Just(TaxMode::Inclusive)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* amount, rate and mode, taxable + tax SHALL equal total exactly.
    #[test]
    fn prop_split_components_sum_to_total(
        amount in amount(),
        rate in tax_percent(),
        mode in mode(),
    ) {
        let split = TaxCalculator::calculate(amount, rate, mode).unwrap();
        prop_assert_eq!(split.taxable_amount + split.tax_amount, split.total_amount);
        prop_assert!(split.tax_amount >= Decimal::ZERO);
        prop_assert!(split.total_amount.scale() <= 2);
    }

    /// *For any* exclusive amount, the inclusive split of its total SHALL
    /// reproduce the same taxable base within one cent.
    #[test]
    fn prop_inclusive_inverts_exclusive(
        amount in amount(),
        rate in tax_percent(),
    ) {
        let exclusive = TaxCalculator::calculate(amount, rate, TaxMode::Exclusive).unwrap();
        let inclusive =
            TaxCalculator::calculate(exclusive.total_amount, rate, TaxMode::Inclusive).unwrap();

        prop_assert_eq!(inclusive.total_amount, exclusive.total_amount);
        prop_assert!((inclusive.taxable_amount - exclusive.taxable_amount).abs() <= Decimal::new(1, 2));
    }
}
