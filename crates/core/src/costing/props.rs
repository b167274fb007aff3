//! Property-based tests for the weighted-average fold.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::average::replay;
use super::types::{CostState, MovementType, RecordedMovement};

/// Strategy to generate quantities (0.0001 to 1,000.0000).
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate unit costs (0.000000 to 1,000.000000).
fn unit_cost() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

fn movement_type() -> impl Strategy<Value = MovementType> {
    proptest::sample::select(MovementType::ALL.to_vec())
}

fn movement() -> impl Strategy<Value = RecordedMovement> {
    (movement_type(), quantity(), unit_cost()).prop_map(|(movement_type, quantity, unit_cost)| {
        RecordedMovement {
            movement_type,
            quantity,
            unit_cost,
            value: None,
        }
    })
}

/// Whole-unit receipts keep `quantity * unit_cost` exact at 6 places.
fn receipt() -> impl Strategy<Value = RecordedMovement> {
    ((1i64..1_000i64).prop_map(Decimal::from), unit_cost()).prop_map(|(quantity, unit_cost)| RecordedMovement {
        movement_type: MovementType::Receipt,
        quantity,
        unit_cost,
        value: None,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* history, applying movements one by one and recording the
    /// resolved cost SHALL produce a log whose replay reaches the same state.
    #[test]
    fn prop_replay_reproduces_incremental_state(
        movements in prop::collection::vec(movement(), 1..40),
    ) {
        let mut state = CostState::default();
        let mut log = Vec::with_capacity(movements.len());

        for movement in movements {
            let outcome = state
                .apply(movement.movement_type, movement.quantity, movement.unit_cost)
                .unwrap();
            log.push(RecordedMovement {
                unit_cost: outcome.unit_cost,
                ..movement
            });
            state = outcome.state;
        }

        prop_assert_eq!(replay(log).unwrap(), state);
    }

    /// *For any* history, the ledger quantity SHALL equal the sum of signed
    /// movement quantities.
    #[test]
    fn prop_quantity_is_sum_of_signed_movements(
        movements in prop::collection::vec(movement(), 1..40),
    ) {
        let expected: Decimal = movements
            .iter()
            .map(|m| m.movement_type.signed(m.quantity))
            .sum();
        prop_assert_eq!(replay(movements).unwrap().quantity, expected);
    }

    /// *For any* history ending at or below zero on hand, the value SHALL be zero.
    #[test]
    fn prop_no_value_without_stock(
        movements in prop::collection::vec(movement(), 1..40),
    ) {
        let state = replay(movements).unwrap();
        if state.quantity <= Decimal::ZERO {
            prop_assert_eq!(state.total_value, Decimal::ZERO);
        }
    }

    /// *For any* receipts-only history, the average SHALL lie between the
    /// cheapest and dearest receipt cost.
    #[test]
    fn prop_receipt_average_within_cost_range(
        receipts in prop::collection::vec(receipt(), 1..20),
    ) {
        let min = receipts.iter().map(|r| r.unit_cost).min().unwrap();
        let max = receipts.iter().map(|r| r.unit_cost).max().unwrap();
        let state = replay(receipts).unwrap();

        let slack = Decimal::new(1, 6);
        prop_assert!(state.average_cost >= min - slack);
        prop_assert!(state.average_cost <= max + slack);
    }
}
