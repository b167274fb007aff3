//! Weighted-average cost fold.
//!
//! Every movement updates `(quantity, total_value, average_cost)` as follows:
//!
//! - `new_quantity = quantity + signed_quantity`
//! - incoming: `new_value = total_value + quantity * unit_cost`, or the
//!   exact booked value when the movement carries one
//! - outgoing: `new_value = total_value - quantity * average_cost`
//! - if `new_quantity <= 0` the value is cleared and the average is kept,
//!   otherwise `new_average = new_value / new_quantity`
//!
//! Values and averages are rounded to 6 decimal places, quantities to 4.
//! The database ledger applies the same expressions in one `UPDATE`.

use rust_decimal::Decimal;

use folio_shared::types::{round_cost, round_quantity};

use super::error::CostingError;
use super::types::{CostState, Direction, MovementOutcome, MovementType, RecordedMovement};

/// Resolves the unit cost recorded on a movement.
///
/// An explicit `hint` always wins. Otherwise outgoing movements use the
/// current ledger average and incoming movements fall back to the item's
/// master cost price.
///
/// # Errors
///
/// Returns `CostingError::NegativeUnitCost` for a negative hint and
/// `CostingError::MissingUnitCost` when an incoming movement has no source.
pub fn resolve_unit_cost(
    direction: Direction,
    hint: Option<Decimal>,
    average_cost: Decimal,
    master_cost: Option<Decimal>,
    item_id: uuid::Uuid,
) -> Result<Decimal, CostingError> {
    if let Some(cost) = hint {
        if cost < Decimal::ZERO {
            return Err(CostingError::NegativeUnitCost(cost));
        }
        return Ok(round_cost(cost));
    }

    match direction {
        Direction::Out => Ok(average_cost),
        Direction::In => master_cost
            .map(round_cost)
            .ok_or(CostingError::MissingUnitCost(item_id)),
    }
}

impl CostState {
    /// Applies one movement and returns the resulting state.
    ///
    /// `unit_cost` is the resolved cost (see [`resolve_unit_cost`]). It values
    /// incoming stock; outgoing stock always leaves at the current average.
    ///
    /// # Errors
    ///
    /// Returns `CostingError::NonPositiveQuantity` if `quantity <= 0` and
    /// `CostingError::NegativeUnitCost` if `unit_cost < 0`.
    pub fn apply(
        &self,
        movement_type: MovementType,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> Result<MovementOutcome, CostingError> {
        self.apply_valued(movement_type, quantity, unit_cost, None)
    }

    /// Like [`CostState::apply`], but an incoming movement adds `value`
    /// instead of `quantity * unit_cost` when one is given. Outgoing
    /// movements ignore it.
    ///
    /// # Errors
    ///
    /// Same as [`CostState::apply`], plus `CostingError::NegativeUnitCost`
    /// for a negative value.
    pub fn apply_valued(
        &self,
        movement_type: MovementType,
        quantity: Decimal,
        unit_cost: Decimal,
        value: Option<Decimal>,
    ) -> Result<MovementOutcome, CostingError> {
        let quantity = round_quantity(quantity);
        if quantity <= Decimal::ZERO {
            return Err(CostingError::NonPositiveQuantity(quantity));
        }
        if unit_cost < Decimal::ZERO {
            return Err(CostingError::NegativeUnitCost(unit_cost));
        }
        if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
            return Err(CostingError::NegativeUnitCost(value));
        }

        let signed_quantity = movement_type.signed(quantity);
        let new_quantity = self.quantity + signed_quantity;

        let (total_cost, raw_value) = match movement_type.direction() {
            Direction::In => {
                let delta = round_cost(value.unwrap_or(quantity * unit_cost));
                (delta, self.total_value + delta)
            }
            Direction::Out => {
                let delta = round_cost(quantity * self.average_cost);
                (delta, self.total_value - delta)
            }
        };

        let state = if new_quantity <= Decimal::ZERO {
            // Stockout: nothing left to value, keep the last known average.
            CostState {
                quantity: new_quantity,
                total_value: Decimal::ZERO,
                average_cost: self.average_cost,
            }
        } else {
            CostState {
                quantity: new_quantity,
                total_value: raw_value,
                average_cost: round_cost(raw_value / new_quantity),
            }
        };

        Ok(MovementOutcome {
            state,
            signed_quantity,
            unit_cost,
            total_cost,
        })
    }
}

/// Rebuilds a ledger state from its movement history, oldest first.
///
/// Outgoing movements are re-costed at the running average, so replaying the
/// history of a ledger reproduces the stored state exactly.
///
/// # Errors
///
/// Returns the first error raised by [`CostState::apply`].
pub fn replay<I>(movements: I) -> Result<CostState, CostingError>
where
    I: IntoIterator<Item = RecordedMovement>,
{
    movements
        .into_iter()
        .try_fold(CostState::default(), |state, movement| {
            state
                .apply_valued(
                    movement.movement_type,
                    movement.quantity,
                    movement.unit_cost,
                    movement.value,
                )
                .map(|outcome| outcome.state)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn receipt(quantity: Decimal, unit_cost: Decimal) -> RecordedMovement {
        RecordedMovement {
            movement_type: MovementType::Receipt,
            quantity,
            unit_cost,
            value: None,
        }
    }

    fn issue(quantity: Decimal) -> RecordedMovement {
        RecordedMovement {
            movement_type: MovementType::Issue,
            quantity,
            unit_cost: Decimal::ZERO,
            value: None,
        }
    }

    #[test]
    fn test_two_receipts_average() {
        let state = replay([receipt(dec!(10), dec!(10)), receipt(dec!(10), dec!(20))]).unwrap();
        assert_eq!(state.quantity, dec!(20));
        assert_eq!(state.total_value, dec!(300));
        assert_eq!(state.average_cost, dec!(15));
    }

    #[test]
    fn test_issue_leaves_at_average() {
        let state = CostState {
            quantity: dec!(20),
            total_value: dec!(300),
            average_cost: dec!(15),
        };
        let outcome = state.apply(MovementType::Issue, dec!(5), dec!(15)).unwrap();
        assert_eq!(outcome.signed_quantity, dec!(-5));
        assert_eq!(outcome.total_cost, dec!(75));
        assert_eq!(outcome.state.quantity, dec!(15));
        assert_eq!(outcome.state.total_value, dec!(225));
        assert_eq!(outcome.state.average_cost, dec!(15));
    }

    #[test]
    fn test_outgoing_cost_override_does_not_change_valuation() {
        let state = CostState {
            quantity: dec!(10),
            total_value: dec!(100),
            average_cost: dec!(10),
        };
        let outcome = state.apply(MovementType::Issue, dec!(4), dec!(99)).unwrap();
        assert_eq!(outcome.unit_cost, dec!(99));
        assert_eq!(outcome.total_cost, dec!(40));
        assert_eq!(outcome.state.total_value, dec!(60));
    }

    #[test]
    fn test_stockout_clamps_value_and_keeps_average() {
        let state = CostState {
            quantity: dec!(10),
            total_value: dec!(100),
            average_cost: dec!(10),
        };
        let outcome = state.apply(MovementType::Issue, dec!(15), dec!(10)).unwrap();
        assert_eq!(outcome.state.quantity, dec!(-5));
        assert_eq!(outcome.state.total_value, Decimal::ZERO);
        assert_eq!(outcome.state.average_cost, dec!(10));
    }

    #[test]
    fn test_exact_depletion_clears_value() {
        let state = replay([receipt(dec!(3), dec!(3.333333)), issue(dec!(3))]).unwrap();
        assert_eq!(state.quantity, Decimal::ZERO);
        assert_eq!(state.total_value, Decimal::ZERO);
        assert_eq!(state.average_cost, dec!(3.333333));
    }

    #[test]
    fn test_valued_receipt_keeps_exact_total() {
        let valued = RecordedMovement {
            value: Some(dec!(10.00)),
            ..receipt(dec!(3), dec!(3.333333))
        };
        let state = replay([valued]).unwrap();
        assert_eq!(state.total_value, dec!(10.00));
        assert_eq!(state.average_cost, dec!(3.333333));

        let outcome = state.apply_valued(MovementType::Issue, dec!(3), dec!(0), Some(dec!(99))).unwrap();
        assert_eq!(outcome.total_cost, dec!(9.999999));
        assert_eq!(outcome.state.total_value, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_negative_value() {
        let result = CostState::default().apply_valued(MovementType::Receipt, dec!(1), dec!(1), Some(dec!(-1)));
        assert!(matches!(result, Err(CostingError::NegativeUnitCost(_))));
    }

    #[test]
    fn test_average_rounded_to_six_places() {
        let state = replay([receipt(dec!(3), dec!(10)), receipt(dec!(0.0001), dec!(0))]).unwrap();
        assert_eq!(state.average_cost, dec!(9.999667));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let result = CostState::default().apply(MovementType::Receipt, dec!(0), dec!(1));
        assert!(matches!(result, Err(CostingError::NonPositiveQuantity(_))));
    }

    #[test]
    fn test_resolve_unit_cost() {
        let item = Uuid::nil();
        assert_eq!(
            resolve_unit_cost(Direction::In, Some(dec!(4.5)), dec!(9), Some(dec!(7)), item).unwrap(),
            dec!(4.5)
        );
        assert_eq!(
            resolve_unit_cost(Direction::Out, None, dec!(9), Some(dec!(7)), item).unwrap(),
            dec!(9)
        );
        assert_eq!(
            resolve_unit_cost(Direction::In, None, dec!(9), Some(dec!(7)), item).unwrap(),
            dec!(7)
        );
        assert!(matches!(
            resolve_unit_cost(Direction::In, None, dec!(9), None, item),
            Err(CostingError::MissingUnitCost(_))
        ));
        assert!(matches!(
            resolve_unit_cost(Direction::In, Some(dec!(-1)), dec!(9), None, item),
            Err(CostingError::NegativeUnitCost(_))
        ));
    }
}
