//! Costing domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a movement adds or removes stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock comes in.
    In,
    /// Stock goes out.
    Out,
}

/// Type of stock movement. The direction is implied by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received from a supplier.
    Receipt,
    /// Goods issued to a customer.
    Issue,
    /// Incoming leg of a warehouse transfer.
    TransferIn,
    /// Outgoing leg of a warehouse transfer.
    TransferOut,
    /// Positive stock adjustment.
    AdjustmentIn,
    /// Negative stock adjustment.
    AdjustmentOut,
    /// Customer return.
    ReturnIn,
    /// Return to supplier.
    ReturnOut,
    /// Finished goods from production.
    ProductionIn,
    /// Components consumed by production.
    ProductionOut,
}

impl MovementType {
    /// Every movement type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Receipt,
        Self::Issue,
        Self::TransferIn,
        Self::TransferOut,
        Self::AdjustmentIn,
        Self::AdjustmentOut,
        Self::ReturnIn,
        Self::ReturnOut,
        Self::ProductionIn,
        Self::ProductionOut,
    ];

    /// Direction of the movement.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Receipt
            | Self::TransferIn
            | Self::AdjustmentIn
            | Self::ReturnIn
            | Self::ProductionIn => Direction::In,
            Self::Issue
            | Self::TransferOut
            | Self::AdjustmentOut
            | Self::ReturnOut
            | Self::ProductionOut => Direction::Out,
        }
    }

    /// Applies the movement's sign to a positive quantity.
    #[must_use]
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self.direction() {
            Direction::In => quantity,
            Direction::Out => -quantity,
        }
    }
}

/// Running valuation of one (company, warehouse, item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostState {
    /// Quantity on hand (may be negative after over-issuing).
    pub quantity: Decimal,
    /// Total inventory value. Never negative.
    pub total_value: Decimal,
    /// Weighted-average unit cost.
    pub average_cost: Decimal,
}

/// Result of applying one movement to a [`CostState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementOutcome {
    /// State after the movement.
    pub state: CostState,
    /// Quantity with the movement's sign applied.
    pub signed_quantity: Decimal,
    /// Unit cost recorded on the movement.
    pub unit_cost: Decimal,
    /// Value added to (incoming) or removed from (outgoing) the ledger.
    pub total_cost: Decimal,
}

/// One persisted movement, as needed to replay a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedMovement {
    /// Movement type.
    pub movement_type: MovementType,
    /// Positive quantity.
    pub quantity: Decimal,
    /// Unit cost recorded at the time of the movement.
    pub unit_cost: Decimal,
    /// Exact booked value of an incoming movement, when it has one.
    pub value: Option<Decimal>,
}
