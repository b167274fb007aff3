//! Common types used across the application.

pub mod money;

pub use money::{
    COST_SCALE, MONEY_SCALE, MONEY_TOLERANCE, QUANTITY_SCALE, round_cost, round_money,
    round_quantity, within_tolerance,
};
