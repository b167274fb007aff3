//! Document number series.
//!
//! Rules for turning a counter value into a formatted document number:
//! - Series formats (prefix, separator, year part, zero padding)
//! - Yearly counter reset, for series whose numbers carry a year
//! - Default series provisioned for an entity type with no active series
//!
//! The atomic increment itself lives in the database layer.

pub mod error;
pub mod format;
pub mod types;

pub use error::NumberingError;
pub use format::{format_number, number_year};
pub use types::{AllocationStatus, EntityType, ResetRule, SeriesFormat, SeriesTemplate, YearFormat};
