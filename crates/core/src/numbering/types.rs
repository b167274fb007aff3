//! Number series domain types.

use serde::{Deserialize, Serialize};

use super::error::NumberingError;

/// Kind of business document a series numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Sales invoice.
    SalesInvoice,
    /// Purchase (supplier) invoice.
    PurchaseInvoice,
    /// Journal entry.
    JournalEntry,
    /// Incoming or outgoing payment.
    Payment,
    /// Stock adjustment.
    StockAdjustment,
    /// Transfer between warehouses.
    StockTransfer,
    /// Sales order.
    SalesOrder,
    /// Purchase order.
    PurchaseOrder,
    /// Goods receipt note.
    GoodsReceipt,
    /// Production order.
    ProductionOrder,
    /// Asset or stock disposal.
    Disposal,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::SalesInvoice,
        Self::PurchaseInvoice,
        Self::JournalEntry,
        Self::Payment,
        Self::StockAdjustment,
        Self::StockTransfer,
        Self::SalesOrder,
        Self::PurchaseOrder,
        Self::GoodsReceipt,
        Self::ProductionOrder,
        Self::Disposal,
    ];

    /// Storage key of the entity type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalesInvoice => "sales_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::JournalEntry => "journal_entry",
            Self::Payment => "payment",
            Self::StockAdjustment => "stock_adjustment",
            Self::StockTransfer => "stock_transfer",
            Self::SalesOrder => "sales_order",
            Self::PurchaseOrder => "purchase_order",
            Self::GoodsReceipt => "goods_receipt",
            Self::ProductionOrder => "production_order",
            Self::Disposal => "disposal",
        }
    }

    /// Prefix used when a series is provisioned automatically.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::SalesInvoice => "INV",
            Self::PurchaseInvoice => "BILL",
            Self::JournalEntry => "JE",
            Self::Payment => "PAY",
            Self::StockAdjustment => "ADJ",
            Self::StockTransfer => "TRF",
            Self::SalesOrder => "SO",
            Self::PurchaseOrder => "PO",
            Self::GoodsReceipt => "GRN",
            Self::ProductionOrder => "MO",
            Self::Disposal => "DSP",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = NumberingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entity| entity.as_str() == s)
            .ok_or_else(|| NumberingError::UnknownEntityType(s.to_string()))
    }
}

/// How the year appears in a formatted number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearFormat {
    /// No year part.
    #[serde(rename = "none")]
    None,
    /// Two-digit year, e.g. `24`.
    #[serde(rename = "YY")]
    Yy,
    /// Four-digit year, e.g. `2024`.
    #[serde(rename = "YYYY")]
    Yyyy,
}

impl YearFormat {
    /// Every year format, in declaration order.
    pub const ALL: [Self; 3] = [Self::None, Self::Yy, Self::Yyyy];

    /// Renders the year part, if any.
    #[must_use]
    pub fn render(self, year: i32) -> Option<String> {
        match self {
            Self::None => None,
            Self::Yy => Some(format!("{:02}", year.rem_euclid(100))),
            Self::Yyyy => Some(format!("{year:04}")),
        }
    }
}

/// When a series counter starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetRule {
    /// The counter never resets.
    Never,
    /// The counter restarts at 1 on the first allocation of a new year.
    Yearly,
}

impl ResetRule {
    /// The rule a series actually follows.
    ///
    /// A number without a year part cannot tell two years apart, so a yearly
    /// reset would reissue numbers already used. Such series never reset.
    #[must_use]
    pub const fn effective(self, year_format: YearFormat) -> Self {
        match (self, year_format) {
            (Self::Yearly, YearFormat::None) => Self::Never,
            (rule, _) => rule,
        }
    }
}

/// Lifecycle of an issued number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AllocationStatus {
    /// Issued, consuming document not yet committed.
    Reserved,
    /// Consuming document committed.
    Confirmed,
    /// Consuming document abandoned.
    Void,
}

impl std::fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Reserved => "RESERVED",
            Self::Confirmed => "CONFIRMED",
            Self::Void => "VOID",
        })
    }
}

/// The formatting part of a number series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFormat {
    /// Leading text, e.g. `INV`.
    pub prefix: String,
    /// Separator between parts, e.g. `-`.
    pub separator: String,
    /// Year rendering.
    pub year_format: YearFormat,
}

/// Definition of a series to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesTemplate {
    /// Entity type numbered by the series.
    pub entity_type: EntityType,
    /// Formatting.
    pub format: SeriesFormat,
    /// Reset rule.
    pub reset_rule: ResetRule,
    /// Counter value before the first allocation.
    pub start_value: i64,
}

impl SeriesTemplate {
    /// The series provisioned when none is active for `entity_type`.
    ///
    /// Prefix from the entity type, `-` separator, four-digit year, yearly
    /// reset, counter starting at 0.
    #[must_use]
    pub fn default_for(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            format: SeriesFormat {
                prefix: entity_type.default_prefix().to_string(),
                separator: "-".to_string(),
                year_format: YearFormat::Yyyy,
            },
            reset_rule: ResetRule::Yearly,
            start_value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_entity_type_round_trips_through_storage_key() {
        for entity in EntityType::ALL {
            assert_eq!(EntityType::from_str(entity.as_str()).unwrap(), entity);
        }
        assert!(EntityType::from_str("widget").is_err());
    }

    #[test]
    fn test_default_prefixes_are_unique() {
        let mut prefixes: Vec<_> = EntityType::ALL.iter().map(|e| e.default_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityType::ALL.len());
    }

    #[test]
    fn test_year_render() {
        assert_eq!(YearFormat::None.render(2024), None);
        assert_eq!(YearFormat::Yy.render(2024).as_deref(), Some("24"));
        assert_eq!(YearFormat::Yy.render(2007).as_deref(), Some("07"));
        assert_eq!(YearFormat::Yyyy.render(2024).as_deref(), Some("2024"));
    }

    #[test]
    fn test_yearly_reset_needs_a_year_part() {
        assert_eq!(ResetRule::Yearly.effective(YearFormat::None), ResetRule::Never);
        assert_eq!(ResetRule::Yearly.effective(YearFormat::Yy), ResetRule::Yearly);
        assert_eq!(ResetRule::Yearly.effective(YearFormat::Yyyy), ResetRule::Yearly);
        for format in YearFormat::ALL {
            assert_eq!(ResetRule::Never.effective(format), ResetRule::Never);
        }
    }

    #[test]
    fn test_default_template() {
        let template = SeriesTemplate::default_for(EntityType::SalesInvoice);
        assert_eq!(template.format.prefix, "INV");
        assert_eq!(template.format.year_format, YearFormat::Yyyy);
        assert_eq!(template.reset_rule, ResetRule::Yearly);
        assert_eq!(template.start_value, 0);
    }
}
