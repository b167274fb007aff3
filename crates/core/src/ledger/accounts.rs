//! Default GL account mappings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

/// Closed set of default mapping keys used by business workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingKey {
    /// Accounts receivable control account.
    DefaultReceivable,
    /// Accounts payable control account.
    DefaultPayable,
    /// Sales revenue.
    DefaultSales,
    /// Cost of goods sold.
    DefaultCogs,
    /// Inventory asset.
    DefaultInventory,
    /// Output tax owed.
    DefaultTaxPayable,
    /// Input tax recoverable.
    DefaultTaxReceivable,
    /// Cash or bank.
    DefaultCash,
    /// Inventory write-up/write-down.
    DefaultInventoryAdjustment,
}

impl MappingKey {
    /// Every mapping key.
    pub const ALL: [Self; 9] = [
        Self::DefaultReceivable,
        Self::DefaultPayable,
        Self::DefaultSales,
        Self::DefaultCogs,
        Self::DefaultInventory,
        Self::DefaultTaxPayable,
        Self::DefaultTaxReceivable,
        Self::DefaultCash,
        Self::DefaultInventoryAdjustment,
    ];

    /// Storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DefaultReceivable => "DEFAULT_RECEIVABLE",
            Self::DefaultPayable => "DEFAULT_PAYABLE",
            Self::DefaultSales => "DEFAULT_SALES",
            Self::DefaultCogs => "DEFAULT_COGS",
            Self::DefaultInventory => "DEFAULT_INVENTORY",
            Self::DefaultTaxPayable => "DEFAULT_TAX_PAYABLE",
            Self::DefaultTaxReceivable => "DEFAULT_TAX_RECEIVABLE",
            Self::DefaultCash => "DEFAULT_CASH",
            Self::DefaultInventoryAdjustment => "DEFAULT_INVENTORY_ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for MappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MappingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown mapping key: {s}"))
    }
}

/// Default accounts of one company, resolved once per unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlAccounts {
    /// Accounts receivable.
    pub receivable: Uuid,
    /// Accounts payable.
    pub payable: Uuid,
    /// Sales revenue.
    pub sales: Uuid,
    /// Cost of goods sold.
    pub cogs: Uuid,
    /// Inventory asset.
    pub inventory: Uuid,
    /// Output tax.
    pub tax_payable: Uuid,
    /// Input tax.
    pub tax_receivable: Uuid,
    /// Cash.
    pub cash: Uuid,
    /// Inventory adjustment.
    pub inventory_adjustment: Uuid,
}

impl GlAccounts {
    /// Builds the struct from stored `(key, account)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingAccountMapping` naming the first key
    /// without an account.
    pub fn from_mappings<I>(mappings: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (MappingKey, Uuid)>,
    {
        let map: HashMap<MappingKey, Uuid> = mappings.into_iter().collect();
        let get = |key: MappingKey| {
            map.get(&key)
                .copied()
                .ok_or(LedgerError::MissingAccountMapping(key))
        };

        Ok(Self {
            receivable: get(MappingKey::DefaultReceivable)?,
            payable: get(MappingKey::DefaultPayable)?,
            sales: get(MappingKey::DefaultSales)?,
            cogs: get(MappingKey::DefaultCogs)?,
            inventory: get(MappingKey::DefaultInventory)?,
            tax_payable: get(MappingKey::DefaultTaxPayable)?,
            tax_receivable: get(MappingKey::DefaultTaxReceivable)?,
            cash: get(MappingKey::DefaultCash)?,
            inventory_adjustment: get(MappingKey::DefaultInventoryAdjustment)?,
        })
    }

    /// Account mapped to `key`.
    #[must_use]
    pub const fn account(&self, key: MappingKey) -> Uuid {
        match key {
            MappingKey::DefaultReceivable => self.receivable,
            MappingKey::DefaultPayable => self.payable,
            MappingKey::DefaultSales => self.sales,
            MappingKey::DefaultCogs => self.cogs,
            MappingKey::DefaultInventory => self.inventory,
            MappingKey::DefaultTaxPayable => self.tax_payable,
            MappingKey::DefaultTaxReceivable => self.tax_receivable,
            MappingKey::DefaultCash => self.cash,
            MappingKey::DefaultInventoryAdjustment => self.inventory_adjustment,
        }
    }
}
