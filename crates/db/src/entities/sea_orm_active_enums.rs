//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! Each enum converts to and from its `folio-core` counterpart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use folio_core::{costing, ledger, numbering, receivables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_type")]
pub enum PartyType {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "supplier")]
    Supplier,
    #[sea_orm(string_value = "both")]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "year_format")]
pub enum YearFormat {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "YY")]
    Yy,
    #[sea_orm(string_value = "YYYY")]
    Yyyy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reset_rule")]
pub enum ResetRule {
    #[sea_orm(string_value = "never")]
    Never,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "allocation_status")]
pub enum AllocationStatus {
    #[sea_orm(string_value = "RESERVED")]
    Reserved,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "VOID")]
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_type")]
pub enum MovementType {
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "issue")]
    Issue,
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    #[sea_orm(string_value = "adjustment_in")]
    AdjustmentIn,
    #[sea_orm(string_value = "adjustment_out")]
    AdjustmentOut,
    #[sea_orm(string_value = "return_in")]
    ReturnIn,
    #[sea_orm(string_value = "return_out")]
    ReturnOut,
    #[sea_orm(string_value = "production_in")]
    ProductionIn,
    #[sea_orm(string_value = "production_out")]
    ProductionOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
pub enum JournalStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_kind")]
pub enum InvoiceKind {
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "issued")]
    Issued,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_kind")]
pub enum PaymentKind {
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "disbursement")]
    Disbursement,
}

// ============================================================
// Conversions to and from core types
// ============================================================

macro_rules! mirror_enum {
    ($db:ident <=> $module:ident::$core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$module::$core> for $db {
            fn from(value: $module::$core) -> Self {
                match value {
                    $($module::$core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $module::$core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(YearFormat <=> numbering::YearFormat { None, Yy, Yyyy });
mirror_enum!(ResetRule <=> numbering::ResetRule { Never, Yearly });
mirror_enum!(AllocationStatus <=> numbering::AllocationStatus { Reserved, Confirmed, Void });
mirror_enum!(MovementType <=> costing::MovementType {
    Receipt,
    Issue,
    TransferIn,
    TransferOut,
    AdjustmentIn,
    AdjustmentOut,
    ReturnIn,
    ReturnOut,
    ProductionIn,
    ProductionOut,
});
mirror_enum!(JournalStatus <=> ledger::JournalStatus { Draft, Posted, Reversed });
mirror_enum!(InvoiceKind <=> receivables::InvoiceKind { Sales, Purchase });
mirror_enum!(InvoiceStatus <=> receivables::InvoiceStatus {
    Draft,
    Issued,
    Partial,
    Completed,
    Cancelled,
});
mirror_enum!(OrderStatus <=> receivables::OrderStatus {
    Draft,
    Confirmed,
    Invoiced,
    Completed,
    Cancelled,
});
mirror_enum!(PaymentKind <=> receivables::PaymentKind { Receipt, Disbursement });
