//! `SeaORM` Entity for stock_ledgers table.
//!
//! One row per (company, warehouse, item). The row is a cache of the
//! movement history in `stock_transactions`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_reserved: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_available: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub total_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub average_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub last_unit_cost: Decimal,
    pub last_purchase_at: Option<DateTimeWithTimeZone>,
    pub last_sale_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_transactions::Entity")]
    StockTransactions,
}

impl Related<super::stock_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
