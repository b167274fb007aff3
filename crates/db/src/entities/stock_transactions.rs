//! `SeaORM` Entity for stock_transactions table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Insertion order; identity column filled by the database.
    pub seq: i64,
    pub company_id: Uuid,
    pub ledger_id: Uuid,
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub movement_type: MovementType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub uom: String,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub total_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub balance_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub balance_average_cost: Decimal,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub posting_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_ledgers::Entity",
        from = "Column::LedgerId",
        to = "super::stock_ledgers::Column::Id"
    )]
    StockLedgers,
}

impl Related<super::stock_ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLedgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
