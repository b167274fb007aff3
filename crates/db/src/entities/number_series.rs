//! `SeaORM` Entity for number_series table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ResetRule, YearFormat};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "number_series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub entity_type: String,
    pub prefix: String,
    pub separator: String,
    pub year_format: YearFormat,
    pub current_value: i64,
    pub reset_rule: ResetRule,
    pub last_reset_year: Option<i32>,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::number_allocation_logs::Entity")]
    NumberAllocationLogs,
}

impl Related<super::number_allocation_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NumberAllocationLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
