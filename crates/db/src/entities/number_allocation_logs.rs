//! `SeaORM` Entity for number_allocation_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AllocationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "number_allocation_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub series_id: Uuid,
    pub entity_type: String,
    pub generated_number: String,
    pub counter_value: i64,
    pub status: AllocationStatus,
    pub entity_id: Option<Uuid>,
    pub allocated_at: DateTimeWithTimeZone,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub voided_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::number_series::Entity",
        from = "Column::SeriesId",
        to = "super::number_series::Column::Id"
    )]
    NumberSeries,
}

impl Related<super::number_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NumberSeries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
