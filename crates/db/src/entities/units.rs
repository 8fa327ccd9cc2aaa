//! `SeaORM` Entity for the units table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub building_id: Uuid,
    pub unit_number: String,
    pub floor: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub area_m2: Decimal,
    pub parking_spaces: i32,
    #[sea_orm(column_type = "Decimal(Some((8, 4)))")]
    pub aliquot_percentage: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::buildings::Entity",
        from = "Column::BuildingId",
        to = "super::buildings::Column::Id"
    )]
    Buildings,
    #[sea_orm(has_many = "super::quotas::Entity")]
    Quotas,
}

impl Related<super::buildings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buildings.def()
    }
}

impl Related<super::quotas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
