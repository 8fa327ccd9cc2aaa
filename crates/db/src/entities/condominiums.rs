//! `SeaORM` Entity for the condominiums table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "condominiums")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::buildings::Entity")]
    Buildings,
    #[sea_orm(has_many = "super::quota_formulas::Entity")]
    QuotaFormulas,
}

impl Related<super::buildings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buildings.def()
    }
}

impl Related<super::quota_formulas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaFormulas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
