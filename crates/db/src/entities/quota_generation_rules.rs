//! `SeaORM` Entity for the quota_generation_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "quota_generation_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub building_id: Option<Uuid>,
    pub payment_concept_id: Uuid,
    pub quota_formula_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub effective_from: Date,
    pub effective_to: Option<Date>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text", nullable)]
    pub update_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::condominiums::Entity",
        from = "Column::CondominiumId",
        to = "super::condominiums::Column::Id"
    )]
    Condominiums,
    #[sea_orm(
        belongs_to = "super::quota_formulas::Entity",
        from = "Column::QuotaFormulaId",
        to = "super::quota_formulas::Column::Id"
    )]
    QuotaFormulas,
    #[sea_orm(has_many = "super::quota_generation_schedules::Entity")]
    QuotaGenerationSchedules,
}

impl Related<super::condominiums::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Condominiums.def()
    }
}

impl Related<super::quota_formulas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaFormulas.def()
    }
}

impl Related<super::quota_generation_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaGenerationSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
