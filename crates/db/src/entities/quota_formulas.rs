//! `SeaORM` Entity for the quota_formulas table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FormulaType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quota_formulas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub formula_type: FormulaType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub fixed_amount: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub expression: Option<String>,
    pub variables: Option<Json>,
    pub unit_amounts: Option<Json>,
    pub currency_id: Uuid,
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
    #[sea_orm(has_many = "super::quota_generation_rules::Entity")]
    QuotaGenerationRules,
}

impl Related<super::condominiums::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Condominiums.def()
    }
}

impl Related<super::quota_generation_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaGenerationRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
