//! `SeaORM` Entity for the quotas table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::QuotaStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_id: Uuid,
    pub payment_concept_id: Uuid,
    pub period_year: i32,
    pub period_month: i32,
    pub period_description: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub base_amount: Decimal,
    pub currency_id: Uuid,
    pub issue_date: Date,
    pub due_date: Date,
    pub status: QuotaStatus,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::units::Entity",
        from = "Column::UnitId",
        to = "super::units::Column::Id"
    )]
    Units,
    #[sea_orm(has_many = "super::payment_applications::Entity")]
    PaymentApplications,
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl Related<super::payment_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
