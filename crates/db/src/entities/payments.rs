//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMethod, PaymentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_number: String,
    pub user_id: Uuid,
    pub unit_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount: Decimal,
    pub currency_id: Uuid,
    pub payment_method: PaymentMethod,
    pub payment_date: Date,
    pub status: PaymentStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub verification_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub refund_reason: Option<String>,
    pub refunded_by: Option<Uuid>,
    pub refunded_at: Option<DateTimeWithTimeZone>,
    pub registered_by: Uuid,
    pub registered_at: DateTimeWithTimeZone,
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
