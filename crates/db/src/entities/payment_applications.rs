//! `SeaORM` Entity for the payment_applications table.
//!
//! An allocation of part or all of a payment to a specific quota.
//! Rows are hard-deleted when the payment is refunded.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Uuid,
    pub quota_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub applied_amount: Decimal,
    pub registered_by: Uuid,
    pub applied_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::quotas::Entity",
        from = "Column::QuotaId",
        to = "super::quotas::Column::Id"
    )]
    Quotas,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::quotas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
