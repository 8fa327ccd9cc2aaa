//! `SeaORM` Entity for the quota_generation_schedules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FrequencyType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "quota_generation_schedules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quota_generation_rule_id: Uuid,
    pub name: String,
    pub frequency_type: FrequencyType,
    /// Day of month quotas are issued on (clamped into short months).
    pub issue_day: i32,
    /// Day of month quotas fall due on (clamped into short months).
    pub due_day: i32,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quota_generation_rules::Entity",
        from = "Column::QuotaGenerationRuleId",
        to = "super::quota_generation_rules::Column::Id"
    )]
    QuotaGenerationRules,
}

impl Related<super::quota_generation_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaGenerationRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
