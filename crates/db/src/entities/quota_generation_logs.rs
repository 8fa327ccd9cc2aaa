//! `SeaORM` Entity for the quota_generation_logs table.
//!
//! One immutable row per generation run, including a frozen snapshot of
//! the formula's shape at run time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{GenerationMethod, GenerationStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quota_generation_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub generation_rule_id: Option<Uuid>,
    pub generation_schedule_id: Option<Uuid>,
    pub quota_formula_id: Option<Uuid>,
    pub generation_method: GenerationMethod,
    pub period_year: i32,
    pub period_month: i32,
    pub period_description: String,
    pub quotas_created: i32,
    pub quotas_failed: i32,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    pub currency_id: Uuid,
    /// JSON array of the unit ids that received a quota.
    pub units_affected: Option<Json>,
    /// Run parameters: schedule/rule/formula ids and computed dates.
    pub parameters: Option<Json>,
    /// Frozen snapshot of the formula's defining fields at run time.
    pub formula_snapshot: Option<Json>,
    pub status: GenerationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_details: Option<String>,
    pub generated_by: Uuid,
    pub generated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quota_generation_rules::Entity",
        from = "Column::GenerationRuleId",
        to = "super::quota_generation_rules::Column::Id"
    )]
    QuotaGenerationRules,
    #[sea_orm(
        belongs_to = "super::quota_generation_schedules::Entity",
        from = "Column::GenerationScheduleId",
        to = "super::quota_generation_schedules::Column::Id"
    )]
    QuotaGenerationSchedules,
}

impl Related<super::quota_generation_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaGenerationRules.def()
    }
}

impl Related<super::quota_generation_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuotaGenerationSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
