//! `SeaORM` entity definitions for the billing schema.

pub mod buildings;
pub mod condominiums;
pub mod payment_applications;
pub mod payments;
pub mod quota_formulas;
pub mod quota_generation_logs;
pub mod quota_generation_rules;
pub mod quota_generation_schedules;
pub mod quotas;
pub mod sea_orm_active_enums;
pub mod units;
