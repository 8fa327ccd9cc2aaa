//! Charge-generation engine.
//!
//! Expands a generation schedule into per-unit quotas for one billing
//! period. Amounts are pre-computed outside any transaction; all writes
//! (quotas plus the audit log) happen in a single transaction with an
//! in-transaction duplicate re-check per unit.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::{Value, json};
use uuid::Uuid;

use strata_core::billing::{BillingError, BillingPeriod, RunTally};
use strata_core::formula::FormulaEvaluator;

use crate::entities::{
    quota_formulas, quota_generation_logs, quota_generation_rules, quota_generation_schedules,
    quotas, units,
    sea_orm_active_enums::{GenerationMethod, QuotaStatus},
};
use crate::repositories::formula::{formula_to_domain, unit_to_domain};
use crate::repositories::unit::{UnitError, UnitRepository};

/// Error types for charge generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Schedule not found.
    #[error("Schedule not found: {0}")]
    ScheduleNotFound(Uuid),

    /// Generation rule missing or inactive.
    #[error("Generation rule not found or inactive: {0}")]
    RuleNotAvailable(Uuid),

    /// Formula missing or inactive.
    #[error("Formula not found or inactive: {0}")]
    FormulaNotAvailable(Uuid),

    /// The rule's scope contains no active units.
    #[error("No units found in scope")]
    NoUnitsInScope,

    /// Invalid billing period.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UnitError> for GenerationError {
    fn from(err: UnitError) -> Self {
        match err {
            // Scope resolution only lists; a missing-unit error cannot
            // name a unit the rule asked for.
            UnitError::NotFound(_) => Self::NoUnitsInScope,
            UnitError::Database(e) => Self::Database(e),
        }
    }
}

impl GenerationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ScheduleNotFound(_) => 404,
            Self::RuleNotAvailable(_)
            | Self::FormulaNotAvailable(_)
            | Self::NoUnitsInScope
            | Self::Billing(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ScheduleNotFound(_) => "NOT_FOUND",
            Self::RuleNotAvailable(_)
            | Self::FormulaNotAvailable(_)
            | Self::NoUnitsInScope
            | Self::Billing(_) => "BAD_REQUEST",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateQuotasInput {
    /// Schedule to expand.
    pub schedule_id: Uuid,
    /// Billing period year.
    pub period_year: i32,
    /// Billing period month (1-12).
    pub period_month: u32,
    /// How the run was triggered.
    pub method: GenerationMethod,
    /// User (or scheduler principal) running the generation.
    pub generated_by: Uuid,
}

/// Aggregate result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Quotas created in this run.
    pub quotas_created: u32,
    /// Units that failed evaluation or insertion.
    pub quotas_failed: u32,
    /// Sum of the created quota amounts.
    pub total_amount: Decimal,
    /// Id of the generation log row for this run.
    pub log_id: Uuid,
}

/// Batch charge-generation engine.
///
/// A run is synchronous and linear in the number of units in scope. The
/// in-transaction duplicate re-check needs at least read-committed
/// isolation to suppress duplicates; no advisory lock is taken, so
/// callers that need exactly-once generation must serialize invocations
/// per (schedule, period) themselves.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    db: DatabaseConnection,
    units: UnitRepository,
}

impl GenerationEngine {
    /// Creates a new generation engine.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let units = UnitRepository::new(db.clone());
        Self { db, units }
    }

    /// Generates quotas for one schedule and billing period.
    ///
    /// Per-unit evaluation and insertion failures are downgraded to
    /// diagnostics on the generation log and never abort the batch;
    /// only a failure writing the log itself rolls the run back.
    ///
    /// # Errors
    ///
    /// Returns an error when the schedule is missing, the rule or
    /// formula is missing/inactive, the scope is empty, the period is
    /// invalid, or a shared write fails.
    pub async fn generate_for_schedule(
        &self,
        input: GenerateQuotasInput,
    ) -> Result<GenerationOutcome, GenerationError> {
        let schedule = quota_generation_schedules::Entity::find_by_id(input.schedule_id)
            .one(&self.db)
            .await?
            .ok_or(GenerationError::ScheduleNotFound(input.schedule_id))?;

        let rule = quota_generation_rules::Entity::find_by_id(schedule.quota_generation_rule_id)
            .one(&self.db)
            .await?
            .filter(|rule| rule.is_active)
            .ok_or(GenerationError::RuleNotAvailable(
                schedule.quota_generation_rule_id,
            ))?;

        let formula = quota_formulas::Entity::find_by_id(rule.quota_formula_id)
            .one(&self.db)
            .await?
            .filter(|formula| formula.is_active)
            .ok_or(GenerationError::FormulaNotAvailable(rule.quota_formula_id))?;

        let scope = match rule.building_id {
            Some(building_id) => self.units.list_active_by_building(building_id).await?,
            None => {
                self.units
                    .list_active_by_condominium(rule.condominium_id)
                    .await?
            }
        };
        if scope.is_empty() {
            return Err(GenerationError::NoUnitsInScope);
        }

        let period = BillingPeriod::new(input.period_year, input.period_month)?;
        let issue_date = period.date_with_day(day_of_month(schedule.issue_day));
        let due_date = period.date_with_day(day_of_month(schedule.due_day));
        let period_description = period.description();

        // Pre-compute phase: read-only, outside any transaction. A
        // single unit's failure never aborts the batch.
        let mut tally = RunTally::new();
        let domain_formula = formula_to_domain(&formula);
        let no_extra_variables = BTreeMap::new();
        let mut computed: Vec<(units::Model, Decimal)> = Vec::with_capacity(scope.len());
        for unit in scope {
            let evaluated = domain_formula.as_ref().map_err(Clone::clone).and_then(|f| {
                FormulaEvaluator::evaluate(f, &unit_to_domain(&unit), &no_extra_variables)
            });
            match evaluated {
                Ok(result) => computed.push((unit, result.amount)),
                Err(err) => {
                    tracing::error!(
                        unit_id = %unit.id,
                        error = %err,
                        "failed to calculate amount for unit"
                    );
                    tally.record_failure(unit.id, &err.to_string());
                }
            }
        }

        // Write phase: one transaction for all quotas plus the log.
        let txn = self.db.begin().await?;

        for (unit, amount) in computed {
            match insert_quota(
                &txn,
                &rule,
                &formula,
                &unit,
                amount,
                &input,
                period,
                issue_date,
                due_date,
                &period_description,
            )
            .await
            {
                Ok(true) => tally.record_created(unit.id, amount),
                // An equivalent quota already exists; skip silently.
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(
                        unit_id = %unit.id,
                        error = %err,
                        "failed to create quota for unit"
                    );
                    tally.record_failure(unit.id, &err.to_string());
                }
            }
        }

        // A log-write failure propagates and rolls back the whole run.
        let log = insert_log(
            &txn,
            &schedule,
            &rule,
            &formula,
            &input,
            period,
            issue_date,
            due_date,
            &period_description,
            &tally,
        )
        .await?;

        txn.commit().await?;

        tracing::info!(
            log_id = %log.id,
            quotas_created = tally.created(),
            quotas_failed = tally.failed(),
            status = %tally.status(),
            "generation run finished"
        );

        Ok(GenerationOutcome {
            quotas_created: tally.created(),
            quotas_failed: tally.failed(),
            total_amount: tally.total_amount(),
            log_id: log.id,
        })
    }
}

/// Converts a stored day-of-month into the clamping domain.
fn day_of_month(day: i32) -> u32 {
    u32::try_from(day).unwrap_or(1)
}

/// Inserts one quota unless an equivalent non-cancelled quota already
/// exists. Returns whether a row was inserted.
#[allow(clippy::too_many_arguments)]
async fn insert_quota(
    txn: &DatabaseTransaction,
    rule: &quota_generation_rules::Model,
    formula: &quota_formulas::Model,
    unit: &units::Model,
    amount: Decimal,
    input: &GenerateQuotasInput,
    period: BillingPeriod,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    period_description: &str,
) -> Result<bool, DbErr> {
    // Re-check inside the transaction; this closes the race between the
    // pre-compute phase and the write phase.
    let existing = quotas::Entity::find()
        .filter(quotas::Column::UnitId.eq(unit.id))
        .filter(quotas::Column::PaymentConceptId.eq(rule.payment_concept_id))
        .filter(quotas::Column::PeriodYear.eq(period.year()))
        .filter(quotas::Column::PeriodMonth.eq(month_column(period)))
        .filter(quotas::Column::Status.ne(QuotaStatus::Cancelled))
        .one(txn)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let now = Utc::now().into();
    quotas::ActiveModel {
        id: Set(Uuid::new_v4()),
        unit_id: Set(unit.id),
        payment_concept_id: Set(rule.payment_concept_id),
        period_year: Set(period.year()),
        period_month: Set(month_column(period)),
        period_description: Set(period_description.to_string()),
        base_amount: Set(amount),
        currency_id: Set(formula.currency_id),
        issue_date: Set(issue_date),
        due_date: Set(due_date),
        status: Set(QuotaStatus::Pending),
        paid_amount: Set(Decimal::ZERO),
        balance: Set(amount),
        notes: Set(None),
        created_by: Set(input.generated_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    Ok(true)
}

/// Inserts the audit log row for one run.
#[allow(clippy::too_many_arguments)]
async fn insert_log(
    txn: &DatabaseTransaction,
    schedule: &quota_generation_schedules::Model,
    rule: &quota_generation_rules::Model,
    formula: &quota_formulas::Model,
    input: &GenerateQuotasInput,
    period: BillingPeriod,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    period_description: &str,
    tally: &RunTally,
) -> Result<quota_generation_logs::Model, DbErr> {
    let units_affected = if tally.affected_unit_ids().is_empty() {
        None
    } else {
        Some(json!(tally.affected_unit_ids()))
    };

    quota_generation_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        generation_rule_id: Set(Some(rule.id)),
        generation_schedule_id: Set(Some(schedule.id)),
        quota_formula_id: Set(Some(formula.id)),
        generation_method: Set(input.method.clone()),
        period_year: Set(period.year()),
        period_month: Set(month_column(period)),
        period_description: Set(period_description.to_string()),
        quotas_created: Set(count_column(tally.created())),
        quotas_failed: Set(count_column(tally.failed())),
        total_amount: Set(tally.total_amount()),
        currency_id: Set(formula.currency_id),
        units_affected: Set(units_affected),
        parameters: Set(Some(run_parameters(
            schedule.id,
            rule.id,
            formula.id,
            issue_date,
            due_date,
        ))),
        formula_snapshot: Set(Some(formula_snapshot(formula))),
        status: Set(tally.status().into()),
        error_details: Set(tally.error_details()),
        generated_by: Set(input.generated_by),
        generated_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await
}

fn month_column(period: BillingPeriod) -> i32 {
    i32::try_from(period.month()).unwrap_or_default()
}

fn count_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// The run parameters recorded on the log.
fn run_parameters(
    schedule_id: Uuid,
    rule_id: Uuid,
    formula_id: Uuid,
    issue_date: NaiveDate,
    due_date: NaiveDate,
) -> Value {
    json!({
        "schedule_id": schedule_id,
        "rule_id": rule_id,
        "formula_id": formula_id,
        "issue_date": issue_date,
        "due_date": due_date,
    })
}

/// A frozen snapshot of the formula's defining fields at run time.
fn formula_snapshot(formula: &quota_formulas::Model) -> Value {
    json!({
        "id": formula.id,
        "name": formula.name,
        "formula_type": formula.formula_type,
        "fixed_amount": formula.fixed_amount,
        "expression": formula.expression,
        "unit_amounts": formula.unit_amounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::entities::sea_orm_active_enums::FormulaType;

    fn formula_model() -> quota_formulas::Model {
        quota_formulas::Model {
            id: Uuid::new_v4(),
            condominium_id: Uuid::new_v4(),
            name: "Fixed Monthly Fee".to_string(),
            description: None,
            formula_type: FormulaType::Fixed,
            fixed_amount: Some(dec!(100.00)),
            expression: None,
            variables: None,
            unit_amounts: None,
            currency_id: Uuid::new_v4(),
            is_active: true,
            created_by: Uuid::new_v4(),
            created_at: Utc::now().into(),
            updated_by: None,
            updated_at: Utc::now().into(),
            update_reason: None,
        }
    }

    #[test]
    fn test_formula_snapshot_freezes_defining_fields() {
        let formula = formula_model();
        let snapshot = formula_snapshot(&formula);

        assert_eq!(snapshot["id"], json!(formula.id));
        assert_eq!(snapshot["name"], json!("Fixed Monthly Fee"));
        assert_eq!(snapshot["formula_type"], json!("fixed"));
        assert_eq!(snapshot["fixed_amount"], json!(dec!(100.00)));
        assert_eq!(snapshot["expression"], Value::Null);
    }

    #[test]
    fn test_run_parameters_shape() {
        let schedule_id = Uuid::new_v4();
        let rule_id = Uuid::new_v4();
        let formula_id = Uuid::new_v4();
        let issue = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();

        let parameters = run_parameters(schedule_id, rule_id, formula_id, issue, due);
        assert_eq!(parameters["schedule_id"], json!(schedule_id));
        assert_eq!(parameters["issue_date"], json!("2025-02-28"));
        assert_eq!(parameters["due_date"], json!("2025-02-28"));
    }

    #[test]
    fn test_day_of_month_guards_non_positive_days() {
        assert_eq!(day_of_month(15), 15);
        assert_eq!(day_of_month(31), 31);
        assert_eq!(day_of_month(0), 0);
        assert_eq!(day_of_month(-3), 1);
    }

    #[test]
    fn test_count_column() {
        assert_eq!(count_column(0), 0);
        assert_eq!(count_column(250), 250);
        assert_eq!(count_column(u32::MAX), i32::MAX);
    }
}
