//! Quota formula repository: authoring, lookups, and evaluation.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value;
use uuid::Uuid;

use strata_core::formula::{
    self, EvaluatedAmount, FormulaEvaluator, FormulaType, QuotaFormula, Unit,
};

use crate::entities::{condominiums, quota_formulas, units};

/// Error types for quota formula operations.
#[derive(Debug, thiserror::Error)]
pub enum QuotaFormulaError {
    /// Condominium not found.
    #[error("Condominium not found: {0}")]
    CondominiumNotFound(Uuid),

    /// Formula not found.
    #[error("Formula not found: {0}")]
    FormulaNotFound(Uuid),

    /// Unit not found.
    #[error("Unit not found: {0}")]
    UnitNotFound(Uuid),

    /// Formula configuration or evaluation failed.
    #[error(transparent)]
    Formula(#[from] formula::FormulaError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl QuotaFormulaError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::CondominiumNotFound(_) | Self::FormulaNotFound(_) | Self::UnitNotFound(_) => 404,
            Self::Formula(err) => err.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CondominiumNotFound(_) | Self::FormulaNotFound(_) | Self::UnitNotFound(_) => {
                "NOT_FOUND"
            }
            Self::Formula(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a quota formula.
#[derive(Debug, Clone)]
pub struct CreateFormulaInput {
    /// Condominium the formula belongs to.
    pub condominium_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// How the formula computes amounts.
    pub formula_type: FormulaType,
    /// Amount for `fixed` formulas.
    pub fixed_amount: Option<Decimal>,
    /// Expression text for `expression` formulas.
    pub expression: Option<String>,
    /// Free-form variable documentation for `expression` formulas.
    pub variables: Option<Value>,
    /// Amount table for `per_unit` formulas.
    pub unit_amounts: Option<BTreeMap<Uuid, Decimal>>,
    /// Currency the amounts are denominated in.
    pub currency_id: Uuid,
    /// User creating the formula.
    pub created_by: Uuid,
}

/// Input for partially updating a quota formula.
///
/// `None` fields are left unchanged. Traceability fields are always
/// applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateFormulaInput {
    /// Formula to update.
    pub formula_id: Uuid,
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New formula type.
    pub formula_type: Option<FormulaType>,
    /// New fixed amount.
    pub fixed_amount: Option<Decimal>,
    /// New expression text.
    pub expression: Option<String>,
    /// New variable documentation.
    pub variables: Option<Value>,
    /// New per-unit amount table.
    pub unit_amounts: Option<BTreeMap<Uuid, Decimal>>,
    /// New currency.
    pub currency_id: Option<Uuid>,
    /// Activate or deactivate the formula.
    pub is_active: Option<bool>,
    /// User performing the update.
    pub updated_by: Uuid,
    /// Why the formula was updated.
    pub update_reason: Option<String>,
}

impl UpdateFormulaInput {
    /// Whether the update touches type-relevant fields and therefore
    /// needs re-validation.
    fn changes_configuration(&self) -> bool {
        self.formula_type.is_some()
            || self.fixed_amount.is_some()
            || self.expression.is_some()
            || self.unit_amounts.is_some()
    }
}

/// Quota formula repository.
#[derive(Debug, Clone)]
pub struct QuotaFormulaRepository {
    db: DatabaseConnection,
}

impl QuotaFormulaRepository {
    /// Creates a new quota formula repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a formula after validating its type-specific fields.
    ///
    /// Fields not relevant to the chosen type are stored NULL; the
    /// formula starts active.
    ///
    /// # Errors
    ///
    /// Returns an error if the condominium does not exist, the
    /// configuration fails validation, or the insert fails.
    pub async fn create(
        &self,
        input: CreateFormulaInput,
    ) -> Result<quota_formulas::Model, QuotaFormulaError> {
        condominiums::Entity::find_by_id(input.condominium_id)
            .one(&self.db)
            .await?
            .ok_or(QuotaFormulaError::CondominiumNotFound(input.condominium_id))?;

        formula::validate_config(
            input.formula_type,
            input.fixed_amount,
            input.expression.as_deref(),
            input.unit_amounts.as_ref(),
        )?;

        let now = Utc::now().into();
        let model = quota_formulas::ActiveModel {
            id: Set(Uuid::new_v4()),
            condominium_id: Set(input.condominium_id),
            name: Set(input.name),
            description: Set(input.description),
            formula_type: Set(input.formula_type.into()),
            // Only the fields matching the chosen type are kept.
            fixed_amount: Set(match input.formula_type {
                FormulaType::Fixed => input.fixed_amount,
                _ => None,
            }),
            expression: Set(match input.formula_type {
                FormulaType::Expression => input.expression,
                _ => None,
            }),
            variables: Set(match input.formula_type {
                FormulaType::Expression => input.variables,
                _ => None,
            }),
            unit_amounts: Set(match input.formula_type {
                FormulaType::PerUnit => input.unit_amounts.as_ref().map(unit_amounts_to_json),
                _ => None,
            }),
            currency_id: Set(input.currency_id),
            is_active: Set(true),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(now),
            update_reason: Set(None),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Applies a partial update, re-validating the configuration when
    /// the type or a type-relevant field changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the formula does not exist, the effective
    /// configuration fails validation, or the update fails.
    pub async fn update(
        &self,
        input: UpdateFormulaInput,
    ) -> Result<quota_formulas::Model, QuotaFormulaError> {
        let existing = quota_formulas::Entity::find_by_id(input.formula_id)
            .one(&self.db)
            .await?
            .ok_or(QuotaFormulaError::FormulaNotFound(input.formula_id))?;

        if input.changes_configuration() {
            let effective_type = input
                .formula_type
                .unwrap_or_else(|| existing.formula_type.clone().into());
            let effective_fixed = input.fixed_amount.or(existing.fixed_amount);
            let effective_expression = input
                .expression
                .clone()
                .or_else(|| existing.expression.clone());
            let effective_amounts = match &input.unit_amounts {
                Some(amounts) => Some(amounts.clone()),
                None => existing
                    .unit_amounts
                    .as_ref()
                    .map(unit_amounts_from_json)
                    .transpose()?,
            };

            formula::validate_config(
                effective_type,
                effective_fixed,
                effective_expression.as_deref(),
                effective_amounts.as_ref(),
            )?;
        }

        let mut active: quota_formulas::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(formula_type) = input.formula_type {
            active.formula_type = Set(formula_type.into());
        }
        if let Some(fixed_amount) = input.fixed_amount {
            active.fixed_amount = Set(Some(fixed_amount));
        }
        if let Some(expression) = input.expression {
            active.expression = Set(Some(expression));
        }
        if let Some(variables) = input.variables {
            active.variables = Set(Some(variables));
        }
        if let Some(unit_amounts) = &input.unit_amounts {
            active.unit_amounts = Set(Some(unit_amounts_to_json(unit_amounts)));
        }
        if let Some(currency_id) = input.currency_id {
            active.currency_id = Set(currency_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_by = Set(Some(input.updated_by));
        active.update_reason = Set(input.update_reason);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Gets a formula by id.
    ///
    /// # Errors
    ///
    /// Returns `FormulaNotFound` or a database error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<quota_formulas::Model, QuotaFormulaError> {
        quota_formulas::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(QuotaFormulaError::FormulaNotFound(id))
    }

    /// Lists a condominium's formulas, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_condominium(
        &self,
        condominium_id: Uuid,
    ) -> Result<Vec<quota_formulas::Model>, QuotaFormulaError> {
        Ok(quota_formulas::Entity::find()
            .filter(quota_formulas::Column::CondominiumId.eq(condominium_id))
            .order_by_desc(quota_formulas::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Evaluates a formula for a unit.
    ///
    /// Resolves both rows, maps them into domain values, and runs the
    /// pure evaluator.
    ///
    /// # Errors
    ///
    /// Returns `FormulaNotFound` / `UnitNotFound` for missing rows and
    /// the evaluator's own errors otherwise.
    pub async fn evaluate_for_unit(
        &self,
        formula_id: Uuid,
        unit_id: Uuid,
        additional_variables: &BTreeMap<String, Decimal>,
    ) -> Result<EvaluatedAmount, QuotaFormulaError> {
        let formula_model = self.get_by_id(formula_id).await?;
        let unit_model = units::Entity::find_by_id(unit_id)
            .one(&self.db)
            .await?
            .ok_or(QuotaFormulaError::UnitNotFound(unit_id))?;

        let formula = formula_to_domain(&formula_model)?;
        let unit = unit_to_domain(&unit_model);

        Ok(FormulaEvaluator::evaluate(
            &formula,
            &unit,
            additional_variables,
        )?)
    }
}

/// Maps a formula row into the core domain type.
pub(crate) fn formula_to_domain(
    model: &quota_formulas::Model,
) -> Result<QuotaFormula, formula::FormulaError> {
    let unit_amounts = model
        .unit_amounts
        .as_ref()
        .map(unit_amounts_from_json)
        .transpose()?;

    Ok(QuotaFormula {
        id: model.id,
        condominium_id: model.condominium_id,
        name: model.name.clone(),
        description: model.description.clone(),
        formula_type: model.formula_type.clone().into(),
        fixed_amount: model.fixed_amount,
        expression: model.expression.clone(),
        variables: model.variables.clone(),
        unit_amounts,
        currency_id: model.currency_id,
        is_active: model.is_active,
        created_by: model.created_by,
        created_at: model.created_at.to_utc(),
        updated_by: model.updated_by,
        updated_at: model.updated_at.to_utc(),
        update_reason: model.update_reason.clone(),
    })
}

/// Maps a unit row into the core domain type.
pub(crate) fn unit_to_domain(model: &units::Model) -> Unit {
    Unit {
        id: model.id,
        building_id: model.building_id,
        unit_number: model.unit_number.clone(),
        floor: model.floor,
        area_m2: model.area_m2,
        parking_spaces: model.parking_spaces,
        aliquot_percentage: model.aliquot_percentage,
        is_active: model.is_active,
    }
}

/// Parses a stored `unit_amounts` JSON object into the domain map.
///
/// Values may be decimal strings (the canonical form) or JSON numbers.
pub(crate) fn unit_amounts_from_json(
    value: &Value,
) -> Result<BTreeMap<Uuid, Decimal>, formula::FormulaError> {
    let object = value.as_object().ok_or_else(|| {
        formula::FormulaError::MalformedUnitAmounts("expected a JSON object".to_string())
    })?;

    let mut amounts = BTreeMap::new();
    for (key, raw) in object {
        let unit_id = Uuid::from_str(key).map_err(|_| {
            formula::FormulaError::MalformedUnitAmounts(format!("invalid unit id '{key}'"))
        })?;
        let amount = match raw {
            Value::String(s) => Decimal::from_str(s).map_err(|_| {
                formula::FormulaError::MalformedUnitAmounts(format!("invalid amount '{s}'"))
            })?,
            Value::Number(n) => Decimal::from_str(&n.to_string()).map_err(|_| {
                formula::FormulaError::MalformedUnitAmounts(format!("invalid amount '{n}'"))
            })?,
            other => {
                return Err(formula::FormulaError::MalformedUnitAmounts(format!(
                    "unexpected amount value '{other}'"
                )));
            }
        };
        amounts.insert(unit_id, amount);
    }
    Ok(amounts)
}

/// Serializes the domain amount map into the stored JSON form
/// (decimal strings keyed by unit id).
pub(crate) fn unit_amounts_to_json(amounts: &BTreeMap<Uuid, Decimal>) -> Value {
    Value::Object(
        amounts
            .iter()
            .map(|(unit_id, amount)| (unit_id.to_string(), Value::String(amount.to_string())))
            .collect(),
    )
}
