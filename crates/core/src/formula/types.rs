//! Formula domain types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a formula computes the amount owed by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaType {
    /// The same fixed amount for every unit.
    Fixed,
    /// An arithmetic expression over unit attributes.
    Expression,
    /// An explicit amount table keyed by unit id.
    PerUnit,
}

impl FormulaType {
    /// Returns the string representation of the formula type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Expression => "expression",
            Self::PerUnit => "per_unit",
        }
    }

    /// Parses a formula type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "expression" => Some(Self::Expression),
            "per_unit" => Some(Self::PerUnit),
            _ => None,
        }
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reusable template for computing quota amounts.
///
/// Only the fields matching `formula_type` are meaningful; the others
/// are `None`. The formula definition service enforces this on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaFormula {
    /// Unique identifier.
    pub id: Uuid,
    /// Condominium this formula belongs to.
    pub condominium_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// How the amount is computed.
    pub formula_type: FormulaType,
    /// Amount for `fixed` formulas.
    pub fixed_amount: Option<Decimal>,
    /// Expression text for `expression` formulas.
    pub expression: Option<String>,
    /// Free-form variable documentation for `expression` formulas
    /// (informational only; never read by the evaluator).
    pub variables: Option<serde_json::Value>,
    /// Amount table for `per_unit` formulas, keyed by unit id.
    pub unit_amounts: Option<BTreeMap<Uuid, Decimal>>,
    /// Currency the computed amounts are denominated in.
    pub currency_id: Uuid,
    /// Inactive formulas refuse evaluation.
    pub is_active: bool,
    /// User who created the formula.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// User who last updated the formula.
    pub updated_by: Option<Uuid>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Why the formula was last updated.
    pub update_reason: Option<String>,
}

/// Per-unit attributes the expression evaluator may reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: Uuid,
    /// Building this unit belongs to.
    pub building_id: Uuid,
    /// Human unit number (e.g. "A-101").
    pub unit_number: String,
    /// Floor the unit is on (negative for basements).
    pub floor: i32,
    /// Area in square meters.
    pub area_m2: Decimal,
    /// Number of parking spaces assigned to the unit.
    pub parking_spaces: i32,
    /// The unit's fractional ownership share, in percent.
    pub aliquot_percentage: Decimal,
    /// Inactive units are excluded from charge generation.
    pub is_active: bool,
}

/// How an evaluated amount was arrived at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationBreakdown {
    /// The formula type that produced the amount.
    pub formula_type: FormulaType,
    /// The substituted variables, for `expression` formulas.
    pub variables: Option<BTreeMap<String, Decimal>>,
    /// The raw result before rounding to 2 decimal places.
    pub result: Decimal,
}

/// The result of evaluating a formula for one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedAmount {
    /// The amount, rounded to 2 decimal places. Never negative.
    pub amount: Decimal,
    /// How the amount was computed.
    pub breakdown: EvaluationBreakdown,
}
