//! Per-unit formula evaluation.
//!
//! This module computes the amount a unit owes under a given formula.
//! It is pure and read-only: the database wrappers resolve the formula
//! and unit rows and hand plain domain values in.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::FormulaError;
use super::expr;
use super::types::{EvaluatedAmount, EvaluationBreakdown, FormulaType, QuotaFormula, Unit};
use super::validate;

/// Stateless evaluator for quota formulas.
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    /// Evaluates a formula for one unit.
    ///
    /// For `expression` formulas the variable map starts from defaults
    /// derived from the unit (`base_rate` defaults to 0 when the caller
    /// supplies none), then caller-supplied variables override.
    ///
    /// The result is always finite and non-negative, rounded to 2
    /// decimal places; anything else is an error.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::Inactive` for inactive formulas, the
    /// type-specific configuration errors, expression safety/arithmetic
    /// errors, `NoAmountForUnit` for a missing per-unit mapping, and
    /// `NegativeAmount` when the computed value is below zero.
    pub fn evaluate(
        formula: &QuotaFormula,
        unit: &Unit,
        additional_variables: &BTreeMap<String, Decimal>,
    ) -> Result<EvaluatedAmount, FormulaError> {
        if !formula.is_active {
            return Err(FormulaError::Inactive);
        }

        match formula.formula_type {
            FormulaType::Fixed => {
                let raw = formula.fixed_amount.ok_or(FormulaError::MissingFixedAmount)?;
                Self::finish(FormulaType::Fixed, None, raw)
            }
            FormulaType::Expression => {
                let expression = formula
                    .expression
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .ok_or(FormulaError::MissingExpression)?;

                // Same safety checks the authoring path runs.
                validate::validate_expression(expression)?;

                let variables = Self::variable_map(unit, additional_variables);
                let substituted = Self::substitute(expression, &variables);

                if let Some(bad) = substituted.chars().find(|c| !Self::is_safe_char(*c)) {
                    return Err(FormulaError::UnsafeCharacter(bad));
                }

                let raw = expr::evaluate(&substituted)?;
                Self::finish(FormulaType::Expression, Some(variables), raw)
            }
            FormulaType::PerUnit => {
                let amounts = formula
                    .unit_amounts
                    .as_ref()
                    .filter(|m| !m.is_empty())
                    .ok_or(FormulaError::MissingUnitAmounts)?;
                let raw = amounts
                    .get(&unit.id)
                    .copied()
                    .ok_or(FormulaError::NoAmountForUnit(unit.id))?;
                Self::finish(FormulaType::PerUnit, None, raw)
            }
        }
    }

    /// Builds the variable map for an expression evaluation.
    fn variable_map(
        unit: &Unit,
        additional_variables: &BTreeMap<String, Decimal>,
    ) -> BTreeMap<String, Decimal> {
        let mut variables = BTreeMap::new();
        variables.insert(
            "base_rate".to_string(),
            additional_variables
                .get("base_rate")
                .copied()
                .unwrap_or(Decimal::ZERO),
        );
        variables.insert(
            "aliquot_percentage".to_string(),
            unit.aliquot_percentage,
        );
        variables.insert("area_m2".to_string(), unit.area_m2);
        variables.insert("unit_count".to_string(), Decimal::ONE);
        variables.insert("floor".to_string(), Decimal::from(unit.floor));
        variables.insert(
            "parking_spaces".to_string(),
            Decimal::from(unit.parking_spaces),
        );

        // Caller-supplied variables win over the defaults.
        for (name, value) in additional_variables {
            variables.insert(name.clone(), *value);
        }

        variables
    }

    /// Replaces each whole-word variable occurrence with its value.
    fn substitute(expression: &str, variables: &BTreeMap<String, Decimal>) -> String {
        let chars: Vec<char> = expression.chars().collect();
        let mut out = String::with_capacity(expression.len());
        let mut i = 0;
        while i < chars.len() {
            if chars[i].is_ascii_alphabetic() || chars[i] == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let identifier: String = chars[start..i].iter().collect();
                match variables.get(&identifier) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => out.push_str(&identifier),
                }
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }
        out
    }

    /// The character whitelist a substituted expression must satisfy.
    fn is_safe_char(c: char) -> bool {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '.' | '(' | ')')
    }

    /// Applies the shared post-conditions: non-negative, 2 decimal places.
    fn finish(
        formula_type: FormulaType,
        variables: Option<BTreeMap<String, Decimal>>,
        raw: Decimal,
    ) -> Result<EvaluatedAmount, FormulaError> {
        if raw < Decimal::ZERO {
            return Err(FormulaError::NegativeAmount(raw));
        }
        let amount = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Ok(EvaluatedAmount {
            amount,
            breakdown: EvaluationBreakdown {
                formula_type,
                variables,
                result: raw,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn fixed_formula(amount: Decimal) -> QuotaFormula {
        QuotaFormula {
            id: Uuid::new_v4(),
            condominium_id: Uuid::new_v4(),
            name: "Fixed Monthly Fee".to_string(),
            description: None,
            formula_type: FormulaType::Fixed,
            fixed_amount: Some(amount),
            expression: None,
            variables: None,
            unit_amounts: None,
            currency_id: Uuid::new_v4(),
            is_active: true,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_by: None,
            updated_at: Utc::now(),
            update_reason: None,
        }
    }

    fn expression_formula(expression: &str) -> QuotaFormula {
        QuotaFormula {
            formula_type: FormulaType::Expression,
            fixed_amount: None,
            expression: Some(expression.to_string()),
            ..fixed_formula(Decimal::ZERO)
        }
    }

    fn sample_unit() -> Unit {
        Unit {
            id: Uuid::new_v4(),
            building_id: Uuid::new_v4(),
            unit_number: "A-101".to_string(),
            floor: 10,
            area_m2: dec!(85.50),
            parking_spaces: 2,
            aliquot_percentage: dec!(1.25),
            is_active: true,
        }
    }

    #[test]
    fn test_fixed_amount() {
        let result =
            FormulaEvaluator::evaluate(&fixed_formula(dec!(100.00)), &sample_unit(), &BTreeMap::new())
                .unwrap();
        assert_eq!(result.amount, dec!(100.00));
        assert_eq!(result.breakdown.formula_type, FormulaType::Fixed);
        assert_eq!(result.breakdown.result, dec!(100.00));
        assert!(result.breakdown.variables.is_none());
    }

    #[test]
    fn test_fixed_rounds_to_two_decimals() {
        let result =
            FormulaEvaluator::evaluate(&fixed_formula(dec!(10.555)), &sample_unit(), &BTreeMap::new())
                .unwrap();
        assert_eq!(result.amount, dec!(10.56));
        assert_eq!(result.breakdown.result, dec!(10.555));
    }

    #[test]
    fn test_inactive_formula_fails() {
        let mut formula = fixed_formula(dec!(100));
        formula.is_active = false;
        let err = FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, FormulaError::Inactive);
    }

    #[test]
    fn test_expression_with_base_rate() {
        let formula = expression_formula("base_rate * aliquot_percentage / 100");
        let mut additional = BTreeMap::new();
        additional.insert("base_rate".to_string(), dec!(10000));

        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &additional).unwrap();
        // 10000 * 1.25 / 100 = 125
        assert_eq!(result.amount, dec!(125.00));
        let variables = result.breakdown.variables.unwrap();
        assert_eq!(variables["base_rate"], dec!(10000));
        assert_eq!(variables["aliquot_percentage"], dec!(1.25));
    }

    #[test]
    fn test_expression_base_rate_defaults_to_zero() {
        let formula = expression_formula("base_rate * area_m2");
        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap();
        assert_eq!(result.amount, dec!(0.00));
    }

    #[test]
    fn test_expression_with_area() {
        let formula = expression_formula("area_m2 * 2");
        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap();
        // 85.50 * 2 = 171
        assert_eq!(result.amount, dec!(171.00));
    }

    #[test]
    fn test_expression_with_floor() {
        let formula = expression_formula("floor * 5 + 100");
        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap();
        assert_eq!(result.amount, dec!(150.00));
    }

    #[test]
    fn test_expression_with_parking_spaces() {
        let formula = expression_formula("parking_spaces * 25");
        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap();
        assert_eq!(result.amount, dec!(50.00));
    }

    #[test]
    fn test_expression_caller_overrides_unit_defaults() {
        let formula = expression_formula("area_m2 * 2");
        let mut additional = BTreeMap::new();
        additional.insert("area_m2".to_string(), dec!(100));
        let result = FormulaEvaluator::evaluate(&formula, &sample_unit(), &additional).unwrap();
        assert_eq!(result.amount, dec!(200.00));
    }

    #[test]
    fn test_expression_negative_result_fails() {
        let formula = expression_formula("floor - 100");
        let err =
            FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, FormulaError::NegativeAmount(_)));
    }

    #[test]
    fn test_expression_division_by_zero_fails() {
        let formula = expression_formula("area_m2 / base_rate");
        let err =
            FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, FormulaError::DivisionByZero);
    }

    #[test]
    fn test_expression_unknown_variable_fails() {
        let formula = expression_formula("floor + hacked_var");
        let err =
            FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, FormulaError::UnknownVariable(token, _) if token == "hacked_var"));
    }

    #[test]
    fn test_expression_forbidden_keyword_fails() {
        let formula = expression_formula("process.exit()");
        let err =
            FormulaEvaluator::evaluate(&formula, &sample_unit(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, FormulaError::ForbiddenToken);
    }

    #[test]
    fn test_expression_negative_floor_substitutes_cleanly() {
        let formula = expression_formula("floor * 5 + 100");
        let mut unit = sample_unit();
        unit.floor = -2;
        let result = FormulaEvaluator::evaluate(&formula, &unit, &BTreeMap::new()).unwrap();
        assert_eq!(result.amount, dec!(90.00));
    }

    #[test]
    fn test_per_unit_lookup() {
        let unit = sample_unit();
        let mut amounts = BTreeMap::new();
        amounts.insert(unit.id, dec!(75.50));
        let formula = QuotaFormula {
            formula_type: FormulaType::PerUnit,
            fixed_amount: None,
            unit_amounts: Some(amounts),
            ..fixed_formula(Decimal::ZERO)
        };

        let result = FormulaEvaluator::evaluate(&formula, &unit, &BTreeMap::new()).unwrap();
        assert_eq!(result.amount, dec!(75.50));
        assert_eq!(result.breakdown.formula_type, FormulaType::PerUnit);
    }

    #[test]
    fn test_per_unit_missing_mapping_fails() {
        let unit = sample_unit();
        let mut amounts = BTreeMap::new();
        amounts.insert(Uuid::new_v4(), dec!(75.50));
        let formula = QuotaFormula {
            formula_type: FormulaType::PerUnit,
            fixed_amount: None,
            unit_amounts: Some(amounts),
            ..fixed_formula(Decimal::ZERO)
        };

        let err = FormulaEvaluator::evaluate(&formula, &unit, &BTreeMap::new()).unwrap_err();
        assert_eq!(err, FormulaError::NoAmountForUnit(unit.id));
    }

    #[test]
    fn test_per_unit_negative_amount_fails() {
        let unit = sample_unit();
        let mut amounts = BTreeMap::new();
        amounts.insert(unit.id, dec!(-10));
        let formula = QuotaFormula {
            formula_type: FormulaType::PerUnit,
            fixed_amount: None,
            unit_amounts: Some(amounts),
            ..fixed_formula(Decimal::ZERO)
        };

        let err = FormulaEvaluator::evaluate(&formula, &unit, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, FormulaError::NegativeAmount(_)));
    }
}
