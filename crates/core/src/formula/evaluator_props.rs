//! Property tests for formula evaluation.

use std::collections::BTreeMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::FormulaError;
use super::evaluator::FormulaEvaluator;
use super::types::{FormulaType, QuotaFormula, Unit};
use super::validate;

fn formula(formula_type: FormulaType) -> QuotaFormula {
    QuotaFormula {
        id: Uuid::new_v4(),
        condominium_id: Uuid::new_v4(),
        name: "prop".to_string(),
        description: None,
        formula_type,
        fixed_amount: None,
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

fn unit(floor: i32, area_cents: i64, parking: i32, aliquot_bp: i64) -> Unit {
    Unit {
        id: Uuid::new_v4(),
        building_id: Uuid::new_v4(),
        unit_number: "P-1".to_string(),
        floor,
        area_m2: Decimal::new(area_cents, 2),
        parking_spaces: parking,
        aliquot_percentage: Decimal::new(aliquot_bp, 2),
        is_active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any fixed amount, `evaluate` either returns a non-negative
    /// 2-decimal amount or a `NegativeAmount` error - never a negative
    /// amount.
    #[test]
    fn prop_fixed_never_returns_negative(cents in -1_000_000i64..1_000_000i64) {
        let mut f = formula(FormulaType::Fixed);
        f.fixed_amount = Some(Decimal::new(cents, 2));
        let u = unit(1, 8_550, 1, 125);

        match FormulaEvaluator::evaluate(&f, &u, &BTreeMap::new()) {
            Ok(result) => {
                prop_assert!(result.amount >= Decimal::ZERO);
                prop_assert!(result.amount.scale() <= 2);
                prop_assert!(cents >= 0);
            }
            Err(FormulaError::NegativeAmount(_)) => prop_assert!(cents < 0),
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// For any unit attributes and base rate, the standard aliquot
    /// expression never yields a negative amount.
    #[test]
    fn prop_aliquot_expression_non_negative(
        base_rate in 0i64..10_000_000i64,
        aliquot_bp in 0i64..10_000i64,
    ) {
        let mut f = formula(FormulaType::Expression);
        f.expression = Some("base_rate * aliquot_percentage / 100".to_string());
        let u = unit(3, 10_000, 1, aliquot_bp);

        let mut vars = BTreeMap::new();
        vars.insert("base_rate".to_string(), Decimal::new(base_rate, 2));

        let result = FormulaEvaluator::evaluate(&f, &u, &vars).unwrap();
        prop_assert!(result.amount >= Decimal::ZERO);
        prop_assert!(result.amount.scale() <= 2);
    }

    /// Expressions containing a forbidden character never validate.
    #[test]
    fn prop_forbidden_chars_rejected(
        prefix in "[a-z_ ]{0,10}",
        c in prop::sample::select(vec!['[', ']', ';', '=']),
    ) {
        let expression = format!("{prefix}{c}1");
        prop_assert_eq!(
            validate::validate_expression(&expression),
            Err(FormulaError::ForbiddenToken)
        );
    }

    /// The substituted form of any validated expression over the allowed
    /// variables contains only whitelisted characters, so it can never
    /// smuggle anything past the arithmetic parser.
    #[test]
    fn prop_substitution_is_arithmetic_only(
        floor in -5i32..50i32,
        parking in 0i32..10i32,
    ) {
        let mut f = formula(FormulaType::Expression);
        f.expression = Some("floor * 5 + parking_spaces * 25 + unit_count".to_string());
        let u = unit(floor, 5_000, parking, 100);

        match FormulaEvaluator::evaluate(&f, &u, &BTreeMap::new()) {
            Ok(result) => prop_assert!(result.amount >= Decimal::ZERO),
            Err(FormulaError::NegativeAmount(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
