//! Authoring-time safety checks for formula configurations.
//!
//! These checks run when a formula is created or updated, and the
//! evaluator re-runs the expression checks before every evaluation so a
//! formula that slipped into storage unvalidated still cannot execute
//! anything beyond plain arithmetic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::FormulaError;
use super::types::FormulaType;

/// The only variables an expression may reference.
pub const ALLOWED_VARIABLES: [&str; 6] = [
    "base_rate",
    "aliquot_percentage",
    "area_m2",
    "unit_count",
    "floor",
    "parking_spaces",
];

/// Keywords that must never appear anywhere in an expression,
/// case-insensitively.
const FORBIDDEN_KEYWORDS: [&str; 11] = [
    "function",
    "eval",
    "exec",
    "import",
    "require",
    "process",
    "global",
    "window",
    "document",
    "fetch",
    "xmlhttprequest",
];

/// Characters that must never appear in an expression.
const FORBIDDEN_CHARS: [char; 4] = ['[', ']', ';', '='];

/// Validates an expression for safety and well-formedness.
///
/// 1. Rejects forbidden keywords (case-insensitive) and characters.
/// 2. Rejects any identifier outside [`ALLOWED_VARIABLES`], naming it.
/// 3. Rejects unbalanced parentheses.
///
/// # Errors
///
/// Returns `FormulaError::ForbiddenToken`, `UnknownVariable`, or
/// `UnbalancedParentheses`.
pub fn validate_expression(expression: &str) -> Result<(), FormulaError> {
    let lowered = expression.to_lowercase();
    if FORBIDDEN_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Err(FormulaError::ForbiddenToken);
    }
    if expression.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Err(FormulaError::ForbiddenToken);
    }

    for identifier in identifiers(expression) {
        if !ALLOWED_VARIABLES.contains(&identifier.as_str()) {
            return Err(FormulaError::UnknownVariable(
                identifier,
                ALLOWED_VARIABLES.join(", "),
            ));
        }
    }

    let mut depth: i32 = 0;
    for c in expression.chars() {
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth < 0 {
                return Err(FormulaError::UnbalancedParentheses);
            }
        }
    }
    if depth != 0 {
        return Err(FormulaError::UnbalancedParentheses);
    }

    Ok(())
}

/// Validates the type-specific fields of a formula configuration.
///
/// # Errors
///
/// Returns the field-level `FormulaError` for the first violated rule.
pub fn validate_config(
    formula_type: FormulaType,
    fixed_amount: Option<Decimal>,
    expression: Option<&str>,
    unit_amounts: Option<&BTreeMap<Uuid, Decimal>>,
) -> Result<(), FormulaError> {
    match formula_type {
        FormulaType::Fixed => {
            let amount = fixed_amount.ok_or(FormulaError::MissingFixedAmount)?;
            if amount < Decimal::ZERO {
                return Err(FormulaError::InvalidFixedAmount);
            }
        }
        FormulaType::Expression => {
            let expression = expression
                .filter(|e| !e.trim().is_empty())
                .ok_or(FormulaError::MissingExpression)?;
            validate_expression(expression)?;
        }
        FormulaType::PerUnit => {
            if unit_amounts.is_none_or(BTreeMap::is_empty) {
                return Err(FormulaError::MissingUnitAmounts);
            }
        }
    }
    Ok(())
}

/// Extracts every identifier-like token (`[a-zA-Z_][a-zA-Z0-9_]*`).
fn identifiers(expression: &str) -> Vec<String> {
    let mut out = Vec::new();
    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() || chars[i] == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            out.push(chars[start..i].iter().collect());
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accepts_standard_expression() {
        assert!(validate_expression("base_rate * aliquot_percentage / 100").is_ok());
    }

    #[test]
    fn test_accepts_all_allowed_variables() {
        for var in ALLOWED_VARIABLES {
            assert!(validate_expression(var).is_ok(), "rejected {var}");
        }
    }

    #[test]
    fn test_rejects_forbidden_keyword() {
        assert_eq!(
            validate_expression("process.exit()"),
            Err(FormulaError::ForbiddenToken)
        );
        assert_eq!(
            validate_expression("EVAL(1)"),
            Err(FormulaError::ForbiddenToken)
        );
    }

    #[test]
    fn test_rejects_forbidden_characters() {
        assert_eq!(
            validate_expression("base_rate; 1"),
            Err(FormulaError::ForbiddenToken)
        );
        assert_eq!(
            validate_expression("floor = 1"),
            Err(FormulaError::ForbiddenToken)
        );
        assert_eq!(
            validate_expression("floor[0]"),
            Err(FormulaError::ForbiddenToken)
        );
    }

    #[test]
    fn test_rejects_unknown_identifier() {
        let err = validate_expression("floor + hacked_var").unwrap_err();
        match err {
            FormulaError::UnknownVariable(token, _) => assert_eq!(token, "hacked_var"),
            other => panic!("expected UnknownVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unbalanced_parentheses() {
        assert_eq!(
            validate_expression("(base_rate * 2"),
            Err(FormulaError::UnbalancedParentheses)
        );
        assert_eq!(
            validate_expression("base_rate) * (2"),
            Err(FormulaError::UnbalancedParentheses)
        );
    }

    #[test]
    fn test_config_fixed_requires_amount() {
        assert_eq!(
            validate_config(FormulaType::Fixed, None, None, None),
            Err(FormulaError::MissingFixedAmount)
        );
        assert_eq!(
            validate_config(FormulaType::Fixed, Some(dec!(-1)), None, None),
            Err(FormulaError::InvalidFixedAmount)
        );
        assert!(validate_config(FormulaType::Fixed, Some(dec!(0)), None, None).is_ok());
        assert!(validate_config(FormulaType::Fixed, Some(dec!(100.00)), None, None).is_ok());
    }

    #[test]
    fn test_config_expression_requires_expression() {
        assert_eq!(
            validate_config(FormulaType::Expression, None, None, None),
            Err(FormulaError::MissingExpression)
        );
        assert_eq!(
            validate_config(FormulaType::Expression, None, Some("   "), None),
            Err(FormulaError::MissingExpression)
        );
        assert!(validate_config(FormulaType::Expression, None, Some("area_m2 * 2"), None).is_ok());
    }

    #[test]
    fn test_config_expression_runs_safety_checks() {
        assert_eq!(
            validate_config(FormulaType::Expression, None, Some("eval(1)"), None),
            Err(FormulaError::ForbiddenToken)
        );
    }

    #[test]
    fn test_config_per_unit_requires_amounts() {
        assert_eq!(
            validate_config(FormulaType::PerUnit, None, None, None),
            Err(FormulaError::MissingUnitAmounts)
        );
        let empty = BTreeMap::new();
        assert_eq!(
            validate_config(FormulaType::PerUnit, None, None, Some(&empty)),
            Err(FormulaError::MissingUnitAmounts)
        );
        let mut amounts = BTreeMap::new();
        amounts.insert(uuid::Uuid::new_v4(), dec!(50));
        assert!(validate_config(FormulaType::PerUnit, None, None, Some(&amounts)).is_ok());
    }
}
