//! Formula error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use strata_shared::AppError;

/// Errors that can occur while validating or evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula is inactive and must not produce amounts.
    #[error("Formula is not active")]
    Inactive,

    /// A `fixed` formula has no fixed amount configured.
    #[error("Fixed amount is required for fixed formula type")]
    MissingFixedAmount,

    /// A `fixed` formula has a negative fixed amount.
    #[error("Fixed amount must be a valid non-negative number")]
    InvalidFixedAmount,

    /// An `expression` formula has no expression configured.
    #[error("Expression is required for expression formula type")]
    MissingExpression,

    /// A `per_unit` formula has no amount table configured.
    #[error("Unit amounts are required for per_unit formula type")]
    MissingUnitAmounts,

    /// The expression contains a forbidden keyword or character.
    #[error("Expression contains forbidden characters or keywords")]
    ForbiddenToken,

    /// The expression references a variable outside the allowed set.
    #[error("Unknown variable: {0}. Allowed variables: {1}")]
    UnknownVariable(String, String),

    /// The expression's parentheses do not balance.
    #[error("Unbalanced parentheses in expression")]
    UnbalancedParentheses,

    /// After variable substitution the expression still contains a
    /// character outside the arithmetic whitelist.
    #[error("Expression contains invalid character '{0}' after substitution")]
    UnsafeCharacter(char),

    /// The substituted expression is not valid arithmetic.
    #[error("Invalid arithmetic expression: {0}")]
    InvalidArithmetic(String),

    /// The expression divides by zero.
    #[error("Expression divides by zero")]
    DivisionByZero,

    /// The expression's value overflows the decimal range.
    #[error("Expression result is out of range")]
    Overflow,

    /// A `per_unit` formula has no amount for the requested unit.
    #[error("No amount configured for unit {0}")]
    NoAmountForUnit(Uuid),

    /// The computed amount is negative.
    #[error("Computed amount {0} is negative")]
    NegativeAmount(Decimal),

    /// The stored `unit_amounts` payload could not be interpreted.
    #[error("Malformed unit amounts: {0}")]
    MalformedUnitAmounts(String),
}

impl FormulaError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MalformedUnitAmounts(_) => 500,
            _ => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedUnitAmounts(_) => "INTERNAL_ERROR",
            _ => "BAD_REQUEST",
        }
    }
}

impl From<FormulaError> for AppError {
    fn from(err: FormulaError) -> Self {
        match err {
            FormulaError::MalformedUnitAmounts(_) => Self::Internal(err.to_string()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}
