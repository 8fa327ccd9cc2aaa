//! Quota formula validation and evaluation.
//!
//! A quota formula describes how the monthly amount owed by a unit is
//! computed: a fixed amount, an arithmetic expression over unit
//! attributes, or an explicit per-unit amount table.
//!
//! # Modules
//!
//! - `types` - Formula and unit domain types
//! - `error` - Formula-specific error types
//! - `validate` - Authoring-time configuration and expression safety checks
//! - `expr` - Arithmetic expression parser and evaluator
//! - `evaluator` - Per-unit amount computation

pub mod error;
pub mod evaluator;
pub mod expr;
pub mod types;
pub mod validate;

#[cfg(test)]
mod evaluator_props;

pub use error::FormulaError;
pub use evaluator::FormulaEvaluator;
pub use types::{EvaluatedAmount, EvaluationBreakdown, FormulaType, QuotaFormula, Unit};
pub use validate::{ALLOWED_VARIABLES, validate_config, validate_expression};
