//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Transactional operations begin a database transaction
//! and thread it explicitly through their helpers.

pub mod formula;
pub mod generation;
pub mod generation_log;
pub mod payment;
pub mod payment_application;
pub mod quota;
pub mod unit;

pub use formula::{
    CreateFormulaInput, QuotaFormulaError, QuotaFormulaRepository, UpdateFormulaInput,
};
pub use generation::{
    GenerateQuotasInput, GenerationEngine, GenerationError, GenerationOutcome,
};
pub use generation_log::{GenerationLogError, GenerationLogRepository};
pub use payment::{PaymentRepository, RefundOutcome};
pub use payment_application::{PaymentApplicationError, PaymentApplicationRepository};
pub use quota::{QuotaError, QuotaRepository};
pub use unit::{UnitError, UnitRepository};
