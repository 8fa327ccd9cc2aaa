//! Billing error types.

use thiserror::Error;

use strata_shared::AppError;

/// Errors from billing period arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Month outside 1-12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
}

impl BillingError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidMonth(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMonth(_) => "BAD_REQUEST",
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
