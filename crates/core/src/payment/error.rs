//! Payment error types.

use thiserror::Error;
use uuid::Uuid;

use strata_shared::AppError;

use crate::payment::types::PaymentStatus;

/// Errors that can occur during payment lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Verify/reject requires the payment to be awaiting verification.
    #[error("Payment is not pending verification. Current status: {current}")]
    NotPendingVerification {
        /// The payment's current status.
        current: PaymentStatus,
    },

    /// Refund requires a completed payment.
    #[error("Only completed payments can be refunded. Current status: {current}")]
    NotRefundable {
        /// The payment's current status.
        current: PaymentStatus,
    },

    /// Refund reason is required but blank.
    #[error("Refund reason is required")]
    RefundReasonRequired,

    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PaymentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotPendingVerification { .. }
            | Self::NotRefundable { .. }
            | Self::RefundReasonRequired => 400,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotPendingVerification { .. }
            | Self::NotRefundable { .. }
            | Self::RefundReasonRequired => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound(_) => Self::NotFound(err.to_string()),
            PaymentError::Database(_) => Self::Database(err.to_string()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}
