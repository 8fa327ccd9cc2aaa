//! Payment application repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::payment_applications;

/// Error types for payment application operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentApplicationError {
    /// Application not found.
    #[error("Payment application not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PaymentApplicationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Payment application repository.
///
/// Applications are created by the payment-intake flow; the refund path
/// hard-deletes them inside its own transaction.
#[derive(Debug, Clone)]
pub struct PaymentApplicationRepository {
    db: DatabaseConnection,
}

impl PaymentApplicationRepository {
    /// Creates a new payment application repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets an application by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> Result<payment_applications::Model, PaymentApplicationError> {
        payment_applications::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PaymentApplicationError::NotFound(id))
    }

    /// Lists the allocations of one payment.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<payment_applications::Model>, PaymentApplicationError> {
        Ok(payment_applications::Entity::find()
            .filter(payment_applications::Column::PaymentId.eq(payment_id))
            .order_by_asc(payment_applications::Column::AppliedAt)
            .all(&self.db)
            .await?)
    }
}
