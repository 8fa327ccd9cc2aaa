//! Quota repository for charge lookups.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::quotas;

/// Error types for quota operations.
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// Quota not found.
    #[error("Quota not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl QuotaError {
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

/// Quota repository for lookups.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    db: DatabaseConnection,
}

impl QuotaRepository {
    /// Creates a new quota repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a quota by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<quotas::Model, QuotaError> {
        quotas::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(QuotaError::NotFound(id))
    }

    /// Lists every quota of a billing period.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_period(
        &self,
        period_year: i32,
        period_month: i32,
    ) -> Result<Vec<quotas::Model>, QuotaError> {
        Ok(quotas::Entity::find()
            .filter(quotas::Column::PeriodYear.eq(period_year))
            .filter(quotas::Column::PeriodMonth.eq(period_month))
            .all(&self.db)
            .await?)
    }

    /// Lists a unit's quotas, newest period first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_unit(&self, unit_id: Uuid) -> Result<Vec<quotas::Model>, QuotaError> {
        Ok(quotas::Entity::find()
            .filter(quotas::Column::UnitId.eq(unit_id))
            .order_by_desc(quotas::Column::PeriodYear)
            .order_by_desc(quotas::Column::PeriodMonth)
            .all(&self.db)
            .await?)
    }
}
