//! Generation log repository for audit lookups.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::quota_generation_logs;

/// Error types for generation log operations.
#[derive(Debug, thiserror::Error)]
pub enum GenerationLogError {
    /// Log not found.
    #[error("Generation log not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl GenerationLogError {
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

/// Generation log repository; rows are written only by the engine.
#[derive(Debug, Clone)]
pub struct GenerationLogRepository {
    db: DatabaseConnection,
}

impl GenerationLogRepository {
    /// Creates a new generation log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a generation log by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> Result<quota_generation_logs::Model, GenerationLogError> {
        quota_generation_logs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(GenerationLogError::NotFound(id))
    }

    /// Lists a rule's generation runs, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_by_rule(
        &self,
        rule_id: Uuid,
    ) -> Result<Vec<quota_generation_logs::Model>, GenerationLogError> {
        Ok(quota_generation_logs::Entity::find()
            .filter(quota_generation_logs::Column::GenerationRuleId.eq(rule_id))
            .order_by_desc(quota_generation_logs::Column::GeneratedAt)
            .all(&self.db)
            .await?)
    }
}
