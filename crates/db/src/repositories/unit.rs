//! Unit repository for unit scope resolution.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{buildings, units};

/// Error types for unit operations.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Unit not found.
    #[error("Unit not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl UnitError {
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

/// Unit repository for lookups and scope resolution.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    db: DatabaseConnection,
}

impl UnitRepository {
    /// Creates a new unit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a unit by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<units::Model, UnitError> {
        units::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UnitError::NotFound(id))
    }

    /// Lists the active units of one building.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_active_by_building(
        &self,
        building_id: Uuid,
    ) -> Result<Vec<units::Model>, UnitError> {
        Ok(units::Entity::find()
            .filter(units::Column::BuildingId.eq(building_id))
            .filter(units::Column::IsActive.eq(true))
            .order_by_asc(units::Column::UnitNumber)
            .all(&self.db)
            .await?)
    }

    /// Lists the active units of every building in a condominium.
    ///
    /// Units belong to buildings, which belong to condominiums, so this
    /// walks the buildings and unions their units.
    ///
    /// # Errors
    ///
    /// Returns a database error if any query fails.
    pub async fn list_active_by_condominium(
        &self,
        condominium_id: Uuid,
    ) -> Result<Vec<units::Model>, UnitError> {
        let condo_buildings = buildings::Entity::find()
            .filter(buildings::Column::CondominiumId.eq(condominium_id))
            .all(&self.db)
            .await?;

        let mut all_units = Vec::new();
        for building in condo_buildings {
            let mut building_units = self.list_active_by_building(building.id).await?;
            all_units.append(&mut building_units);
        }
        Ok(all_units)
    }
}
