//! Database queries for vehicles.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};

use crate::entity::vehicle::{self, ActiveModel, Entity as Vehicle};
use crate::error::{AppError, AppResult};
use crate::models::{CreateVehicleRequest, UpdateVehicleRequest};

use super::{DbPool, SoftDelete};

impl DbPool {
    /// Insert a new vehicle. A duplicate plate yields `AppError::Conflict`.
    pub async fn insert_vehicle(&self, req: CreateVehicleRequest) -> AppResult<vehicle::Model> {
        let now = Utc::now();
        let plate = req.license_plate.clone();

        let model = ActiveModel {
            make: Set(req.make),
            model: Set(req.model),
            year: Set(req.year),
            color: Set(req.color),
            license_plate: Set(req.license_plate),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        model.insert(self.connection()).await.map_err(|e| {
            AppError::from_write(e, format!("A vehicle with plate {} already exists", plate))
        })
    }

    /// Get a non-deleted vehicle by ID.
    pub async fn get_vehicle(&self, id: i32) -> AppResult<Option<vehicle::Model>> {
        Vehicle::find_active_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get vehicle: {}", e)))
    }

    /// Get a vehicle by ID, including soft-deleted rows.
    pub async fn get_vehicle_unscoped(&self, id: i32) -> AppResult<Option<vehicle::Model>> {
        Vehicle::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get vehicle: {}", e)))
    }

    /// List non-deleted vehicles ordered by ID.
    pub async fn list_vehicles(
        &self,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<vehicle::Model>, u64)> {
        let select = Vehicle::find_active();

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count vehicles: {}", e)))?;

        let vehicles = select
            .order_by_asc(vehicle::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list vehicles: {}", e)))?;

        Ok((vehicles, total))
    }

    /// Apply a partial update. Returns `None` if the vehicle is missing or deleted.
    pub async fn update_vehicle(
        &self,
        id: i32,
        changes: UpdateVehicleRequest,
    ) -> AppResult<Option<vehicle::Model>> {
        let Some(existing) = self.get_vehicle(id).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        if let Some(make) = changes.make {
            active.make = Set(make);
        }
        if let Some(model) = changes.model {
            active.model = Set(model);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        let plate = changes.license_plate.clone();
        if let Some(license_plate) = changes.license_plate {
            active.license_plate = Set(license_plate);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.connection()).await.map_err(|e| {
            AppError::from_write(
                e,
                format!(
                    "A vehicle with plate {} already exists",
                    plate.unwrap_or_default()
                ),
            )
        })?;

        Ok(Some(updated))
    }

    /// Soft-delete a vehicle. Returns `false` if it was missing or already deleted.
    pub async fn soft_delete_vehicle(&self, id: i32) -> AppResult<bool> {
        let Some(existing) = self.get_vehicle(id).await? else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut active: ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete vehicle: {}", e)))?;

        Ok(true)
    }
}
