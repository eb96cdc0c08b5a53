//! Database queries for images.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::image::{self, ActiveModel, Entity as Image};
use crate::error::{AppError, AppResult};

use super::{DbPool, SoftDelete};

/// Metadata of a stored upload, ready to be recorded.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub vehicle_id: i32,
    pub filename: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
}

impl DbPool {
    /// Insert a new, unprocessed image.
    pub async fn insert_image(&self, new: NewImage) -> AppResult<image::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            vehicle_id: Set(new.vehicle_id),
            filename: Set(new.filename),
            path: Set(new.path),
            content_type: Set(new.content_type),
            size: Set(new.size),
            processed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert image: {}", e)))
    }

    /// Get a non-deleted image by ID.
    pub async fn get_image(&self, id: i32) -> AppResult<Option<image::Model>> {
        Image::find_active_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get image: {}", e)))
    }

    /// List non-deleted images of a vehicle, oldest first.
    pub async fn list_images_for_vehicle(&self, vehicle_id: i32) -> AppResult<Vec<image::Model>> {
        Image::find_active()
            .filter(image::Column::VehicleId.eq(vehicle_id))
            .order_by_asc(image::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list images: {}", e)))
    }

    /// Set `processed = true` on an image.
    ///
    /// Only the flag and `updated_at` are written. The flag is never cleared here.
    pub async fn mark_image_processed(&self, id: i32) -> AppResult<()> {
        let result = Image::update_many()
            .col_expr(image::Column::Processed, Expr::value(true))
            .col_expr(image::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(image::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark image processed: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Image {}", id)));
        }

        Ok(())
    }

    /// Soft-delete an image. Returns `false` if it was missing or already deleted.
    pub async fn soft_delete_image(&self, id: i32) -> AppResult<bool> {
        let Some(existing) = self.get_image(id).await? else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut active: ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete image: {}", e)))?;

        Ok(true)
    }
}
