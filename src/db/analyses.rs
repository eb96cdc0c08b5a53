//! Database queries for analyses.
//!
//! Analyses are append-only: there is no update path.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::analysis::{self, ActiveModel, Entity as Analysis};
use crate::error::{AppError, AppResult};
use crate::models::NewAnalysis;

use super::{DbPool, SoftDelete};

impl DbPool {
    /// Insert an analysis for an existing image.
    pub async fn insert_analysis(&self, new: NewAnalysis) -> AppResult<analysis::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            image_id: Set(new.image_id),
            vehicle_type: Set(new.vehicle_type),
            license_plate: Set(new.license_plate),
            confidence_score: Set(new.confidence_score),
            damage_detected: Set(new.damage_detected),
            damage_details: Set(new.damage_details),
            processed_at: Set(new.processed_at),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert analysis: {}", e)))
    }

    /// Get a non-deleted analysis by ID.
    pub async fn get_analysis(&self, id: i32) -> AppResult<Option<analysis::Model>> {
        Analysis::find_active_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get analysis: {}", e)))
    }

    /// List non-deleted analyses, newest first.
    pub async fn list_analyses(
        &self,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<analysis::Model>, u64)> {
        let select = Analysis::find_active();

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count analyses: {}", e)))?;

        let analyses = select
            .order_by_desc(analysis::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list analyses: {}", e)))?;

        Ok((analyses, total))
    }

    /// List non-deleted analyses of an image, newest first.
    pub async fn list_analyses_for_image(&self, image_id: i32) -> AppResult<Vec<analysis::Model>> {
        Analysis::find_active()
            .filter(analysis::Column::ImageId.eq(image_id))
            .order_by_desc(analysis::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list analyses: {}", e)))
    }
}
