//! Image domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::image;

/// Image metadata as returned by the API.
///
/// The storage path is internal and not exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: i32,
    pub vehicle_id: i32,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<image::Model> for ImageResponse {
    fn from(m: image::Model) -> Self {
        Self {
            id: m.id,
            vehicle_id: m.vehicle_id,
            filename: m.filename,
            content_type: m.content_type,
            size: m.size,
            processed: m.processed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Response for a processing request that was handed off.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessingQueuedResponse {
    pub image_id: i32,
    pub status: &'static str,
}
