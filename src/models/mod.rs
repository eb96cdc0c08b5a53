//! Domain models for the Vehicle Vision API.

use utoipa::{IntoParams, ToSchema};

pub mod analysis;
pub mod image;
pub mod vehicle;

// Re-export commonly used types
pub use analysis::{AnalysisListResponse, AnalysisResponse, NewAnalysis};
pub use image::{ImageResponse, ProcessingQueuedResponse};
pub use vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleListResponse, VehicleResponse,
};

/// Pagination parameters.
#[derive(Debug, Clone, Default, serde::Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1 (default: 1).
    pub page: Option<u32>,
    /// Page size (default: 50, max: 100).
    pub limit: Option<u32>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(default_page()).max(1)
    }

    /// Calculate the offset for database queries.
    pub fn offset(&self) -> u64 {
        (self.page().saturating_sub(1) as u64) * self.clamped_limit() as u64
    }

    /// Clamp limit to maximum allowed value.
    pub fn clamped_limit(&self) -> u32 {
        self.limit.unwrap_or(default_limit()).clamp(1, 100)
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(limit.max(1) as u64) as u32
        };

        Pagination {
            page,
            limit,
            total,
            total_pages,
        }
    }
}
