//! Analysis domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::analysis;

/// Damage details stored on analyses manufactured by the fallback path.
pub const SIMULATED_DAMAGE_DETAILS: &str = "Simulated analysis - failed to call processing service";

/// Confidence assigned to simulated analyses.
pub const SIMULATED_CONFIDENCE: f64 = 0.7;

/// Fields of an analysis about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub image_id: i32,
    pub vehicle_type: String,
    pub license_plate: String,
    pub confidence_score: f64,
    pub damage_detected: bool,
    pub damage_details: String,
    pub processed_at: DateTime<Utc>,
}

impl NewAnalysis {
    /// Build a simulated analysis that reports back the vehicle's stored attributes.
    pub fn simulated(image_id: i32, vehicle_model: &str, license_plate: &str) -> Self {
        Self {
            image_id,
            vehicle_type: vehicle_model.to_string(),
            license_plate: license_plate.to_string(),
            confidence_score: SIMULATED_CONFIDENCE,
            damage_detected: false,
            damage_details: SIMULATED_DAMAGE_DETAILS.to_string(),
            processed_at: Utc::now(),
        }
    }
}

/// Analysis as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub id: i32,
    pub image_id: i32,
    pub vehicle_type: String,
    pub license_plate: String,
    #[serde(rename = "confidence")]
    pub confidence_score: f64,
    pub damage_detected: bool,
    pub damage_details: String,
    pub processed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<analysis::Model> for AnalysisResponse {
    fn from(m: analysis::Model) -> Self {
        Self {
            id: m.id,
            image_id: m.image_id,
            vehicle_type: m.vehicle_type,
            license_plate: m.license_plate,
            confidence_score: m.confidence_score,
            damage_detected: m.damage_detected,
            damage_details: m.damage_details,
            processed_at: m.processed_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Paginated analysis list.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisListResponse {
    pub analyses: Vec<AnalysisResponse>,
    pub pagination: super::Pagination,
}
