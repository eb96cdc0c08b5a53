//! Vehicle domain models and DTOs.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::vehicle;
use crate::error::{AppError, AppResult};

/// First model year accepted for a vehicle.
pub const MIN_VEHICLE_YEAR: i32 = 1886;

/// Request body for registering a vehicle.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    /// License plate, unique across all vehicles.
    #[serde(rename = "license")]
    pub license_plate: String,
}

impl CreateVehicleRequest {
    /// Trim text fields and check them.
    pub fn normalized(self) -> AppResult<Self> {
        let req = Self {
            make: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            year: self.year,
            color: self.color.trim().to_string(),
            license_plate: normalize_plate(&self.license_plate),
        };

        require_text("make", &req.make)?;
        require_text("model", &req.model)?;
        require_text("color", &req.color)?;
        require_text("license", &req.license_plate)?;
        validate_year(req.year)?;

        Ok(req)
    }
}

/// Partial update for a vehicle. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    #[serde(rename = "license")]
    pub license_plate: Option<String>,
}

impl UpdateVehicleRequest {
    pub fn normalized(self) -> AppResult<Self> {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        let req = Self {
            make: trim(self.make),
            model: trim(self.model),
            year: self.year,
            color: trim(self.color),
            license_plate: self.license_plate.as_deref().map(normalize_plate),
        };

        if let Some(ref make) = req.make {
            require_text("make", make)?;
        }
        if let Some(ref model) = req.model {
            require_text("model", model)?;
        }
        if let Some(ref color) = req.color {
            require_text("color", color)?;
        }
        if let Some(ref plate) = req.license_plate {
            require_text("license", plate)?;
        }
        if let Some(year) = req.year {
            validate_year(year)?;
        }

        Ok(req)
    }

    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.color.is_none()
            && self.license_plate.is_none()
    }
}

/// Vehicle as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleResponse {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    #[serde(rename = "license")]
    pub license_plate: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<vehicle::Model> for VehicleResponse {
    fn from(m: vehicle::Model) -> Self {
        Self {
            id: m.id,
            make: m.make,
            model: m.model,
            year: m.year,
            color: m.color,
            license_plate: m.license_plate,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Paginated vehicle list.
#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleListResponse {
    pub vehicles: Vec<VehicleResponse>,
    pub pagination: super::Pagination,
}

fn normalize_plate(plate: &str) -> String {
    plate.trim().to_string()
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.chars().count() > 255 {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most 255 characters",
            field
        )));
    }
    Ok(())
}

fn validate_year(year: i32) -> AppResult<()> {
    let max_year = Utc::now().year() + 1;
    if !(MIN_VEHICLE_YEAR..=max_year).contains(&year) {
        return Err(AppError::InvalidInput(format!(
            "year must be between {} and {}",
            MIN_VEHICLE_YEAR, max_year
        )));
    }
    Ok(())
}
