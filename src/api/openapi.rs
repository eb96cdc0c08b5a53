//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vehicle Vision API",
        version = "0.1.0",
        description = "Vehicle registry with image uploads and asynchronous image analysis"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Vehicle endpoints
        api::vehicles::list_vehicles,
        api::vehicles::create_vehicle,
        api::vehicles::get_vehicle,
        api::vehicles::update_vehicle,
        api::vehicles::delete_vehicle,
        // Image endpoints
        api::images::list_vehicle_images,
        api::images::upload_image,
        api::images::get_image,
        api::images::delete_image,
        api::images::analyze_image,
        api::images::list_image_analyses,
        // Analysis endpoints
        api::analyses::list_analyses,
        api::analyses::get_analysis,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::Pagination,
            models::CreateVehicleRequest,
            models::UpdateVehicleRequest,
            models::VehicleResponse,
            models::VehicleListResponse,
            models::ImageResponse,
            models::ProcessingQueuedResponse,
            models::AnalysisResponse,
            models::AnalysisListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Vehicles", description = "Vehicle registry"),
        (name = "Images", description = "Image upload and processing"),
        (name = "Analyses", description = "Image analysis results")
    )
)]
pub struct ApiDoc;
