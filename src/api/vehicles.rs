//! Vehicle API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateVehicleRequest, Pagination, PaginationParams, UpdateVehicleRequest, VehicleListResponse,
    VehicleResponse,
};

/// List vehicles, ordered by ID.
#[utoipa::path(
    get,
    path = "/vehicles",
    tag = "Vehicles",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of vehicles", body = VehicleListResponse),
    )
)]
pub async fn list_vehicles(
    pool: web::Data<DbPool>,
    query: web::Query<PaginationParams>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let limit = query.clamped_limit();

    let (vehicles, total) = pool.list_vehicles(query.offset(), limit as u64).await?;

    Ok(HttpResponse::Ok().json(VehicleListResponse {
        vehicles: vehicles.into_iter().map(VehicleResponse::from).collect(),
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Register a vehicle.
#[utoipa::path(
    post,
    path = "/vehicles",
    tag = "Vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = VehicleResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 409, description = "License plate already registered", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_vehicle(
    pool: web::Data<DbPool>,
    body: web::Json<CreateVehicleRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner().normalized()?;
    let vehicle = pool.insert_vehicle(req).await?;

    info!(
        "Vehicle created: id={}, plate={}",
        vehicle.id, vehicle.license_plate
    );

    Ok(HttpResponse::Created().json(VehicleResponse::from(vehicle)))
}

/// Get a vehicle by ID.
#[utoipa::path(
    get,
    path = "/vehicles/{id}",
    tag = "Vehicles",
    params(
        ("id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle", body = VehicleResponse),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_vehicle(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let vehicle = pool
        .get_vehicle(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {}", id)))?;

    Ok(HttpResponse::Ok().json(VehicleResponse::from(vehicle)))
}

/// Update some fields of a vehicle.
#[utoipa::path(
    put,
    path = "/vehicles/{id}",
    tag = "Vehicles",
    params(
        ("id" = i32, Path, description = "Vehicle ID")
    ),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Updated vehicle", body = VehicleResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorResponse),
        (status = 409, description = "License plate already registered", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_vehicle(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateVehicleRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let changes = body.into_inner().normalized()?;
    if changes.is_empty() {
        return Err(AppError::InvalidInput("No fields to update".to_string()));
    }

    let vehicle = pool
        .update_vehicle(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {}", id)))?;

    info!("Vehicle updated: id={}", id);

    Ok(HttpResponse::Ok().json(VehicleResponse::from(vehicle)))
}

/// Soft-delete a vehicle.
#[utoipa::path(
    delete,
    path = "/vehicles/{id}",
    tag = "Vehicles",
    params(
        ("id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_vehicle(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !pool.soft_delete_vehicle(id).await? {
        return Err(AppError::NotFound(format!("Vehicle {}", id)));
    }

    info!("Vehicle deleted: id={}", id);

    Ok(HttpResponse::NoContent().finish())
}

/// Configure vehicle routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/vehicles")
            .route(web::get().to(list_vehicles))
            .route(web::post().to(create_vehicle)),
    )
    .service(
        web::resource("/vehicles/{id}")
            .route(web::get().to(get_vehicle))
            .route(web::put().to(update_vehicle))
            .route(web::delete().to(delete_vehicle)),
    );
}
