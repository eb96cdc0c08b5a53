//! Image API handlers: upload, lookup, deletion and processing requests.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use tracing::{info, warn};

use crate::db::DbPool;
use crate::db::images::NewImage;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResponse, ImageResponse, ProcessingQueuedResponse};
use crate::services::{Dispatcher, ImageStorage};

/// Multipart field carrying the image bytes.
const FILE_FIELD: &str = "file";

/// A fully received image part.
struct ReceivedImage {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

/// Pull the `file` part out of a multipart body, enforcing type and size rules.
async fn read_image_field(payload: &mut Multipart, max_upload_size: usize) -> AppResult<ReceivedImage> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        if field.name() != Some(FILE_FIELD) {
            // Drain unrelated parts so the stream can advance.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::InvalidInput(format!(
                "File must be an image, got '{}'",
                content_type
            )));
        }

        let filename = ImageStorage::sanitize_filename(
            field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default(),
        );

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > max_upload_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "Image exceeds maximum size of {} bytes",
                    max_upload_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
        }

        return Ok(ReceivedImage {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::InvalidInput(format!(
        "Missing '{}' field in multipart form",
        FILE_FIELD
    )))
}

/// Upload an image for a vehicle and queue it for analysis.
///
/// Accepts multipart form data with a single `file` part of an `image/*`
/// content type. The response is sent before analysis starts.
#[utoipa::path(
    post,
    path = "/vehicles/{id}/images",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Vehicle ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a `file` image part"),
    responses(
        (status = 201, description = "Image stored and queued", body = ImageResponse),
        (status = 400, description = "Invalid upload", body = crate::error::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorResponse),
        (status = 413, description = "Image larger than the upload limit", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_image(
    pool: web::Data<DbPool>,
    storage: web::Data<ImageStorage>,
    dispatcher: web::Data<Dispatcher>,
    max_upload_size: web::Data<usize>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let vehicle_id = path.into_inner();

    pool.get_vehicle(vehicle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {}", vehicle_id)))?;

    let received = read_image_field(&mut payload, *max_upload_size.get_ref()).await?;
    let size = received.data.len();

    let stored_path = storage
        .put(
            vehicle_id,
            &received.filename,
            &received.content_type,
            &received.data,
        )
        .await?;

    let new_image = NewImage {
        vehicle_id,
        filename: received.filename,
        path: stored_path.to_string_lossy().into_owned(),
        content_type: received.content_type,
        size: size as i64,
    };

    let image = match pool.insert_image(new_image).await {
        Ok(image) => image,
        Err(e) => {
            storage.remove(&stored_path).await;
            return Err(e);
        }
    };

    info!(
        "Image uploaded: id={}, vehicle_id={}, size={} bytes",
        image.id, vehicle_id, size
    );

    dispatcher.enqueue(image.id);

    Ok(HttpResponse::Created().json(ImageResponse::from(image)))
}

/// List images of a vehicle.
#[utoipa::path(
    get,
    path = "/vehicles/{id}/images",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Images of the vehicle", body = Vec<ImageResponse>),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_vehicle_images(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let vehicle_id = path.into_inner();

    pool.get_vehicle(vehicle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {}", vehicle_id)))?;

    let images: Vec<ImageResponse> = pool
        .list_images_for_vehicle(vehicle_id)
        .await?
        .into_iter()
        .map(ImageResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(images))
}

/// Get image metadata.
#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image", body = ImageResponse),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_image(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let image = pool
        .get_image(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {}", id)))?;

    Ok(HttpResponse::Ok().json(ImageResponse::from(image)))
}

/// Soft-delete an image. The stored file is kept.
#[utoipa::path(
    delete,
    path = "/images/{id}",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_image(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !pool.soft_delete_image(id).await? {
        return Err(AppError::NotFound(format!("Image {}", id)));
    }

    info!("Image deleted: id={}", id);

    Ok(HttpResponse::NoContent().finish())
}

/// Queue an image for (re-)analysis.
///
/// Each request appends a new analysis; earlier ones are kept.
#[utoipa::path(
    post,
    path = "/images/{id}/analyze",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 202, description = "Processing queued", body = ProcessingQueuedResponse),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn analyze_image(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<Dispatcher>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let image = pool
        .get_image(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {}", id)))?;

    if image.processed {
        warn!("Re-processing already processed image: id={}", id);
    }

    dispatcher.enqueue(image.id);

    Ok(HttpResponse::Accepted().json(ProcessingQueuedResponse {
        image_id: image.id,
        status: "queued",
    }))
}

/// List analyses of an image, newest first.
#[utoipa::path(
    get,
    path = "/images/{id}/analyses",
    tag = "Images",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Analyses of the image", body = Vec<AnalysisResponse>),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_image_analyses(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    pool.get_image(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {}", id)))?;

    let analyses: Vec<AnalysisResponse> = pool
        .list_analyses_for_image(id)
        .await?
        .into_iter()
        .map(AnalysisResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(analyses))
}

/// Configure image routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/vehicles/{id}/images")
            .route(web::get().to(list_vehicle_images))
            .route(web::post().to(upload_image)),
    )
    .service(
        web::resource("/images/{id}")
            .route(web::get().to(get_image))
            .route(web::delete().to(delete_image)),
    )
    .service(web::resource("/images/{id}/analyze").route(web::post().to(analyze_image)))
    .service(web::resource("/images/{id}/analyses").route(web::get().to(list_image_analyses)));
}
