//! Analysis read endpoints.

use actix_web::{HttpResponse, web};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisListResponse, AnalysisResponse, Pagination, PaginationParams};

/// List analyses across all images, newest first.
#[utoipa::path(
    get,
    path = "/analyses",
    tag = "Analyses",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of analyses", body = AnalysisListResponse),
    )
)]
pub async fn list_analyses(
    pool: web::Data<DbPool>,
    query: web::Query<PaginationParams>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let limit = query.clamped_limit();

    let (analyses, total) = pool.list_analyses(query.offset(), limit as u64).await?;

    Ok(HttpResponse::Ok().json(AnalysisListResponse {
        analyses: analyses.into_iter().map(AnalysisResponse::from).collect(),
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Get an analysis by ID.
#[utoipa::path(
    get,
    path = "/analyses/{id}",
    tag = "Analyses",
    params(
        ("id" = i32, Path, description = "Analysis ID")
    ),
    responses(
        (status = 200, description = "Analysis", body = AnalysisResponse),
        (status = 404, description = "Analysis not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_analysis(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let analysis = pool
        .get_analysis(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {}", id)))?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from(analysis)))
}

/// Configure analysis routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analyses").route(web::get().to(list_analyses)))
        .service(web::resource("/analyses/{id}").route(web::get().to(get_analysis)));
}
