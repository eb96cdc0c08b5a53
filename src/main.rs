//! Vehicle Vision API - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vehicle_vision_lib::api::{self, ApiDoc};
use vehicle_vision_lib::config::Config;
use vehicle_vision_lib::db::DbPool;
use vehicle_vision_lib::middleware;
use vehicle_vision_lib::services::{Dispatcher, HttpImageAnalyzer, ImageProcessor, ImageStorage};

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

fn exit_with(message: &str, e: impl std::fmt::Display) -> ! {
    error!("{}: {}", message, e);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please check your environment variables:");
            error!("  - ENVIRONMENT must be 'development' or 'production'");
            error!("  - In production, DATABASE_PASSWORD must not be the development default");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Vehicle Vision API");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = DbPool::new(&config)
        .await
        .unwrap_or_else(|e| exit_with("Failed to initialize database", e));
    info!("Database connection established");

    pool.run_migrations()
        .await
        .unwrap_or_else(|e| exit_with("Failed to run migrations", e));
    info!("Database migrations complete");

    let storage = ImageStorage::new(config.upload_dir.clone())
        .await
        .unwrap_or_else(|e| exit_with("Failed to prepare upload directory", e));

    let analyzer = HttpImageAnalyzer::new(&config.analyzer)
        .unwrap_or_else(|e| exit_with("Failed to build analyzer client", e));
    info!(
        "Image analyzer: {} (timeout {}s)",
        analyzer.url(),
        config.analyzer.timeout.as_secs()
    );

    let processor = ImageProcessor::new(pool.clone(), Arc::new(analyzer));
    let dispatcher = Dispatcher::new(processor);

    let bind_address = config.bind_address();
    let max_upload_size = config.max_upload_size;
    let is_development = config.is_development();

    info!("Upload limit: {}MB per image", max_upload_size / 1024 / 1024);

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        let cors = if is_development {
            Cors::permissive()
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(dispatcher.clone()))
            .app_data(web::Data::new(max_upload_size))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_vehicle_routes)
                    .configure(api::configure_image_routes)
                    .configure(api::configure_analysis_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
