//! Shared helpers for processing tests.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sea_orm::ConnectOptions;
use tempfile::TempDir;
use vehicle_vision_lib::config::AnalyzerSettings;
use vehicle_vision_lib::db::DbPool;
use vehicle_vision_lib::db::images::NewImage;
use vehicle_vision_lib::entity::{analysis, image, vehicle};
use vehicle_vision_lib::models::CreateVehicleRequest;
use vehicle_vision_lib::services::{HttpImageAnalyzer, ImageProcessor};

/// Bytes written for seeded images.
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-payload";

/// Per-test database and upload directory.
pub struct TestEnv {
    pub pool: DbPool,
    pub dir: TempDir,
}

impl TestEnv {
    /// Migrated SQLite database in a fresh temp directory.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display());

        let mut options = ConnectOptions::new(url);
        options.max_connections(1).sqlx_logging(false);

        let pool = DbPool::connect(options)
            .await
            .expect("Failed to open SQLite database");
        pool.run_migrations().await.expect("Failed to run migrations");

        TestEnv { pool, dir }
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    pub async fn seed_vehicle(&self, plate: &str) -> vehicle::Model {
        self.pool
            .insert_vehicle(CreateVehicleRequest {
                make: "Volkswagen".to_string(),
                model: "Gol".to_string(),
                year: 2015,
                color: "Red".to_string(),
                license_plate: plate.to_string(),
            })
            .await
            .unwrap()
    }

    /// Write an image file and record it for `vehicle_id`.
    pub async fn seed_image(&self, vehicle_id: i32, name: &str) -> image::Model {
        let path = self.dir.path().join(name);
        tokio::fs::write(&path, IMAGE_BYTES).await.unwrap();
        self.seed_image_at(vehicle_id, &path).await
    }

    /// Record an image whose path may or may not exist.
    pub async fn seed_image_at(&self, vehicle_id: i32, path: &Path) -> image::Model {
        self.pool
            .insert_image(NewImage {
                vehicle_id,
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.to_string_lossy().into_owned(),
                content_type: "image/jpeg".to_string(),
                size: IMAGE_BYTES.len() as i64,
            })
            .await
            .unwrap()
    }

    pub fn processor(&self, analyzer_url: &str) -> ImageProcessor {
        self.processor_with_timeout(analyzer_url, Duration::from_secs(5))
    }

    pub fn processor_with_timeout(&self, analyzer_url: &str, timeout: Duration) -> ImageProcessor {
        let analyzer = HttpImageAnalyzer::new(&AnalyzerSettings {
            url: analyzer_url.to_string(),
            timeout,
        })
        .unwrap();
        ImageProcessor::new(self.pool.clone(), Arc::new(analyzer))
    }

    pub async fn image(&self, id: i32) -> image::Model {
        self.pool.get_image(id).await.unwrap().unwrap()
    }

    pub async fn analyses(&self, image_id: i32) -> Vec<analysis::Model> {
        self.pool.list_analyses_for_image(image_id).await.unwrap()
    }

    /// Poll until the image is marked processed or `timeout` elapses.
    pub async fn wait_until_processed(&self, image_id: i32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.image(image_id).await.processed {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }
}
