//! Image processing: analyzer handoff with simulated fallback.
//!
//! One invocation walks fetch → validate → analyze → finalize and stops at
//! the first terminal state. Nothing is retried. Analyzer failures degrade
//! to a simulated analysis built from the owning vehicle's stored data;
//! every other failure is logged and ends the invocation.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::db::DbPool;
use crate::entity::image;
use crate::models::NewAnalysis;

use super::analyzer::{AnalyzeRequest, ImageAnalyzer};

/// Terminal state reached by one processing invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No non-deleted image with this ID.
    ImageNotFound,
    /// The stored file path does not exist.
    FileMissing,
    /// A store read failed before any write happened.
    LookupFailed,
    /// The analyzer result was persisted.
    Analyzed,
    /// The analyzer failed and a simulated analysis was persisted.
    Simulated,
    /// Writing the analysis failed; the image was left unprocessed.
    PersistFailed,
}

impl ProcessOutcome {
    /// Whether an analysis row was written and the image finalized.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Analyzed | Self::Simulated)
    }
}

/// Runs the processing state machine for single images.
#[derive(Clone)]
pub struct ImageProcessor {
    pool: DbPool,
    analyzer: Arc<dyn ImageAnalyzer>,
}

impl ImageProcessor {
    pub fn new(pool: DbPool, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self { pool, analyzer }
    }

    /// Process one image to a terminal state.
    pub async fn process(&self, image_id: i32) -> ProcessOutcome {
        info!(image_id, "Processing image");

        let image = match self.pool.get_image(image_id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                warn!(image_id, "Image not found, skipping processing");
                return ProcessOutcome::ImageNotFound;
            }
            Err(e) => {
                error!(image_id, error = %e, "Failed to load image");
                return ProcessOutcome::LookupFailed;
            }
        };

        match tokio::fs::metadata(&image.path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(image_id, path = %image.path, "Image file not found, skipping processing");
                return ProcessOutcome::FileMissing;
            }
            // Anything other than absence surfaces again when the analyzer opens the file.
            Err(e) => {
                warn!(image_id, path = %image.path, error = %e, "Could not stat image file");
            }
        }

        match self.call_analyzer(&image).await {
            Some(new_analysis) => {
                if let Err(e) = self.pool.insert_analysis(new_analysis).await {
                    error!(image_id, error = %e, "Failed to save analysis");
                    return ProcessOutcome::PersistFailed;
                }

                self.finalize(image_id).await;
                info!(image_id, "Image processed successfully");
                ProcessOutcome::Analyzed
            }
            None => self.simulate(image_id).await,
        }
    }

    /// Call the analyzer. `None` means the call failed and the fallback applies.
    async fn call_analyzer(&self, image: &image::Model) -> Option<NewAnalysis> {
        let request = AnalyzeRequest {
            image_id: image.id,
            path: Path::new(&image.path),
            filename: &image.filename,
            content_type: &image.content_type,
        };

        match self.analyzer.analyze(request).await {
            Ok(response) => {
                if !(0.0..=1.0).contains(&response.confidence_score) {
                    warn!(
                        image_id = image.id,
                        confidence = response.confidence_score,
                        "Analyzer confidence outside 0..1, storing as reported"
                    );
                }
                if let Some(reported) = response.image_id.filter(|id| *id != i64::from(image.id)) {
                    warn!(
                        image_id = image.id,
                        reported_image_id = reported,
                        "Analyzer reported a different image ID, keeping the requested one"
                    );
                }
                Some(response.into_new_analysis(image.id))
            }
            Err(e) => {
                warn!(
                    image_id = image.id,
                    error = %e,
                    "Image analyzer call failed, using simulated analysis"
                );
                None
            }
        }
    }

    /// Persist a simulated analysis from the owning vehicle's model and plate.
    async fn simulate(&self, image_id: i32) -> ProcessOutcome {
        let image = match self.pool.get_image(image_id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                warn!(image_id, "Image disappeared before simulated analysis");
                return ProcessOutcome::LookupFailed;
            }
            Err(e) => {
                error!(image_id, error = %e, "Failed to reload image for simulated analysis");
                return ProcessOutcome::LookupFailed;
            }
        };

        // The foreign key is authoritative, so a soft-deleted owner still counts.
        let vehicle = match self.pool.get_vehicle_unscoped(image.vehicle_id).await {
            Ok(Some(vehicle)) => vehicle,
            Ok(None) => {
                error!(image_id, vehicle_id = image.vehicle_id, "Owning vehicle not found");
                return ProcessOutcome::LookupFailed;
            }
            Err(e) => {
                error!(image_id, error = %e, "Failed to load owning vehicle");
                return ProcessOutcome::LookupFailed;
            }
        };

        let analysis = NewAnalysis::simulated(image_id, &vehicle.model, &vehicle.license_plate);
        if let Err(e) = self.pool.insert_analysis(analysis).await {
            error!(image_id, error = %e, "Failed to save simulated analysis");
            return ProcessOutcome::PersistFailed;
        }

        self.finalize(image_id).await;
        info!(image_id, "Image processed with simulated analysis");
        ProcessOutcome::Simulated
    }

    /// Mark the image processed. Failure here is logged only.
    async fn finalize(&self, image_id: i32) {
        if let Err(e) = self.pool.mark_image_processed(image_id).await {
            error!(image_id, error = %e, "Failed to mark image as processed");
        }
    }
}
