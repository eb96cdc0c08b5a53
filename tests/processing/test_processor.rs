//! Processor tests: analyzer success path and early terminations.

use chrono::{TimeZone, Utc};
use sea_orm::ConnectionTrait;
use vehicle_vision_lib::services::ProcessOutcome;

use super::helpers::{IMAGE_BYTES, TestEnv};
use super::mock_analyzer::{Behavior, MockAnalyzer, plate_for, unreachable_url, vehicle_type_for};

/// Make every insert into `analyses` fail.
async fn reject_analysis_inserts(env: &TestEnv) {
    env.pool
        .connection()
        .execute_unprepared(
            "CREATE TRIGGER reject_analyses BEFORE INSERT ON analyses \
             BEGIN SELECT RAISE(ABORT, 'analyses are read-only'); END;",
        )
        .await
        .unwrap();
}

/// Analyzer success → exactly one analysis matching the response, image processed.
#[actix_rt::test]
async fn test_success_persists_analyzer_result() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("OK00001").await;
    let image = env.seed_image(vehicle.id, "front.jpg").await;

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::Analyzed);

    let analyses = env.analyses(image.id).await;
    assert_eq!(analyses.len(), 1);
    let id = image.id.to_string();
    assert_eq!(analyses[0].vehicle_type, vehicle_type_for(&id));
    assert_eq!(analyses[0].license_plate, plate_for(&id));
    assert_eq!(analyses[0].confidence_score, 0.93);
    assert!(analyses[0].damage_detected);
    assert_eq!(analyses[0].damage_details, "Scratch on rear bumper");
    assert_eq!(
        analyses[0].processed_at,
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 30).unwrap() + chrono::Duration::milliseconds(250)
    );

    assert!(env.image(image.id).await.processed);
}

/// The analyzer receives the image ID as text and the file under its original name.
#[actix_rt::test]
async fn test_analyzer_receives_multipart_form() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("MP00001").await;
    let image = env.seed_image(vehicle.id, "side-view.jpg").await;

    env.processor(&mock.url).process(image.id).await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image_id.as_deref(), Some(image.id.to_string().as_str()));
    assert_eq!(requests[0].filename.as_deref(), Some("side-view.jpg"));
    assert_eq!(requests[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(requests[0].bytes, IMAGE_BYTES);
}

/// Unknown image → nothing written, analyzer never called.
#[actix_rt::test]
async fn test_unknown_image_is_a_no_op() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;

    let outcome = env.processor(&mock.url).process(4242).await;
    assert_eq!(outcome, ProcessOutcome::ImageNotFound);

    let (analyses, total) = env.pool.list_analyses(0, 10).await.unwrap();
    assert!(analyses.is_empty());
    assert_eq!(total, 0);
    assert!(mock.requests().is_empty());
}

/// Soft-deleted images are treated as not found.
#[actix_rt::test]
async fn test_deleted_image_is_not_processed() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("DL00001").await;
    let image = env.seed_image(vehicle.id, "gone.jpg").await;
    env.pool.soft_delete_image(image.id).await.unwrap();

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::ImageNotFound);
    assert!(env.analyses(image.id).await.is_empty());
}

/// Missing file → processed unchanged, no analysis, analyzer never called.
#[actix_rt::test]
async fn test_missing_file_stops_processing() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("MF00001").await;
    let missing = env.dir.path().join("never-written.jpg");
    let image = env.seed_image_at(vehicle.id, &missing).await;

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::FileMissing);

    assert!(!env.image(image.id).await.processed);
    assert!(env.analyses(image.id).await.is_empty());
    assert!(mock.requests().is_empty());
}

/// Out-of-range confidence is stored as reported.
#[actix_rt::test]
async fn test_out_of_range_confidence_is_kept() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::SucceedWithConfidence(87.5)).await;
    let vehicle = env.seed_vehicle("CF00001").await;
    let image = env.seed_image(vehicle.id, "conf.jpg").await;

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::Analyzed);
    assert_eq!(env.analyses(image.id).await[0].confidence_score, 87.5);
}

/// Processing an image twice appends a second analysis.
#[actix_rt::test]
async fn test_reprocessing_appends_analysis() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("RP00001").await;
    let image = env.seed_image(vehicle.id, "again.jpg").await;
    let processor = env.processor(&mock.url);

    assert_eq!(processor.process(image.id).await, ProcessOutcome::Analyzed);
    assert_eq!(processor.process(image.id).await, ProcessOutcome::Analyzed);

    assert_eq!(env.analyses(image.id).await.len(), 2);
    assert!(env.image(image.id).await.processed);
}

/// An analyzer echoing another image ID does not redirect the analysis.
#[actix_rt::test]
async fn test_mismatched_image_id_is_ignored() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::SucceedForImage(777)).await;
    let vehicle = env.seed_vehicle("ID00001").await;
    let image = env.seed_image(vehicle.id, "echo.jpg").await;

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::Analyzed);

    let analyses = env.analyses(image.id).await;
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].image_id, image.id);
    assert_eq!(analyses[0].vehicle_type, vehicle_type_for(&image.id.to_string()));
}

/// Failed analysis insert → image left unprocessed, nothing written.
#[actix_rt::test]
async fn test_failed_insert_leaves_image_unprocessed() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let vehicle = env.seed_vehicle("PF00001").await;
    let image = env.seed_image(vehicle.id, "persist.jpg").await;
    reject_analysis_inserts(&env).await;

    let outcome = env.processor(&mock.url).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::PersistFailed);
    assert!(!outcome.is_complete());

    assert_eq!(mock.requests().len(), 1);
    assert!(!env.image(image.id).await.processed);
    assert!(env.analyses(image.id).await.is_empty());
}

/// Same for the simulated analysis written after an analyzer failure.
#[actix_rt::test]
async fn test_failed_simulated_insert_leaves_image_unprocessed() {
    let env = TestEnv::new().await;
    let vehicle = env.seed_vehicle("PF00002").await;
    let image = env.seed_image(vehicle.id, "persist-sim.jpg").await;
    reject_analysis_inserts(&env).await;

    let outcome = env.processor(&unreachable_url()).process(image.id).await;
    assert_eq!(outcome, ProcessOutcome::PersistFailed);

    assert!(!env.image(image.id).await.processed);
    assert!(env.analyses(image.id).await.is_empty());
}
