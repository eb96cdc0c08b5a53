//! Upload endpoint tests: stored file, image row and queued processing.

use std::time::Duration;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::Value;
use vehicle_vision_lib::api;
use vehicle_vision_lib::services::{Dispatcher, ImageStorage};

use super::helpers::TestEnv;
use super::mock_analyzer::{Behavior, MockAnalyzer, vehicle_type_for};

const BOUNDARY: &str = "----vehicle-vision-test-boundary";
const MAX_UPLOAD_SIZE: usize = 1024;

/// Build a multipart body with one part named `field`.
fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn test_app(
    env: &TestEnv,
    analyzer_url: &str,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let storage = ImageStorage::new(env.upload_dir()).await.unwrap();
    let dispatcher = Dispatcher::new(env.processor(analyzer_url));

    test::init_service(
        App::new()
            .app_data(web::Data::new(env.pool.clone()))
            .app_data(web::Data::new(storage))
            .app_data(web::Data::new(dispatcher))
            .app_data(web::Data::new(MAX_UPLOAD_SIZE))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_vehicle_routes)
                    .configure(api::configure_image_routes)
                    .configure(api::configure_analysis_routes),
            ),
    )
    .await
}

async fn upload<S>(
    app: &S,
    vehicle_id: i32,
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/vehicles/{}/images", vehicle_id))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(field, filename, content_type, data))
        .to_request();

    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Upload → 201, file on disk, processing completes in the background.
#[actix_rt::test]
async fn test_upload_stores_and_processes_image() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let app = test_app(&env, &mock.url).await;
    let vehicle = env.seed_vehicle("UPL0001").await;

    let (status, body) = upload(
        &app,
        vehicle.id,
        "file",
        "../front bumper.jpg",
        "image/jpeg",
        b"jpeg-bytes",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["filename"], "front bumper.jpg");
    assert_eq!(body["size"], 10);
    assert!(body.get("path").is_none());

    let image_id = body["id"].as_i64().unwrap() as i32;
    let stored = env.image(image_id).await;
    assert!(std::path::Path::new(&stored.path).starts_with(env.upload_dir().join(vehicle.id.to_string())));
    assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"jpeg-bytes");

    assert!(
        env.wait_until_processed(image_id, Duration::from_secs(10)).await,
        "uploaded image was never processed"
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/images/{}/analyses", image_id))
        .to_request();
    let analyses: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(analyses.as_array().unwrap().len(), 1);
    assert_eq!(analyses[0]["vehicle_type"], vehicle_type_for(&image_id.to_string()));

    let captured = mock.requests();
    assert_eq!(captured[0].filename.as_deref(), Some("front bumper.jpg"));
    assert_eq!(captured[0].bytes, b"jpeg-bytes");
}

#[actix_rt::test]
async fn test_upload_rejects_invalid_files() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let app = test_app(&env, &mock.url).await;
    let vehicle = env.seed_vehicle("UPL0002").await;

    let (status, _) = upload(&app, vehicle.id, "file", "notes.txt", "text/plain", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(&app, vehicle.id, "file", "empty.png", "image/png", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let too_big = vec![0u8; MAX_UPLOAD_SIZE + 1];
    let (status, body) = upload(&app, vehicle.id, "file", "big.png", "image/png", &too_big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");

    let (status, _) = upload(&app, vehicle.id, "photo", "car.png", "image/png", b"png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(&app, 9999, "file", "car.png", "image/png", b"png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(env.pool.list_images_for_vehicle(vehicle.id).await.unwrap().is_empty());
}

/// Analyze endpoint → 202 and a second analysis once processing finishes.
#[actix_rt::test]
async fn test_analyze_endpoint_requeues_image() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Status(500)).await;
    let app = test_app(&env, &mock.url).await;
    let vehicle = env.seed_vehicle("UPL0003").await;
    let image = env.seed_image(vehicle.id, "rear.jpg").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/images/{}/analyze", image.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["image_id"], image.id);
    assert_eq!(body["status"], "queued");

    assert!(env.wait_until_processed(image.id, Duration::from_secs(10)).await);
    let analyses = env.analyses(image.id).await;
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].confidence_score, 0.7);

    let req = test::TestRequest::post()
        .uri("/api/v1/images/9999/analyze")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_deleted_image_is_hidden() {
    let env = TestEnv::new().await;
    let mock = MockAnalyzer::start(Behavior::Succeed).await;
    let app = test_app(&env, &mock.url).await;
    let vehicle = env.seed_vehicle("UPL0004").await;
    let image = env.seed_image(vehicle.id, "left.jpg").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/images/{}", image.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/images/{}", image.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/vehicles/{}/images", vehicle.id))
        .to_request();
    let images: Value = test::call_and_read_body_json(&app, req).await;
    assert!(images.as_array().unwrap().is_empty());
}
