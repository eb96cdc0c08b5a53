//! Mock image analyzer for processing tests.
//!
//! Starts an in-process HTTP server that accepts the analyzer's multipart
//! form, records what it received and answers according to a configured
//! behavior.

use actix_multipart::Multipart;
use actix_web::{App, HttpResponse, HttpServer, post, web};
use futures_util::StreamExt;
use serde_json::json;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 200 with a result derived from the submitted image ID.
    Succeed,
    /// Like `Succeed`, after sleeping.
    SucceedAfter(Duration),
    /// 200 with a fixed confidence score.
    SucceedWithConfidence(f64),
    /// Like `Succeed`, but echoing another image ID.
    SucceedForImage(i64),
    /// Non-success status with a JSON error body.
    Status(u16),
    /// 200 with a body that is not an analysis.
    Malformed,
}

/// One received analyzer call.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub image_id: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct MockState {
    pub behavior: Behavior,
    pub requests: Vec<CapturedRequest>,
}

/// Vehicle type the mock reports for an image.
pub fn vehicle_type_for(image_id: &str) -> String {
    format!("Sedan-{}", image_id)
}

/// Plate the mock reports for an image.
pub fn plate_for(image_id: &str) -> String {
    format!("MCK{}", image_id)
}

fn analysis_body(image_id: &str, confidence: f64) -> serde_json::Value {
    json!({
        "image_id": image_id.parse::<i64>().ok(),
        "vehicle_type": vehicle_type_for(image_id),
        "license_plate": plate_for(image_id),
        "confidence_score": confidence,
        "damage_detected": true,
        "damage_details": "Scratch on rear bumper",
        "processed_at": "2025-03-01T10:15:30.250000",
    })
}

#[post("/analyze/vehicle")]
async fn analyze_endpoint(
    state: web::Data<Arc<Mutex<MockState>>>,
    mut payload: Multipart,
) -> HttpResponse {
    let mut captured = CapturedRequest {
        image_id: None,
        filename: None,
        content_type: None,
        bytes: Vec::new(),
    };

    while let Some(item) = payload.next().await {
        let Ok(mut field) = item else {
            return HttpResponse::BadRequest().finish();
        };
        let name = field.name().map(str::to_string);
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(Ok(chunk)) = field.next().await {
            data.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some("image_id") => captured.image_id = String::from_utf8(data).ok(),
            Some("file") => {
                captured.filename = filename;
                captured.content_type = content_type;
                captured.bytes = data;
            }
            _ => {}
        }
    }

    let image_id = captured.image_id.clone().unwrap_or_default();
    let behavior = {
        let mut state = state.lock().unwrap();
        state.requests.push(captured);
        state.behavior.clone()
    };

    match behavior {
        Behavior::Succeed => HttpResponse::Ok().json(analysis_body(&image_id, 0.93)),
        Behavior::SucceedAfter(delay) => {
            tokio::time::sleep(delay).await;
            HttpResponse::Ok().json(analysis_body(&image_id, 0.93))
        }
        Behavior::SucceedWithConfidence(confidence) => {
            HttpResponse::Ok().json(analysis_body(&image_id, confidence))
        }
        Behavior::SucceedForImage(other) => {
            let mut body = analysis_body(&image_id, 0.93);
            body["image_id"] = json!(other);
            HttpResponse::Ok().json(body)
        }
        Behavior::Status(code) => {
            let status = actix_web::http::StatusCode::from_u16(code).unwrap();
            HttpResponse::build(status).json(json!({ "detail": "analysis failed" }))
        }
        Behavior::Malformed => HttpResponse::Ok()
            .content_type("application/json")
            .body(r#"{"unexpected": true"#),
    }
}

/// Mock analyzer listening on an ephemeral port.
pub struct MockAnalyzer {
    pub url: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockAnalyzer {
    /// Start the mock on an ephemeral port.
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            behavior,
            requests: Vec::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{}/analyze/vehicle", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(analyze_endpoint)
        })
        .workers(2)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Lives until the test's runtime shuts down
        tokio::spawn(server);

        MockAnalyzer { url, state }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

/// URL of a port with nothing listening on it.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/analyze/vehicle", port)
}
