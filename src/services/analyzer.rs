//! External image analyzer client.
//!
//! Submits an image to the vehicle analysis service as a multipart form
//! (`image_id` text field + `file` part) and decodes the JSON result.
//! Every call is bounded by the configured timeout.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::AnalyzerSettings;
use crate::models::NewAnalysis;

/// Inputs for one analyzer call.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeRequest<'a> {
    pub image_id: i32,
    /// Local file holding the image bytes.
    pub path: &'a Path,
    /// Filename sent with the file part (the original upload name).
    pub filename: &'a str,
    pub content_type: &'a str,
}

/// Result returned by the analyzer on success.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzerResponse {
    /// Image ID echoed by the analyzer. Only checked, never stored.
    #[serde(default)]
    pub image_id: Option<i64>,
    pub vehicle_type: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    pub confidence_score: f64,
    pub damage_detected: bool,
    #[serde(default)]
    pub damage_details: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub processed_at: DateTime<Utc>,
}

impl AnalyzerResponse {
    /// Convert into an analysis record for `image_id`. Absent text fields become empty.
    pub fn into_new_analysis(self, image_id: i32) -> NewAnalysis {
        NewAnalysis {
            image_id,
            vehicle_type: self.vehicle_type,
            license_plate: self.license_plate.unwrap_or_default(),
            confidence_score: self.confidence_score,
            damage_detected: self.damage_detected,
            damage_details: self.damage_details.unwrap_or_default(),
            processed_at: self.processed_at,
        }
    }
}

/// Analyzer call failures. All of them route the processor to the fallback path.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("failed to read image file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection failure, timeout or transport error.
    #[error("analyzer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("analyzer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed analyzer response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam over the external analysis service.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, request: AnalyzeRequest<'_>) -> Result<AnalyzerResponse, AnalyzerError>;
}

/// HTTP implementation backed by reqwest.
#[derive(Clone)]
pub struct HttpImageAnalyzer {
    url: String,
    client: reqwest::Client,
}

impl HttpImageAnalyzer {
    /// Build a client for the configured endpoint and timeout.
    pub fn new(settings: &AnalyzerSettings) -> Result<Self, AnalyzerError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            url: settings.url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ImageAnalyzer for HttpImageAnalyzer {
    async fn analyze(&self, request: AnalyzeRequest<'_>) -> Result<AnalyzerResponse, AnalyzerError> {
        // The file is opened, read and closed here, before any network I/O.
        let bytes = tokio::fs::read(request.path)
            .await
            .map_err(|source| AnalyzerError::File {
                path: request.path.display().to_string(),
                source,
            })?;

        let size = bytes.len();
        let mut part = Part::bytes(bytes).file_name(request.filename.to_string());
        if looks_like_mime(request.content_type) {
            part = part.mime_str(request.content_type)?;
        }

        let form = Form::new()
            .text("image_id", request.image_id.to_string())
            .part("file", part);

        debug!(
            image_id = request.image_id,
            url = %self.url,
            bytes = size,
            "Calling image analyzer"
        );

        let resp = self.client.post(&self.url).multipart(form).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(
                image_id = request.image_id,
                status = %status,
                "Image analyzer returned an error status"
            );
            return Err(AnalyzerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: AnalyzerResponse = serde_json::from_str(&body)?;
        Ok(response)
    }
}

/// Cheap `type/subtype` shape check before handing the value to reqwest.
fn looks_like_mime(value: &str) -> bool {
    match value.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !value.chars().any(|c| c.is_whitespace() || c.is_control())
        }
        None => false,
    }
}

/// Accept RFC 3339 timestamps and offset-less ISO 8601 timestamps (taken as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid processed_at timestamp: {}", raw))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
