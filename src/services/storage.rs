//! Local filesystem storage for uploaded vehicle images.
//!
//! Files live under `<root>/<vehicle_id>/<uuid>.<ext>`. The client-supplied
//! filename is kept only as metadata and never used to build the path.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Image storage rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    /// Create the storage, making sure the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("Image storage initialized: root={}", root.display());

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the file extension for an image content type.
    pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/bmp" => Some("bmp"),
            "image/tiff" => Some("tiff"),
            "image/heic" => Some("heic"),
            "image/svg+xml" => Some("svg"),
            _ => None,
        }
    }

    /// Pick the stored extension: the filename's own if it is a plain
    /// alphanumeric extension, otherwise one derived from the content type.
    pub fn extension_for(filename: &str, content_type: &str) -> String {
        let from_name = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_lowercase());

        from_name
            .or_else(|| Self::extension_for_content_type(content_type).map(String::from))
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Reduce a client-supplied filename to its final path component.
    pub fn sanitize_filename(filename: &str) -> String {
        let name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if name.is_empty() || name == "." || name == ".." {
            "upload".to_string()
        } else {
            name.to_string()
        }
    }

    /// Write an image for `vehicle_id` and return the stored path.
    pub async fn put(
        &self,
        vehicle_id: i32,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<PathBuf> {
        let dir = self.root.join(vehicle_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let extension = Self::extension_for(filename, content_type);
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension));

        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(path)
    }

    /// Best-effort removal of a stored file, used to undo a failed upload.
    pub async fn remove(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Failed to remove stored image {}: {}", path.display(), e);
        }
    }
}
