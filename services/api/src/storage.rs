//! Media storage for base64-encoded recipe images
//!
//! Clients submit images inline as base64 (optionally wrapped in a data
//! URI). Decoded bytes are written under the media root and the relative
//! path is stored on the recipe.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors from decoding or persisting an image payload
#[derive(Error, Debug)]
pub enum StorageError {
    /// The payload is not a decodable image
    #[error("{0}")]
    InvalidPayload(String),

    /// Filesystem failure while writing the decoded image
    #[error("failed to store image")]
    Io(#[from] std::io::Error),
}

/// Filesystem-backed media storage
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    /// Create a new MediaStorage rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a new MediaStorage from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_ROOT`: directory for uploaded media (default: "media")
    pub fn from_env() -> Self {
        let root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        Self::new(root)
    }

    /// Decode a base64 image payload and persist it under `recipes/`,
    /// returning the stored path relative to the media root
    pub async fn save_recipe_image(&self, payload: &str) -> Result<String, StorageError> {
        let (extension, encoded) = split_data_uri(payload)?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| StorageError::InvalidPayload(e.to_string()))?;

        if bytes.is_empty() {
            return Err(StorageError::InvalidPayload("empty image".to_string()));
        }

        let relative = format!("recipes/{}.{}", Uuid::new_v4(), extension);
        let full_path = self.root.join(&relative);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &bytes).await?;

        info!("Stored recipe image at {}", full_path.display());
        Ok(relative)
    }
}

/// Split an optional `data:image/<ext>;base64,<payload>` wrapper. A bare
/// base64 string is accepted and treated as PNG.
fn split_data_uri(payload: &str) -> Result<(&str, &str), StorageError> {
    let Some(rest) = payload.strip_prefix("data:") else {
        return Ok(("png", payload));
    };

    let (header, encoded) = rest
        .split_once(',')
        .ok_or_else(|| StorageError::InvalidPayload("malformed data URI".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| StorageError::InvalidPayload("data URI is not base64".to_string()))?;

    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => {
            return Err(StorageError::InvalidPayload(format!(
                "unsupported image type: {}",
                other
            )));
        }
    };

    Ok((extension, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_uri_png() {
        let (ext, encoded) = split_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(encoded, "aGVsbG8=");
    }

    #[test]
    fn test_split_data_uri_bare_payload() {
        let (ext, encoded) = split_data_uri("aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(encoded, "aGVsbG8=");
    }

    #[test]
    fn test_split_data_uri_rejects_unsupported_type() {
        assert!(split_data_uri("data:application/pdf;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_split_data_uri_rejects_non_base64_uri() {
        assert!(split_data_uri("data:image/png,rawbytes").is_err());
    }

    #[tokio::test]
    async fn test_save_recipe_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("tastebook-media-{}", Uuid::new_v4()));
        let storage = MediaStorage::new(&dir);

        let path = storage
            .save_recipe_image("data:image/jpeg;base64,aGVsbG8=")
            .await
            .unwrap();

        assert!(path.starts_with("recipes/"));
        assert!(path.ends_with(".jpg"));
        let bytes = tokio::fs::read(dir.join(&path)).await.unwrap();
        assert_eq!(bytes, b"hello");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_recipe_image_rejects_garbage() {
        let storage = MediaStorage::new(std::env::temp_dir());
        let result = storage.save_recipe_image("not base64 at all!!!").await;
        assert!(matches!(result, Err(StorageError::InvalidPayload(_))));
    }
}
