//! Storage for uploaded video creatives.
//!
//! Files are written under the configured upload directory with a
//! generated name (`<uuid>-<sha256 prefix>.<ext>`) and served back by the
//! router under `/media/`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;

/// URL path prefix under which stored creatives are served.
pub const MEDIA_ROUTE: &str = "/media";

/// Video container extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["mp4", "webm", "mov", "m4v"];

/// A creative written to disk.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredCreative {
    /// File name inside the upload directory; persisted as the ad's `file_ref`.
    pub file_ref: String,
    /// Hex SHA-256 of the content.
    pub sha256: String,
    pub size_bytes: usize,
}

impl StoredCreative {
    /// Public URL of the creative given the server's base URL.
    pub fn public_url(&self, public_base_url: &str) -> String {
        format!(
            "{}{MEDIA_ROUTE}/{}",
            public_base_url.trim_end_matches('/'),
            self.file_ref
        )
    }
}

/// Lowercased extension of `file_name` if it is an accepted video type.
pub fn video_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Validate and write an uploaded creative.
pub async fn store(
    upload_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<StoredCreative, AppError> {
    let ext = video_extension(original_name).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported file '{original_name}'. Supported: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let sha256 = hex::encode(Sha256::digest(data));
    let file_ref = format!("{}-{}.{ext}", Uuid::now_v7(), &sha256[..12]);

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(upload_dir.join(&file_ref), data).await?;

    tracing::info!(
        file_ref = %file_ref,
        original_name = %original_name,
        size_bytes = data.len(),
        "Creative stored"
    );

    Ok(StoredCreative {
        file_ref,
        sha256,
        size_bytes: data.len(),
    })
}

/// Remove a stored creative. A missing file is not an error.
pub async fn remove(upload_dir: &Path, file_ref: &str) -> Result<(), AppError> {
    let path = resolve(upload_dir, file_ref)?;
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(file_ref = %file_ref, "Creative already missing on disk");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Join a stored file name onto the upload directory, refusing anything
/// that could escape it.
fn resolve(upload_dir: &Path, file_ref: &str) -> Result<PathBuf, AppError> {
    let name = Path::new(file_ref);
    let is_plain = name.components().count() == 1
        && name.file_name().map(|n| n == name.as_os_str()).unwrap_or(false);
    if !is_plain {
        return Err(AppError::Internal(format!("Invalid creative reference '{file_ref}'")));
    }
    Ok(upload_dir.join(name))
}
