// src/pitch/media.rs
//! Picking a local video file for an elevator pitch

use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error};

use crate::error::ApiError;

pub const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

const EBML_MAGIC: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];

/// A video chosen on this machine but not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct SelectedVideo {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl SelectedVideo {
    /// Read and check a video from disk.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let metadata = fs::metadata(path).await.map_err(|_| ApiError::InvalidMedia {
            code: "VIDEO_NOT_FOUND",
            message: format!("Cannot read video file: {}", path.display()),
        })?;

        if metadata.len() == 0 {
            return Err(ApiError::InvalidMedia {
                code: "VIDEO_EMPTY",
                message: "Video file is empty".to_string(),
            });
        }

        if metadata.len() > MAX_VIDEO_BYTES {
            return Err(ApiError::InvalidMedia {
                code: "VIDEO_TOO_LARGE",
                message: format!(
                    "Video file too large: {:.1}MB (max {}MB)",
                    metadata.len() as f64 / 1024.0 / 1024.0,
                    MAX_VIDEO_BYTES / 1024 / 1024
                ),
            });
        }

        let bytes = fs::read(path).await?;
        let video = Self::from_bytes(&file_name, Bytes::from(bytes))?;
        debug!(
            "Selected video {} ({} bytes, {})",
            video.file_name,
            video.size(),
            video.content_type
        );
        Ok(video)
    }

    /// Check an in-memory video, e.g. one received from a drop target.
    pub fn from_bytes(file_name: &str, bytes: Bytes) -> Result<Self, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidMedia {
                code: "VIDEO_EMPTY",
                message: "Video file is empty".to_string(),
            });
        }
        if bytes.len() as u64 > MAX_VIDEO_BYTES {
            return Err(ApiError::InvalidMedia {
                code: "VIDEO_TOO_LARGE",
                message: format!("Video file too large: {} bytes", bytes.len()),
            });
        }

        let content_type = content_type_for(file_name)?;
        validate_signature(file_name, content_type, &bytes)?;

        Ok(Self {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn content_type_for(file_name: &str) -> Result<&'static str, ApiError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => Ok("video/mp4"),
        Some("mov") => Ok("video/quicktime"),
        Some("webm") => Ok("video/webm"),
        Some("mkv") => Ok("video/x-matroska"),
        _ => Err(ApiError::InvalidMedia {
            code: "VIDEO_WRONG_FORMAT",
            message: format!(
                "Unsupported video format: {}. Use mp4, mov, webm or mkv",
                file_name
            ),
        }),
    }
}

fn validate_signature(file_name: &str, content_type: &str, bytes: &[u8]) -> Result<(), ApiError> {
    let is_iso_media = bytes.len() >= 8 && &bytes[4..8] == b"ftyp";
    let is_ebml = bytes.starts_with(EBML_MAGIC);

    let matches = match content_type {
        "video/mp4" | "video/quicktime" => is_iso_media,
        "video/webm" | "video/x-matroska" => is_ebml,
        _ => false,
    };

    if matches {
        return Ok(());
    }

    error!("Video signature mismatch for {}", file_name);
    let message = if is_ebml {
        "File is WebM/Matroska but has a different extension".to_string()
    } else if is_iso_media {
        "File is MP4/QuickTime but has a different extension".to_string()
    } else {
        "Invalid video file - corrupted or wrong format".to_string()
    };

    Err(ApiError::InvalidMedia {
        code: "VIDEO_CORRUPTED",
        message,
    })
}
