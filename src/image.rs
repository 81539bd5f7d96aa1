// src/image.rs
//! Photos, logos and banners sent as multipart uploads

use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::error;

use crate::error::ApiError;

pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageErrorType {
    FileNotFound,
    CorruptedFile,
    WrongFormat,
    EmptyFile,
    TooLarge,
}

impl ImageErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound => "IMAGE_NOT_FOUND",
            Self::CorruptedFile => "IMAGE_CORRUPTED",
            Self::WrongFormat => "IMAGE_WRONG_FORMAT",
            Self::EmptyFile => "IMAGE_EMPTY",
            Self::TooLarge => "IMAGE_TOO_LARGE",
        }
    }

    fn error(self, message: impl Into<String>) -> ApiError {
        ApiError::InvalidMedia {
            code: self.code(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl SelectedImage {
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let metadata = fs::metadata(path).await.map_err(|_| {
            ImageErrorType::FileNotFound
                .error(format!("Cannot read image file: {}", path.display()))
        })?;

        if metadata.len() == 0 {
            return Err(ImageErrorType::EmptyFile.error("Image file is empty"));
        }
        if metadata.len() > MAX_IMAGE_BYTES {
            return Err(ImageErrorType::TooLarge.error(format!(
                "Image file too large: {:.1}MB (max 10MB)",
                metadata.len() as f64 / 1024.0 / 1024.0
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let bytes = fs::read(path).await?;
        Self::from_bytes(&file_name, Bytes::from(bytes))
    }

    pub fn from_bytes(file_name: &str, bytes: Bytes) -> Result<Self, ApiError> {
        if bytes.is_empty() {
            return Err(ImageErrorType::EmptyFile.error("Image file is empty"));
        }
        if bytes.len() < 8 {
            return Err(ImageErrorType::CorruptedFile.error("Image file too small or corrupted"));
        }

        let lower = file_name.to_lowercase();
        let content_type = if lower.ends_with(".png") {
            check_signature(&bytes, PNG_SIGNATURE, "PNG", file_name)?;
            "image/png"
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            check_signature(&bytes, JPEG_SIGNATURE, "JPEG", file_name)?;
            "image/jpeg"
        } else {
            return Err(ImageErrorType::WrongFormat.error("Unsupported image format, use PNG or JPEG"));
        };

        Ok(Self {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        })
    }
}

fn check_signature(
    bytes: &[u8],
    expected: &[u8],
    format: &str,
    file_name: &str,
) -> Result<(), ApiError> {
    if bytes.starts_with(expected) {
        return Ok(());
    }

    error!("Image signature mismatch for {}", file_name);
    if format == "PNG" && bytes.starts_with(JPEG_SIGNATURE) {
        return Err(ImageErrorType::WrongFormat.error("File is JPEG but has .png extension"));
    }
    if format == "JPEG" && bytes.starts_with(PNG_SIGNATURE) {
        return Err(ImageErrorType::WrongFormat.error("File is PNG but has .jpg/.jpeg extension"));
    }
    Err(ImageErrorType::CorruptedFile.error(format!(
        "Invalid {} file - corrupted or wrong format",
        format
    )))
}
