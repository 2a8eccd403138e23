// src/upload/image.rs
use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::error::AppError;

/// File extensions accepted at the upload boundary
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// An image picked by the user, held until reset or replaced
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Decoded pixels for on-screen preview
#[derive(Debug)]
pub struct ImagePreview {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: &str, content_type: &str, bytes: Vec<u8>) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::ImageDecodeFailure(format!("'{}' is empty", filename)));
        }
        Ok(Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// Load an image from disk, deriving the MIME type from its extension
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::ImageDecodeFailure(format!("'{}' is not a file", path.display())))?;
        let content_type = content_type_for(path)?;

        let bytes = fs::read(path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            AppError::ImageDecodeFailure(e.to_string())
        })?;

        let image = Self::new(&filename, content_type, bytes)?;
        info!("Selected image {} ({}, {} bytes)", image.filename, image.content_type, image.size());
        Ok(image)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    pub fn decode(&self) -> Result<ImagePreview, AppError> {
        let decoded = ::image::load_from_memory(&self.bytes).map_err(|e| {
            warn!("Failed to decode {}: {}", self.filename, e);
            AppError::ImageDecodeFailure(e.to_string())
        })?;
        Ok(ImagePreview {
            width: decoded.width(),
            height: decoded.height(),
            rgba: decoded.to_rgba8().into_raw(),
        })
    }

    /// Caption lines shown under the preview
    pub fn captions(&self, dimensions: Option<(u32, u32)>) -> Vec<String> {
        let mut lines = vec![format!("File name: {}", self.filename)];
        if let Some((width, height)) = dimensions {
            lines.push(format!("Image size: {} x {} px", width, height));
        }
        lines.push(format!("File size: {:.2} KB", self.size_kb()));
        lines
    }
}

// Keeps the raw bytes out of `{:?}` output (diagnostic panel)
impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(path: &Path) -> Result<&'static str, AppError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        _ => Err(AppError::UnsupportedFormat(ext)),
    }
}
