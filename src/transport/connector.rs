// src/transport/connector.rs
use serde_json::Value;

use crate::error::AppError;
use crate::upload::image::UploadedImage;

/// Trait defining the interface for remote image processing
pub trait ImageProcessor: Send + Sync {
    /// Submit an image once and return the decoded JSON result
    fn submit(&self, image: &UploadedImage) -> Result<Value, AppError>;
}
