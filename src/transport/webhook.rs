// src/transport/webhook.rs
use log::{error, info, warn};
use reqwest::blocking::{multipart, Client};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

use super::connector::ImageProcessor;
use crate::config::Settings;
use crate::error::AppError;
use crate::upload::image::UploadedImage;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

// Posts images to the configured webhook, one attempt per call
pub struct WebhookClient {
    endpoint: Url,
    timeout: Duration,
    client: Client,
}

impl WebhookClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { endpoint, timeout, client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(settings.webhook_url.clone(), settings.timeout)
    }

    fn build_form(image: &UploadedImage) -> Result<multipart::Form, AppError> {
        let part = multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.content_type())
            .map_err(|e| AppError::NetworkError(format!("invalid content type: {}", e)))?;
        Ok(multipart::Form::new().part(FILE_FIELD, part))
    }
}

fn classify_request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout
    } else if e.is_connect() {
        AppError::ConnectionFailure(e.to_string())
    } else {
        AppError::NetworkError(e.to_string())
    }
}

impl ImageProcessor for WebhookClient {
    fn submit(&self, image: &UploadedImage) -> Result<Value, AppError> {
        let form = Self::build_form(image)?;
        info!(
            "Sending {} ({} bytes) to webhook (timeout {}s)",
            image.filename(),
            image.size(),
            self.timeout.as_secs()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(|e| {
                let err = classify_request_error(e);
                error!("Webhook request failed [{}]: {}", err.category(), err);
                err
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            let err = classify_request_error(e);
            error!("Failed to read webhook response [{}]: {}", err.category(), err);
            err
        })?;

        if status != StatusCode::OK {
            warn!("Webhook responded with status {}", status);
            return Err(AppError::HttpError { status: status.as_u16(), body });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("Webhook returned a non-JSON body: {}", e);
            AppError::MalformedResponse(e.to_string())
        })?;

        info!("Webhook processing complete.");
        Ok(value)
    }
}
