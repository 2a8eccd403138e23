// src/config.rs
use log::info;
use reqwest::Url;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PREVIEW_CHARS: usize = 30;

/// Runtime settings resolved from CLI flags and the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub webhook_url: Url,
    pub debug_mode: bool,
    pub timeout: Duration,
}

impl Settings {
    pub fn load(
        raw_url: Option<String>,
        debug_mode: bool,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let raw_url = raw_url.unwrap_or_default();
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return Err(AppError::ConfigurationMissing(
                "WEBHOOK_URL is not configured. Set it with --webhook-url or the WEBHOOK_URL environment variable.".to_string(),
            ));
        }

        let webhook_url = Url::parse(raw_url).map_err(|e| {
            AppError::ConfigurationMissing(format!("invalid WEBHOOK_URL '{}': {}", raw_url, e))
        })?;
        if !matches!(webhook_url.scheme(), "http" | "https") {
            return Err(AppError::ConfigurationMissing(format!(
                "WEBHOOK_URL must use http or https, got '{}'",
                webhook_url.scheme()
            )));
        }

        if timeout_secs == 0 {
            return Err(AppError::ConfigurationMissing(
                "timeout must be at least one second".to_string(),
            ));
        }

        let settings = Self {
            webhook_url,
            debug_mode,
            timeout: Duration::from_secs(timeout_secs),
        };
        info!(
            "Configuration loaded: endpoint={}, timeout={}s, debug={}",
            settings.endpoint_preview(),
            timeout_secs,
            debug_mode
        );
        Ok(settings)
    }

    /// Truncated endpoint, safe to show in the diagnostic panel
    pub fn endpoint_preview(&self) -> String {
        let url = self.webhook_url.as_str();
        if url.chars().count() > PREVIEW_CHARS {
            let prefix: String = url.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", prefix)
        } else {
            url.to_string()
        }
    }
}
