// src/render/export.rs
use log::info;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::AppError;

pub const EXPORT_FILE_NAME: &str = "verarbeitete_aufgaben.json";
pub const EXPORT_MIME: &str = "application/json";

/// Indented JSON (two spaces) with non-ASCII characters kept literal
pub fn export_json(value: &Value) -> String {
    // Serializing a Value cannot fail: keys are always strings
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn write_export(value: &Value, path: &Path) -> Result<(), AppError> {
    fs::write(path, export_json(value)).map_err(|e| AppError::Export(e.to_string()))?;
    info!("Result exported to: {} ({})", path.display(), EXPORT_MIME);
    Ok(())
}
