use std::fs;
use std::path::Path;

use crate::models::capture_summary::CaptureSummary;
use crate::models::error::AudioError;

/// Write a capture summary as pretty-printed JSON at `path`.
pub fn write_summary(summary: &CaptureSummary, path: &Path) -> Result<(), AudioError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AudioError::Storage(format!("failed to create directory: {}", e)))?;
    }
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| AudioError::Storage(format!("failed to serialize summary: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| AudioError::Storage(format!("failed to write summary: {}", e)))?;
    Ok(())
}

/// Read a capture summary written by [`write_summary`].
pub fn read_summary(path: &Path) -> Result<CaptureSummary, AudioError> {
    let json = fs::read_to_string(path)
        .map_err(|e| AudioError::Storage(format!("failed to read summary: {}", e)))?;
    let summary: CaptureSummary = serde_json::from_str(&json)
        .map_err(|e| AudioError::Storage(format!("failed to parse summary: {}", e)))?;
    Ok(summary)
}
