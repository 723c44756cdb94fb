use serde::{Deserialize, Serialize};

use super::format::SampleFormat;

/// Summary of one listen session, exported as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub id: String,
    pub created_at: String,
    pub format: SampleFormat,
    pub sample_rate: u32,
    pub frames_captured: u64,
    pub bytes_written: u64,
    pub duration_secs: f64,
    /// SHA-256 hex digest of every byte written to the output stream.
    pub checksum: String,
}

impl CaptureSummary {
    pub fn new(
        format: SampleFormat,
        sample_rate: u32,
        frames_captured: u64,
        bytes_written: u64,
        checksum: &str,
    ) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            frames_captured as f64 / f64::from(sample_rate)
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            format,
            sample_rate,
            frames_captured,
            bytes_written,
            duration_secs,
            checksum: checksum.to_string(),
        }
    }
}
