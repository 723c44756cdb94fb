use thiserror::Error;

/// Errors that can occur anywhere in the audio I/O core.
///
/// Device failures are never retried: the operation that hit one is
/// abandoned and the error is handed back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("device error during {operation}: {code}")]
    Device { operation: String, code: String },

    #[error("device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid note: {0}")]
    InvalidNote(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported waveform: {0}")]
    UnsupportedWaveform(String),

    #[error("wav error: {0}")]
    Wav(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl AudioError {
    /// Shorthand for a failed device call.
    pub fn device(operation: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Device {
            operation: operation.into(),
            code: code.into(),
        }
    }
}

impl From<std::io::Error> for AudioError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
