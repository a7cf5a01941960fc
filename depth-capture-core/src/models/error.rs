use thiserror::Error;

/// Errors raised by the capture, encoding, and session layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// Camera disconnected or stream terminated. Fatal to the session only.
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    /// Output directory missing, not a directory, or read-only.
    #[error("output directory unusable: {0}")]
    Directory(String),

    /// Video sink could not be opened or written.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Sidecar (depth log, metadata) could not be written or read.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("session cancelled")]
    Cancelled,
}
