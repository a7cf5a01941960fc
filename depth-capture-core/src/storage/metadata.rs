use std::fs;
use std::path::Path;

use crate::models::error::RecorderError;
use crate::models::session::SessionMetadata;

/// Write session metadata as a JSON sidecar file.
///
/// Creates `{video_path}.metadata.json` alongside the video
/// (`video_3.avi` → `video_3.metadata.json`).
pub fn write_metadata(metadata: &SessionMetadata, video_path: &Path) -> Result<(), RecorderError> {
    let metadata_path = video_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RecorderError::Storage(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| RecorderError::Storage(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read session metadata from a JSON sidecar file.
pub fn read_metadata(video_path: &Path) -> Result<SessionMetadata, RecorderError> {
    let metadata_path = video_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| RecorderError::Storage(format!("failed to read metadata: {}", e)))?;
    let metadata: SessionMetadata = serde_json::from_str(&json)
        .map_err(|e| RecorderError::Storage(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}
