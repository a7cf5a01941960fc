use std::fs;
use std::path::Path;

use crate::models::error::RecorderError;
use crate::models::frame::DepthExtent;

/// Write the per-frame depth extents as a JSON array of `[min, max]` pairs,
/// in encoding order.
pub fn write_depth_log(extents: &[DepthExtent], path: &Path) -> Result<(), RecorderError> {
    let json = serde_json::to_string(extents)
        .map_err(|e| RecorderError::Storage(format!("failed to serialize depth log: {}", e)))?;
    fs::write(path, json).map_err(|e| RecorderError::Storage(format!("failed to write depth log: {}", e)))?;
    Ok(())
}

/// Read a depth log written by [`write_depth_log`].
pub fn read_depth_log(path: &Path) -> Result<Vec<DepthExtent>, RecorderError> {
    let json = fs::read_to_string(path)
        .map_err(|e| RecorderError::Storage(format!("failed to read depth log: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| RecorderError::Storage(format!("failed to parse depth log: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_ordered_pairs() {
        let path = std::env::temp_dir().join(format!("depth_capture_test_{}_depth.json", uuid::Uuid::new_v4()));
        let extents = vec![
            DepthExtent { min: 0, max: 1200 },
            DepthExtent { min: 310, max: 4000 },
            DepthExtent { min: 1000, max: 1000 },
        ];
        write_depth_log(&extents, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[[0,1200],[310,4000],[1000,1000]]");
        assert_eq!(read_depth_log(&path).unwrap(), extents);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_log_is_empty_array() {
        let path = std::env::temp_dir().join(format!("depth_capture_test_{}_empty.json", uuid::Uuid::new_v4()));
        write_depth_log(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        fs::remove_file(&path).ok();
    }
}
