use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::session::Session;

pub const VIDEO_EXTENSION: &str = "avi";

/// Picks the next free session index in an output directory.
///
/// Holds no counter: every call rescans the directory, so state survives
/// process restarts and files created by earlier runs are never overwritten.
/// Not meant for concurrent callers; sessions are allocated one at a time.
#[derive(Debug, Clone)]
pub struct SessionFileAllocator {
    output_dir: PathBuf,
}

impl SessionFileAllocator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if absent and check it accepts new files.
    pub fn ensure_directory(&self) -> Result<(), RecorderError> {
        let dir = &self.output_dir;
        fs::create_dir_all(dir).map_err(|e| {
            RecorderError::Directory(format!("failed to create {}: {}", dir.display(), e))
        })?;
        if !dir.is_dir() {
            return Err(RecorderError::Directory(format!("{} is not a directory", dir.display())));
        }

        let probe = dir.join(format!(".write-probe-{}", uuid::Uuid::new_v4()));
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&probe)
            .map_err(|e| RecorderError::Directory(format!("{} is not writable: {}", dir.display(), e)))?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    /// Smallest index `i >= 1` whose video, depth log, and metadata files
    /// are all absent. Calling it again without creating files returns the
    /// same index.
    pub fn allocate(&self) -> Result<Session, RecorderError> {
        self.ensure_directory()?;

        let index = (1..=u32::MAX)
            .find(|&i| self.is_free(i))
            .ok_or_else(|| RecorderError::Directory("no free session index".into()))?;

        let session = Session::new(index, self.video_path(index), self.stats_path(index));
        log::debug!(
            "Allocated session {} → {}",
            index,
            session.video_path.display()
        );
        Ok(session)
    }

    pub fn is_free(&self, index: u32) -> bool {
        !self.video_path(index).exists()
            && !self.stats_path(index).exists()
            && !self.metadata_path(index).exists()
    }

    pub fn video_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("video_{}.{}", index, VIDEO_EXTENSION))
    }

    pub fn stats_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("depth_{}.json", index))
    }

    pub fn metadata_path(&self, index: u32) -> PathBuf {
        self.video_path(index).with_extension("metadata.json")
    }
}

/// Allocate against `output_dir` without keeping an allocator around.
pub fn allocate(output_dir: &Path) -> Result<Session, RecorderError> {
    SessionFileAllocator::new(output_dir).allocate()
}
