use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use super::frame::{DepthExtent, SessionDiagnostics};
use crate::processing::palette::Palette;

/// One allocated recording slot: an index and the files derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub index: u32,
    pub video_path: PathBuf,
    pub stats_path: PathBuf,
    pub frame_count: u64,
    pub extents: Vec<DepthExtent>,
}

impl Session {
    pub fn new(index: u32, video_path: PathBuf, stats_path: PathBuf) -> Self {
        Self {
            index,
            video_path,
            stats_path,
            frame_count: 0,
            extents: Vec::new(),
        }
    }

    /// Record one encoded frame. Keeps `extents.len() == frame_count`.
    pub fn push_frame(&mut self, extent: DepthExtent) {
        self.extents.push(extent);
        self.frame_count += 1;
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Ran for the full configured length.
    Completed,
    /// Stopped early by an upstream or encoder failure. Files are still
    /// finalized and hold every frame captured before the failure.
    Aborted(RecorderError),
    /// Stopped early through a [`CancelHandle`](crate::session::recorder::CancelHandle).
    Cancelled,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted(_) => "aborted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Returned by every session that got as far as opening its video file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub index: u32,
    pub video_path: PathBuf,
    pub stats_path: PathBuf,
    pub frame_count: u64,
    /// Time spent in the recording loop.
    pub duration: Duration,
    pub frame_width: u32,
    pub frame_height: u32,
    /// SHA-256 of the finalized video, empty if finalizing failed.
    pub checksum: String,
    pub outcome: SessionOutcome,
    pub diagnostics: SessionDiagnostics,
}

/// Sidecar written as `video_<i>.metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: String,
    pub created_at: String,
    pub index: u32,
    pub video_path: String,
    pub stats_path: String,
    pub frame_count: u64,
    pub duration_secs: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_rate: u32,
    pub checksum: String,
    pub palette: Palette,
    pub depth_scale: f32,
    pub outcome: String,
}

impl SessionMetadata {
    pub fn from_report(report: &SessionReport, frame_rate: u32, palette: Palette, depth_scale: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            index: report.index,
            video_path: report.video_path.to_string_lossy().into_owned(),
            stats_path: report.stats_path.to_string_lossy().into_owned(),
            frame_count: report.frame_count,
            duration_secs: report.duration.as_secs_f64(),
            frame_width: report.frame_width,
            frame_height: report.frame_height,
            frame_rate,
            checksum: report.checksum.clone(),
            palette,
            depth_scale,
            outcome: report.outcome.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_frame_keeps_count_and_extents_aligned() {
        let mut session = Session::new(1, "v.avi".into(), "d.json".into());
        session.push_frame(DepthExtent { min: 1, max: 2 });
        session.push_frame(DepthExtent { min: 3, max: 4 });
        assert_eq!(session.frame_count, 2);
        assert_eq!(session.extents.len(), 2);
        assert_eq!(session.extents[1], DepthExtent { min: 3, max: 4 });
    }

    #[test]
    fn metadata_carries_report_fields() {
        let report = SessionReport {
            index: 4,
            video_path: "out/video_4.avi".into(),
            stats_path: "out/depth_4.json".into(),
            frame_count: 12,
            duration: Duration::from_millis(400),
            frame_width: 848,
            frame_height: 240,
            checksum: "abc".into(),
            outcome: SessionOutcome::Aborted(RecorderError::Acquisition("gone".into())),
            diagnostics: SessionDiagnostics::default(),
        };
        let meta = SessionMetadata::from_report(&report, 30, Palette::Jet, 0.03);
        assert_eq!(meta.index, 4);
        assert_eq!(meta.frame_count, 12);
        assert_eq!(meta.outcome, "aborted");
        assert!((meta.duration_secs - 0.4).abs() < 1e-9);
        assert!(!meta.id.is_empty());
    }
}
