/// Session recorder state machine.
///
/// ```text
/// idle → pre-roll delay → recording → finalizing → idle
/// ```
///
/// A session aborted by an acquisition failure or a cancel still passes
/// through `Finalizing` so the video and depth log are closed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    PreRollDelay,
    Recording { frame_count: u64 },
    Finalizing,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Frames written so far, if a recording is in progress.
    pub fn frame_count(&self) -> Option<u64> {
        match self {
            Self::Recording { frame_count } => Some(*frame_count),
            _ => None,
        }
    }
}
