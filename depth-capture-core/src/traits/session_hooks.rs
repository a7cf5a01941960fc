use crate::models::error::RecorderError;
use crate::models::session::SessionReport;
use crate::models::state::RecorderState;

/// Observer for session progress.
///
/// The trigger front-end implements this to play start/stop cues or update
/// a display. Every method has a no-op default. Calls arrive on the thread
/// running [`SessionRecorder::run`](crate::session::recorder::SessionRecorder::run),
/// so implementations must return quickly.
pub trait SessionHooks: Send + Sync {
    /// Called on every state transition.
    fn on_state_changed(&self, _state: &RecorderState) {}

    /// Called once the pre-roll delay has elapsed, right before the first frame.
    fn on_recording_started(&self) {}

    /// Called once the recording loop has exited, before finalizing.
    fn on_recording_stopped(&self) {}

    /// Called when a session ends early because of a failure.
    fn on_error(&self, _error: &RecorderError) {}

    /// Called after the video and depth log are finalized.
    fn on_session_finished(&self, _report: &SessionReport) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SessionHooks for NoHooks {}
