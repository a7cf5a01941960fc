use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::session::{Session, SessionMetadata, SessionOutcome, SessionReport};
use crate::models::state::RecorderState;
use crate::processing::compositor::FrameCompositor;
use crate::processing::depth_stats::DepthStatsCollector;
use crate::processing::frame_source::FrameSource;
use crate::storage::allocator::SessionFileAllocator;
use crate::storage::depth_log;
use crate::storage::metadata;
use crate::storage::video_writer::VideoEncoder;
use crate::traits::camera_stream::CameraStream;
use crate::traits::session_hooks::SessionHooks;

/// Cooperative stop request for the session in progress.
///
/// Checked once per iteration of the recording loop; a session blocked in
/// the camera stream stops after the next pair arrives.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Read-only view of the recorder state, usable from another thread.
#[derive(Debug, Clone)]
pub struct StatusHandle(Arc<Mutex<RecorderState>>);

impl StatusHandle {
    pub fn state(&self) -> RecorderState {
        *self.0.lock()
    }
}

/// Runs one recording session per [`run`](Self::run) call.
///
/// ```text
/// [CameraStream] → [FrameSource] ─┬→ [FrameCompositor] → [VideoEncoder]  → video_<i>.avi
///                                 └→ [DepthStatsCollector] → extents     → depth_<i>.json
/// ```
///
/// Sessions never overlap: `run` takes `&mut self` and returns only after the
/// session's files are finalized. The camera stream is owned for the
/// recorder's whole lifetime and shared by every session.
pub struct SessionRecorder<C: CameraStream> {
    source: FrameSource<C>,
    compositor: FrameCompositor,
    stats: DepthStatsCollector,
    allocator: SessionFileAllocator,
    config: RecorderConfiguration,
    state: Arc<Mutex<RecorderState>>,
    hooks: Option<Arc<dyn SessionHooks>>,
    cancel: CancelHandle,
}

impl<C: CameraStream> SessionRecorder<C> {
    /// Validate `config` and make sure the output directory is usable.
    ///
    /// A [`RecorderError::Directory`] here means no session can ever be
    /// allocated; callers should treat it as fatal.
    pub fn new(stream: C, config: RecorderConfiguration) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::Configuration)?;

        let allocator = SessionFileAllocator::new(config.output_directory.clone());
        allocator.ensure_directory()?;

        let (width, height) = stream.resolution();
        if width == 0 || height == 0 {
            return Err(RecorderError::Configuration(format!(
                "camera stream reports resolution {}x{}",
                width, height
            )));
        }
        if stream.nominal_frame_rate() != config.frame_rate {
            log::warn!(
                "Camera delivers {} fps nominal, container will be stamped {} fps",
                stream.nominal_frame_rate(),
                config.frame_rate
            );
        }

        Ok(Self {
            source: FrameSource::new(stream),
            compositor: FrameCompositor::from_config(&config),
            stats: DepthStatsCollector::new(),
            allocator,
            config,
            state: Arc::new(Mutex::new(RecorderState::Idle)),
            hooks: None,
            cancel: CancelHandle::default(),
        })
    }

    pub fn set_hooks(&mut self, hooks: Arc<dyn SessionHooks>) {
        self.hooks = Some(hooks);
    }

    pub fn state(&self) -> RecorderState {
        *self.state.lock()
    }

    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle(Arc::clone(&self.state))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    pub fn allocator(&self) -> &SessionFileAllocator {
        &self.allocator
    }

    /// Composite frame size every session of this recorder encodes at.
    pub fn frame_dimensions(&self) -> (u32, u32) {
        let res = self.source.resolution();
        FrameCompositor::output_dimensions(res, res)
    }

    /// Give the camera stream back, e.g. to shut the connection down.
    pub fn into_stream(self) -> C {
        self.source.into_inner()
    }

    /// Entry point for an external trigger.
    pub fn start_session(&mut self) -> Result<SessionReport, RecorderError> {
        self.run()
    }

    /// Pre-roll, record for the configured length, finalize.
    ///
    /// `Err` means nothing was written: the session could not be allocated
    /// or its video could not be opened. Once the video is open, every exit
    /// path finalizes it and writes the depth log; failures after that point
    /// are reported through [`SessionReport::outcome`].
    pub fn run(&mut self) -> Result<SessionReport, RecorderError> {
        self.cancel.reset();

        self.set_state(RecorderState::PreRollDelay);
        if !self.config.pre_roll.is_zero() {
            log::info!("Waiting {:.1} seconds...", self.config.pre_roll.as_secs_f64());
            thread::sleep(self.config.pre_roll);
        }

        let (mut session, mut encoder) = match self.open_session() {
            Ok(opened) => opened,
            Err(e) => {
                log::error!("Could not start session: {}", e);
                self.notify_error(&e);
                self.set_state(RecorderState::Idle);
                return Err(e);
            }
        };

        if let Some(ref hooks) = self.hooks {
            hooks.on_recording_started();
        }
        self.source.take_diagnostics();
        self.set_state(RecorderState::Recording { frame_count: 0 });

        let (outcome, duration) = self.record(&mut session, &mut encoder);

        if let Some(ref hooks) = self.hooks {
            hooks.on_recording_stopped();
        }
        self.set_state(RecorderState::Finalizing);

        let report = self.finalize(session, encoder, outcome, duration);

        if let SessionOutcome::Aborted(ref e) = report.outcome {
            log::warn!(
                "Session {} aborted after {} frames: {}",
                report.index,
                report.frame_count,
                e
            );
            self.notify_error(e);
        }
        log::info!(
            "Output to {} ({} frames)",
            report.video_path.display(),
            report.frame_count
        );
        if let Some(ref hooks) = self.hooks {
            hooks.on_session_finished(&report);
        }

        self.set_state(RecorderState::Idle);
        Ok(report)
    }

    // --- Internal helpers ---

    fn open_session(&self) -> Result<(Session, VideoEncoder), RecorderError> {
        let session = self.allocator.allocate()?;
        let (width, height) = self.frame_dimensions();
        let encoder = VideoEncoder::open(
            &session.video_path,
            width,
            height,
            self.config.frame_rate,
            self.config.jpeg_quality,
        )?;
        log::info!("Recording session {} to {}", session.index, session.video_path.display());
        Ok((session, encoder))
    }

    /// Acquire → composite → encode until the session length elapses or
    /// something stops it. Frames and extents are only counted once the
    /// encoder has accepted the frame.
    fn record(&mut self, session: &mut Session, encoder: &mut VideoEncoder) -> (SessionOutcome, Duration) {
        let started = Instant::now();

        let outcome = loop {
            if started.elapsed() >= self.config.session_length {
                break SessionOutcome::Completed;
            }
            if self.cancel.is_cancelled() {
                break SessionOutcome::Cancelled;
            }

            let pair = match self.source.next() {
                Ok(pair) => pair,
                Err(e) => break SessionOutcome::Aborted(e),
            };

            let frame = self.compositor.composite(&pair);
            let extent = self.stats.extent(&pair);
            if let Err(e) = encoder.append(&frame) {
                break SessionOutcome::Aborted(e);
            }
            session.push_frame(extent);

            // Progress only; no hook per frame.
            *self.state.lock() = RecorderState::Recording {
                frame_count: session.frame_count,
            };
        };

        (outcome, started.elapsed())
    }

    fn finalize(
        &mut self,
        session: Session,
        mut encoder: VideoEncoder,
        mut outcome: SessionOutcome,
        duration: Duration,
    ) -> SessionReport {
        let (frame_width, frame_height) = encoder.dimensions();
        let bytes_written = encoder.bytes_written();

        let checksum = match encoder.close() {
            Ok(checksum) => checksum,
            Err(e) => {
                log::error!("Failed to finalize {}: {}", session.video_path.display(), e);
                demote(&mut outcome, e);
                String::new()
            }
        };

        if let Err(e) = depth_log::write_depth_log(&session.extents, &session.stats_path) {
            log::error!("Failed to write {}: {}", session.stats_path.display(), e);
            demote(&mut outcome, e);
        }

        let mut diagnostics = self.source.take_diagnostics();
        diagnostics.bytes_written = bytes_written;

        let report = SessionReport {
            index: session.index,
            video_path: session.video_path,
            stats_path: session.stats_path,
            frame_count: session.frame_count,
            duration,
            frame_width,
            frame_height,
            checksum,
            outcome,
            diagnostics,
        };

        if self.config.write_metadata {
            let meta = SessionMetadata::from_report(
                &report,
                self.config.frame_rate,
                self.compositor.palette(),
                self.compositor.depth_scale(),
            );
            if let Err(e) = metadata::write_metadata(&meta, &report.video_path) {
                log::error!("Failed to write metadata for session {}: {}", report.index, e);
            }
        }

        report
    }

    fn set_state(&self, new_state: RecorderState) {
        *self.state.lock() = new_state;
        if let Some(ref hooks) = self.hooks {
            hooks.on_state_changed(&new_state);
        }
    }

    fn notify_error(&self, error: &RecorderError) {
        if let Some(ref hooks) = self.hooks {
            hooks.on_error(error);
        }
    }
}

/// A finalize failure turns an otherwise clean session into an aborted one;
/// an earlier abort reason is kept.
fn demote(outcome: &mut SessionOutcome, error: RecorderError) {
    if !matches!(outcome, SessionOutcome::Aborted(_)) {
        *outcome = SessionOutcome::Aborted(error);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::models::frame::{ColorImage, DepthExtent, DepthImage, PixelOrder};
    use crate::storage::avi_reader::AviSummary;
    use crate::traits::camera_stream::SensorDelivery;

    const RES: (u32, u32) = (8, 6);

    /// Delivers full pairs with depth `1000 + tick`, failing after `limit` ticks.
    struct TestCamera {
        tick: u16,
        limit: Option<u16>,
    }

    impl TestCamera {
        fn unlimited() -> Self {
            Self { tick: 0, limit: None }
        }

        fn failing_after(limit: u16) -> Self {
            Self {
                tick: 0,
                limit: Some(limit),
            }
        }
    }

    impl CameraStream for TestCamera {
        fn poll(&mut self) -> Result<SensorDelivery, RecorderError> {
            if self.limit.is_some_and(|limit| self.tick >= limit) {
                return Err(RecorderError::Acquisition("device disconnected".into()));
            }
            self.tick += 1;
            thread::sleep(Duration::from_millis(2));
            Ok(SensorDelivery {
                color: Some(ColorImage::filled(RES.0, RES.1, PixelOrder::Rgb, [10, 20, 30])),
                depth: Some(DepthImage::filled(RES.0, RES.1, 1000 + self.tick)),
                timestamp_ms: self.tick as i64 * 33,
            })
        }

        fn nominal_frame_rate(&self) -> u32 {
            30
        }

        fn resolution(&self) -> (u32, u32) {
            RES
        }
    }

    /// Switches to a 4x4 stream after `resize_after` ticks, behind the
    /// encoder's back.
    struct ResizingCamera {
        tick: u16,
        resize_after: u16,
    }

    impl ResizingCamera {
        fn current(&self) -> (u32, u32) {
            if self.tick > self.resize_after {
                (4, 4)
            } else {
                RES
            }
        }
    }

    impl CameraStream for ResizingCamera {
        fn poll(&mut self) -> Result<SensorDelivery, RecorderError> {
            self.tick += 1;
            let (w, h) = self.current();
            Ok(SensorDelivery {
                color: Some(ColorImage::filled(w, h, PixelOrder::Bgr, [30, 20, 10])),
                depth: Some(DepthImage::filled(w, h, 500 * self.tick)),
                timestamp_ms: self.tick as i64 * 33,
            })
        }

        fn nominal_frame_rate(&self) -> u32 {
            30
        }

        fn resolution(&self) -> (u32, u32) {
            self.current()
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
        cancel_on_start: Mutex<Option<CancelHandle>>,
    }

    impl SessionHooks for RecordingHooks {
        fn on_state_changed(&self, state: &RecorderState) {
            self.events.lock().push(format!("{:?}", state));
        }

        fn on_recording_started(&self) {
            self.events.lock().push("start-cue".into());
            if let Some(ref cancel) = *self.cancel_on_start.lock() {
                cancel.cancel();
            }
        }

        fn on_recording_stopped(&self) {
            self.events.lock().push("stop-cue".into());
        }

        fn on_error(&self, _error: &RecorderError) {
            self.events.lock().push("error".into());
        }

        fn on_session_finished(&self, report: &SessionReport) {
            self.events.lock().push(format!("finished:{}", report.frame_count));
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("depth_capture_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    fn config(dir: &PathBuf, session_length: Duration) -> RecorderConfiguration {
        RecorderConfiguration {
            output_directory: dir.clone(),
            pre_roll: Duration::ZERO,
            session_length,
            ..Default::default()
        }
    }

    #[test]
    fn failure_after_three_pairs_keeps_files_consistent() {
        let dir = temp_dir("rec_fail");
        let mut recorder =
            SessionRecorder::new(TestCamera::failing_after(3), config(&dir, Duration::from_secs(10))).unwrap();

        let report = recorder.run().unwrap();
        assert_eq!(report.frame_count, 3);
        assert!(matches!(report.outcome, SessionOutcome::Aborted(RecorderError::Acquisition(_))));
        assert_eq!((report.frame_width, report.frame_height), (16, 6));

        let extents = depth_log::read_depth_log(&report.stats_path).unwrap();
        assert_eq!(
            extents,
            vec![
                DepthExtent { min: 1001, max: 1001 },
                DepthExtent { min: 1002, max: 1002 },
                DepthExtent { min: 1003, max: 1003 },
            ]
        );

        let summary = AviSummary::read(&report.video_path).unwrap();
        assert_eq!(summary.total_frames, 3);
        assert_eq!(summary.frame_chunks, 3);
        assert!(recorder.state().is_idle());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn encoder_rejection_aborts_and_finalizes() {
        let dir = temp_dir("rec_encode");
        let camera = ResizingCamera {
            tick: 0,
            resize_after: 2,
        };
        let mut recorder = SessionRecorder::new(camera, config(&dir, Duration::from_secs(10))).unwrap();

        let report = recorder.run().unwrap();
        assert!(matches!(report.outcome, SessionOutcome::Aborted(RecorderError::Encoding(_))));
        assert_eq!(report.frame_count, 2);
        assert_eq!(report.diagnostics.pairs_accepted, 3);
        assert_eq!(report.checksum.len(), 64);

        let extents = depth_log::read_depth_log(&report.stats_path).unwrap();
        assert_eq!(
            extents,
            vec![DepthExtent { min: 500, max: 500 }, DepthExtent { min: 1000, max: 1000 }]
        );

        let summary = AviSummary::read(&report.video_path).unwrap();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.index_entries, 2);
        assert_eq!((summary.width, summary.height), (16, 6));
        assert!(recorder.state().is_idle());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn completed_session_aligns_frames_and_extents() {
        let dir = temp_dir("rec_complete");
        let mut recorder =
            SessionRecorder::new(TestCamera::unlimited(), config(&dir, Duration::from_millis(60))).unwrap();

        let report = recorder.run().unwrap();
        assert!(report.outcome.is_completed());
        assert!(report.frame_count > 0);
        assert!(report.duration >= Duration::from_millis(60));
        assert_eq!(report.diagnostics.pairs_accepted, report.frame_count);

        let extents = depth_log::read_depth_log(&report.stats_path).unwrap();
        let summary = AviSummary::read(&report.video_path).unwrap();
        assert_eq!(extents.len() as u64, report.frame_count);
        assert_eq!(summary.total_frames as u64, report.frame_count);

        let meta = metadata::read_metadata(&report.video_path).unwrap();
        assert_eq!(meta.frame_count, report.frame_count);
        assert_eq!(meta.checksum, report.checksum);
        assert_eq!(meta.outcome, "completed");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn next_session_gets_fresh_index_after_abort() {
        let dir = temp_dir("rec_next");
        let mut recorder =
            SessionRecorder::new(TestCamera::failing_after(2), config(&dir, Duration::from_secs(10))).unwrap();

        let first = recorder.run().unwrap();
        let second = recorder.run().unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert_eq!(second.frame_count, 0);
        assert!(AviSummary::read(&second.video_path).is_ok());
        assert_eq!(depth_log::read_depth_log(&second.stats_path).unwrap(), vec![]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn hooks_see_full_state_machine() {
        let dir = temp_dir("rec_hooks");
        let mut recorder =
            SessionRecorder::new(TestCamera::failing_after(1), config(&dir, Duration::from_secs(10))).unwrap();
        let hooks = Arc::new(RecordingHooks::default());
        recorder.set_hooks(hooks.clone());

        recorder.run().unwrap();
        let events = hooks.events.lock().clone();
        assert_eq!(
            events,
            vec![
                "PreRollDelay",
                "start-cue",
                "Recording { frame_count: 0 }",
                "stop-cue",
                "Finalizing",
                "error",
                "finished:1",
                "Idle",
            ]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cancel_stops_at_next_iteration() {
        let dir = temp_dir("rec_cancel");
        let mut recorder =
            SessionRecorder::new(TestCamera::unlimited(), config(&dir, Duration::from_secs(30))).unwrap();
        let hooks = Arc::new(RecordingHooks::default());
        *hooks.cancel_on_start.lock() = Some(recorder.cancel_handle());
        recorder.set_hooks(hooks.clone());

        let report = recorder.run().unwrap();
        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert_eq!(report.frame_count, 0);
        assert!(AviSummary::read(&report.video_path).is_ok());

        // The flag is cleared for the next session.
        *hooks.cancel_on_start.lock() = None;
        recorder.config.session_length = Duration::from_millis(20);
        let next = recorder.run().unwrap();
        assert!(next.outcome.is_completed());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = temp_dir("rec_config");
        let mut cfg = config(&dir, Duration::from_secs(1));
        cfg.frame_rate = 0;
        let err = SessionRecorder::new(TestCamera::unlimited(), cfg).err().unwrap();
        assert!(matches!(err, RecorderError::Configuration(_)));
    }

    #[test]
    fn unusable_directory_is_fatal() {
        let path = temp_dir("rec_dir_file");
        std::fs::write(&path, b"file").unwrap();
        let err = SessionRecorder::new(TestCamera::unlimited(), config(&path, Duration::from_secs(1)))
            .err()
            .unwrap();
        assert!(matches!(err, RecorderError::Directory(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn status_handle_tracks_state() {
        let dir = temp_dir("rec_status");
        let recorder =
            SessionRecorder::new(TestCamera::unlimited(), config(&dir, Duration::from_secs(1))).unwrap();
        let status = recorder.status_handle();
        assert_eq!(status.state(), RecorderState::Idle);
        assert_eq!(recorder.frame_dimensions(), (16, 6));
        std::fs::remove_dir_all(&dir).ok();
    }
}
